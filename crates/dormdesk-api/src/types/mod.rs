// Wire types mirrored from the server-side schema.
//
// Timestamps stay as the ISO-8601 strings the server emits; the server
// does not always attach an offset, so parsing is left to the
// presentation layer.

mod applications;
mod coworkings;
mod pagination;

pub use applications::*;
pub use coworkings::*;
pub use pagination::*;
