// dormdesk-api: Async Rust client for the dormitory back-office API
// (leave applications + coworking bookings).

pub mod applications;
pub mod client;
pub mod coworkings;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiErrorBody, ApiErrorDetail, Error};
pub use session::{
    ACCESS_TOKEN_KEY, IgnoreSessionExpired, MemoryStorage, SessionContext, SessionExpired,
    SessionIds, Storage, StorageError, THEME_KEY,
};
pub use transport::TransportConfig;
pub use types::*;
