//! Reactive state layer between `dormdesk-api` and front-ends (the CLI,
//! or any view that can subscribe to a `watch` channel).
//!
//! - **[`Client`]**: Facade wiring one shared [`ApiClient`](dormdesk_api::ApiClient)
//!   to the stores, the router, and the theme controller.
//!
//! - **Stores** ([`ApplicationsStore`], [`CoworkingsStore`]): Hold lists,
//!   pagination cursors, the open detail, and `loading`/`error` flags.
//!   Every action returns `Result<T, StoreError>` and patches local copies
//!   after a successful mutation. Overlapping fetches into the same slot
//!   resolve in issue order: a stale response never overwrites a newer one.
//!
//! - **[`StateStream<S>`]**: Subscription handle with `current()` /
//!   `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **[`error_message`]**: Server error codes to localized messages.
//!
//! - **[`Router`]**: Route table with an auth guard; also the session
//!   expiry port that sends the user back to `login` on a 401.
//!
//! - **[`theme`] and [`date`]**: Presentation helpers.

pub mod client;
pub mod date;
pub mod error;
pub mod error_message;
pub mod router;
pub mod store;
pub mod stream;
pub mod theme;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, ClientBuilder, ClientConfig};
pub use date::{format_date, format_date_time, format_time};
pub use error::{CoreError, StoreError};
pub use error_message::{ErrorCode, GENERIC_ERROR_MESSAGE, error_message};
pub use router::{Navigation, RouteMatch, RouteName, Router};
pub use store::{
    ApplicationsState, ApplicationsStore, CoworkingsState, CoworkingsStore, StoreState,
};
pub use stream::StateStream;
pub use theme::{Appearance, ThemeController, ThemePreference, ThemeSink, ThemeSubscription};
