// ── Core error types ──
//
// `StoreError` is what every store action returns on failure: the
// localized message (also written to the store's `error` field) plus the
// API error it came from, so views can branch on status or code.
// `CoreError` covers the non-store surface (facade construction, theme
// persistence, date parsing).

use thiserror::Error;

use crate::error_message::error_message;

/// Failure of a store action.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    /// Localized, user-facing message.
    pub message: String,
    #[source]
    pub source: dormdesk_api::Error,
}

impl StoreError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }

    /// Server-side error code (e.g. `BOOKING_NOT_FOUND`), if present.
    pub fn code(&self) -> Option<&str> {
        self.source.api_error_code()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.source, dormdesk_api::Error::Unauthorized)
    }
}

impl From<dormdesk_api::Error> for StoreError {
    fn from(source: dormdesk_api::Error) -> Self {
        Self {
            message: error_message(&source),
            source,
        }
    }
}

/// Unified error type for the non-store parts of the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] dormdesk_api::Error),

    #[error(transparent)]
    Storage(#[from] dormdesk_api::StorageError),

    #[error("Invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Unknown route: {path}")]
    UnknownRoute { path: String },
}
