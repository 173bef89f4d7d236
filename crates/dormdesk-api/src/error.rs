use serde::Deserialize;
use thiserror::Error;

use crate::session::StorageError;

/// Structured error body returned by the API: `{"error":{"code":..,"message":..}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Top-level error type for the `dormdesk-api` crate.
///
/// `dormdesk-core` turns these into localized, user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No response was received (connection refused, DNS, deadline hit).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Session ─────────────────────────────────────────────────────
    /// HTTP 401. The stored token has already been cleared and the
    /// session-expired port notified by the time the caller sees this.
    #[error("Session expired -- authentication required")]
    Unauthorized,

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `body` is populated when the server sent the
    /// structured `{error:{code,message}}` shape.
    #[error(
        "Request failed with status code {status}{}",
        .body.as_ref().and_then(ApiErrorBody::message).map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Api {
        status: u16,
        body: Option<ApiErrorBody>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Persistent storage could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiErrorBody {
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref()?.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref()?.message.as_deref()
    }
}

impl Error {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The structured body, if the server sent one.
    pub fn body(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// The domain error code (e.g. `BOOKING_NOT_FOUND`), if available.
    pub fn api_error_code(&self) -> Option<&str> {
        self.body()?.code()
    }

    /// Returns `true` when no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(e) if e.status().is_none())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
