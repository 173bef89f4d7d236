//! CLI error types with miette diagnostics.
//!
//! Maps store, core, and config errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use dormdesk_config::ConfigError;
use dormdesk_core::{CoreError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(dormdesk::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Override the URL with --api-url or `dormdesk config init --url ...`"
        )
    )]
    ConnectionFailed {
        message: String,
        #[source]
        source: dormdesk_api::Error,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(dormdesk::timeout),
        help("Increase the deadline with --timeout or check API responsiveness.")
    )]
    Timeout {
        #[source]
        source: dormdesk_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(
        code(dormdesk::not_logged_in),
        help("Run: dormdesk login --profile {profile}")
    )]
    NotLoggedIn { profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(dormdesk::session_expired),
        help("The stored token was rejected and has been cleared. Run: dormdesk login")
    )]
    SessionExpired { message: String },

    #[error("No access token available for profile '{profile}'")]
    #[diagnostic(
        code(dormdesk::no_token),
        help(
            "Pass --token, set DORMDESK_TOKEN, or configure token_env for the profile.\n\
             Interactive prompting needs a terminal."
        )
    )]
    NoToken { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(dormdesk::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(dormdesk::forbidden))]
    Forbidden { message: String },

    #[error("{message}")]
    #[diagnostic(code(dormdesk::conflict), help("Server code: {code}"))]
    Conflict { message: String, code: String },

    #[error("{message}")]
    #[diagnostic(code(dormdesk::api_error))]
    Api {
        message: String,
        #[source]
        source: dormdesk_api::Error,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dormdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dormdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dormdesk config init --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(dormdesk::profile_exists),
        help("Use --force to overwrite it.")
    )]
    ProfileExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(dormdesk::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(dormdesk::storage))]
    Storage(#[from] dormdesk_api::StorageError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotLoggedIn { .. } | Self::SessionExpired { .. } | Self::NoToken { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::Conflict { .. } | Self::ProfileExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Api { .. } | Self::Config(_) | Self::Storage(_) | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── StoreError → CliError mapping ────────────────────────────────────

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let StoreError { message, source } = err;

        if let dormdesk_api::Error::Transport(ref e) = source {
            if e.is_timeout() {
                return Self::Timeout { source };
            }
            return Self::ConnectionFailed { message, source };
        }

        match source.status() {
            Some(401) => Self::SessionExpired { message },
            Some(403) => Self::Forbidden { message },
            Some(404) => Self::NotFound { message },
            Some(409) => Self::Conflict {
                code: source.api_error_code().unwrap_or("CONFLICT").to_owned(),
                message,
            },
            _ => Self::Api { message, source },
        }
    }
}

impl From<dormdesk_api::Error> for CliError {
    fn from(err: dormdesk_api::Error) -> Self {
        StoreError::from(err).into()
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Storage(e) => Self::Storage(e),
            CoreError::InvalidDate { input, reason } => Self::Validation {
                field: "date".into(),
                reason: format!("{input:?}: {reason}"),
            },
            CoreError::UnknownRoute { path } => Self::NotFound {
                message: format!("No view at {path}"),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dormdesk_api::{ApiErrorBody, Error as ApiError};

    use super::*;

    fn api_error(status: u16, code: &str) -> ApiError {
        let body: ApiErrorBody =
            serde_json::from_value(serde_json::json!({ "error": { "code": code, "message": "raw" } }))
                .unwrap();
        ApiError::Api {
            status,
            body: Some(body),
        }
    }

    #[test]
    fn store_errors_keep_localized_message() {
        let err = CliError::from(StoreError::from(api_error(409, "APP_ALREADY_DECIDED")));
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "Решение по заявлению уже принято");
        match err {
            CliError::Conflict { code, .. } => assert_eq!(code, "APP_ALREADY_DECIDED"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status_drives_exit_code() {
        assert_eq!(
            CliError::from(ApiError::Unauthorized).exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(api_error(404, "BOOKING_NOT_FOUND")).exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(api_error(403, "FORBIDDEN")).exit_code(),
            exit_code::PERMISSION
        );
        assert_eq!(
            CliError::from(api_error(500, "BOOM")).exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn unknown_route_is_not_found() {
        let err = CliError::from(CoreError::UnknownRoute {
            path: "/nope".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
