// Session-scoped state shared by every outgoing request.
//
// The bearer token lives in persistent storage, the trace/correlation ids
// are memoized once per session, and a 401 is reported through the
// `SessionExpired` port. All three are injected so tests can substitute
// deterministic values.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

/// Storage key holding the session credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key holding the UI theme preference.
pub const THEME_KEY: &str = "theme";

// ── Storage ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Simple string key/value persistence (no schema, no versioning).
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, mostly useful in tests.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// ── Session-expired port ────────────────────────────────────────────

/// Notified after a 401, once the stored token has been cleared.
///
/// The front-end decides what "go to login" means; the router implements
/// this by navigating to its login route.
pub trait SessionExpired: Send + Sync {
    fn session_expired(&self);
}

/// Port implementation that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreSessionExpired;

impl SessionExpired for IgnoreSessionExpired {
    fn session_expired(&self) {}
}

// ── Session identifiers ─────────────────────────────────────────────

/// Per-session trace and correlation identifiers.
///
/// Both are generated lazily and exactly once. The trace id may later be
/// replaced by a value the server echoes back in `x-trace-id`; the
/// correlation id never changes for the lifetime of the session.
pub struct SessionIds {
    trace: RwLock<Option<String>>,
    correlation: OnceLock<String>,
    generate: fn() -> String,
}

fn random_id() -> String {
    Uuid::new_v4().to_string()
}

impl SessionIds {
    /// Lazily generated random UUIDv4 identifiers.
    pub fn new() -> Self {
        Self::with_generator(random_id)
    }

    /// Use a custom generator (called at most once per identifier).
    pub fn with_generator(generate: fn() -> String) -> Self {
        Self {
            trace: RwLock::new(None),
            correlation: OnceLock::new(),
            generate,
        }
    }

    /// Fixed identifiers, for deterministic tests.
    pub fn fixed(trace_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        let ids = Self::new();
        *ids.trace.write().unwrap_or_else(PoisonError::into_inner) = Some(trace_id.into());
        let _ = ids.correlation.set(correlation_id.into());
        ids
    }

    pub fn trace_id(&self) -> String {
        if let Some(id) = self
            .trace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return id.clone();
        }
        // Re-check under the write lock so two racing callers agree.
        let mut guard = self.trace.write().unwrap_or_else(PoisonError::into_inner);
        guard.get_or_insert_with(|| (self.generate)()).clone()
    }

    pub fn correlation_id(&self) -> String {
        self.correlation.get_or_init(|| (self.generate)()).clone()
    }

    /// Adopt a trace id reassigned by the server.
    pub fn update_trace_id(&self, trace_id: &str) {
        let mut guard = self.trace.write().unwrap_or_else(PoisonError::into_inner);
        if guard.as_deref() != Some(trace_id) {
            trace!(trace_id, "server reassigned trace id");
            *guard = Some(trace_id.to_owned());
        }
    }
}

impl Default for SessionIds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIds")
            .field(
                "trace",
                &*self.trace.read().unwrap_or_else(PoisonError::into_inner),
            )
            .field("correlation", &self.correlation.get())
            .finish_non_exhaustive()
    }
}

// ── Session context ─────────────────────────────────────────────────

/// Everything the transport client needs from the surrounding session.
#[derive(Clone)]
pub struct SessionContext {
    ids: Arc<SessionIds>,
    storage: Arc<dyn Storage>,
    on_expired: Arc<dyn SessionExpired>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            ids: Arc::new(SessionIds::new()),
            storage,
            on_expired: Arc::new(IgnoreSessionExpired),
        }
    }

    pub fn with_ids(mut self, ids: Arc<SessionIds>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_session_expired(mut self, port: Arc<dyn SessionExpired>) -> Self {
        self.on_expired = port;
        self
    }

    pub fn ids(&self) -> &SessionIds {
        &self.ids
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The stored bearer token, if any. Empty strings count as absent.
    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.access_token().is_some()
    }

    /// Clear the stored token and notify the session-expired port.
    pub(crate) fn expire(&self) {
        if let Err(e) = self.storage.remove(ACCESS_TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to clear access token");
        }
        debug!("session expired, notifying port");
        self.on_expired.session_expired();
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("ids", &self.ids)
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_generator() -> String {
        let n = CALLS.fetch_add(1, Ordering::SeqCst);
        format!("id-{n}")
    }

    #[test]
    fn ids_are_generated_once() {
        let ids = SessionIds::with_generator(counting_generator);
        let first = ids.trace_id();
        assert_eq!(ids.trace_id(), first);
        let corr = ids.correlation_id();
        assert_eq!(ids.correlation_id(), corr);
        assert_ne!(first, corr);
    }

    #[test]
    fn server_can_reassign_trace_id() {
        let ids = SessionIds::fixed("t-1", "c-1");
        ids.update_trace_id("t-2");
        assert_eq!(ids.trace_id(), "t-2");
        assert_eq!(ids.correlation_id(), "c-1");
    }

    #[test]
    fn random_ids_are_uuids() {
        let ids = SessionIds::new();
        assert!(Uuid::parse_str(&ids.trace_id()).is_ok());
        assert!(Uuid::parse_str(&ids.correlation_id()).is_ok());
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
        storage.set(ACCESS_TOKEN_KEY, "abc").ok();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("abc"));
        storage.remove(ACCESS_TOKEN_KEY).ok();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let ctx = SessionContext::new(Arc::new(MemoryStorage::new().with_entry(ACCESS_TOKEN_KEY, "")));
        assert!(!ctx.has_token());
    }
}
