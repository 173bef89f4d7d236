// ── Client facade ──
//
// Wires one shared `ApiClient` to both stores, the router (which doubles
// as the session-expired port), and the theme controller. Front-ends
// hold a `Client` and reach everything through it.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use dormdesk_api::transport::DEFAULT_TIMEOUT;
use dormdesk_api::{
    ACCESS_TOKEN_KEY, ApiClient, SessionContext, SessionIds, Storage, TransportConfig,
};

use crate::error::CoreError;
use crate::router::{LOGIN_PATH, Router};
use crate::store::{ApplicationsStore, CoworkingsStore};
use crate::theme::{Appearance, ThemeController, ThemeSink};

/// Connection settings for the back-office API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL; endpoint paths such as `api/v1/bookings` are joined onto it.
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Central entry point. Cheaply cloneable.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    storage: Arc<dyn Storage>,
    api: Arc<ApiClient>,
    router: Arc<Router>,
    applications: ApplicationsStore,
    coworkings: CoworkingsStore,
    theme: ThemeController,
    appearance: Arc<Appearance>,
}

/// Optional collaborators for [`Client::builder`].
pub struct ClientBuilder {
    config: ClientConfig,
    storage: Arc<dyn Storage>,
    ids: Arc<SessionIds>,
    appearance: Option<Arc<Appearance>>,
    sink: Arc<dyn ThemeSink>,
}

impl ClientBuilder {
    /// Use fixed or custom session identifiers.
    pub fn session_ids(mut self, ids: Arc<SessionIds>) -> Self {
        self.ids = ids;
        self
    }

    /// OS appearance source for the `system` theme.
    pub fn appearance(mut self, appearance: Arc<Appearance>) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn theme_sink(mut self, sink: Arc<dyn ThemeSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<Client, CoreError> {
        let router = Arc::new(Router::new(Arc::clone(&self.storage)));
        let session = SessionContext::new(Arc::clone(&self.storage))
            .with_ids(self.ids)
            .with_session_expired(router.clone());

        let transport = TransportConfig::default().with_timeout(self.config.timeout);
        let api = Arc::new(ApiClient::new(&self.config.api_url, &transport, session)?);

        let appearance = self
            .appearance
            .unwrap_or_else(|| Arc::new(Appearance::new(false)));
        let theme = ThemeController::new(Arc::clone(&self.storage), &appearance, self.sink);

        Ok(Client {
            inner: Arc::new(ClientInner {
                applications: ApplicationsStore::new(Arc::clone(&api)),
                coworkings: CoworkingsStore::new(Arc::clone(&api)),
                config: self.config,
                storage: self.storage,
                api,
                router,
                theme,
                appearance,
            }),
        })
    }
}

impl Client {
    /// Build with default collaborators: fresh session ids, a light OS
    /// appearance, and no theme sink.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, CoreError> {
        Self::builder(config, storage).build()
    }

    pub fn builder(config: ClientConfig, storage: Arc<dyn Storage>) -> ClientBuilder {
        ClientBuilder {
            config,
            storage,
            ids: Arc::new(SessionIds::new()),
            appearance: None,
            sink: Arc::new(|_dark: bool| {}),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.inner.api
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.inner.router
    }

    pub fn applications(&self) -> &ApplicationsStore {
        &self.inner.applications
    }

    pub fn coworkings(&self) -> &CoworkingsStore {
        &self.inner.coworkings
    }

    pub fn theme(&self) -> &ThemeController {
        &self.inner.theme
    }

    pub fn appearance(&self) -> &Arc<Appearance> {
        &self.inner.appearance
    }

    pub fn session(&self) -> &SessionContext {
        self.inner.api.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().has_token()
    }

    /// Store a bearer token for subsequent requests.
    pub fn login(&self, token: &str) -> Result<(), CoreError> {
        self.inner.storage.set(ACCESS_TOKEN_KEY, token.trim())?;
        info!("access token stored");
        Ok(())
    }

    /// Forget the token, clear both stores, and return to the login view.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.storage.remove(ACCESS_TOKEN_KEY)?;
        self.inner.applications.reset();
        self.inner.coworkings.reset();
        self.inner.router.navigate(LOGIN_PATH)?;
        info!("logged out");
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
