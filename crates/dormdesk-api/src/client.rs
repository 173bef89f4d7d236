// API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, per-request session
// headers (bearer token, trace/correlation ids), trace-id adoption from
// responses, and the global 401 handling. Endpoint modules
// (applications, coworkings) are inherent methods in separate files.

use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiErrorBody, Error};
use crate::session::SessionContext;
use crate::transport::TransportConfig;

/// `X-Trace-ID`, sent on every request and echoed back by the server.
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");
/// `X-Correlation-ID`, sent on every request.
pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Async client for the dormitory back-office API.
///
/// One instance is shared by every store; it is cheap to clone the
/// surrounding `Arc`, and `reqwest::Client` pools connections internally.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionContext,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `https://dorm.example.org`) and transport config.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: SessionContext,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            session,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages default headers).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: SessionContext,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            session,
        })
    }

    /// Ensure the base path ends in `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/v1/bookings"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request preparation ──────────────────────────────────────────

    /// Headers every request carries: bearer token (when stored) plus the
    /// session's trace and correlation ids.
    fn session_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(token) = self.session.access_token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "stored access token is not a valid header value"),
            }
        }

        let ids = self.session.ids();
        for (name, value) in [
            (TRACE_ID_HEADER, ids.trace_id()),
            (CORRELATION_ID_HEADER, ids.correlation_id()),
        ] {
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(name, value);
            }
        }

        headers
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let resp = builder.headers(self.session_headers()).send().await?;
        self.adopt_trace_id(resp.headers());
        Ok(resp)
    }

    /// The server may reassign the trace id; follow it on success and error alike.
    fn adopt_trace_id(&self, headers: &HeaderMap) {
        if let Some(trace_id) = headers
            .get(&TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            self.session.ids().update_trace_id(trace_id);
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let builder = self.http.get(url).query(query);
        debug!("GET {path} query={:?}", serde_json::to_value(query).ok());

        let resp = self.send(builder).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart)");

        let resp = self.send(self.http.post(url).multipart(form)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.send(self.http.patch(url).json(body)).await?;
        self.handle_response(resp).await
    }

    /// PATCH without a request body (status transitions).
    pub(crate) async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.send(self.http.patch(url)).await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!(url = %resp.url(), "received 401, ending session");
            self.session.expire();
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ApiErrorBody>(&raw)
                .ok()
                .filter(|b| b.error.is_some());
            debug!(
                status = status.as_u16(),
                code = body.as_ref().and_then(ApiErrorBody::code),
                "request failed"
            );
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = body
                .char_indices()
                .nth(200)
                .map_or(body.as_str(), |(i, _)| &body[..i]);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
