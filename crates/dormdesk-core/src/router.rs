// ── Router & auth guard ──
//
// Static route table with `:param` and trailing `:param?` segments. The
// guard sends unauthenticated visitors of protected routes to `login`,
// keeping the intended full path in `?redirect=`. The router also tracks
// the current location and serves as the client's session-expired port.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tokio::sync::watch;
use tracing::{debug, info};
use url::form_urlencoded;

use dormdesk_api::{ACCESS_TOKEN_KEY, SessionExpired, Storage};

use crate::error::CoreError;

pub const LOGIN_PATH: &str = "/login";
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RouteName {
    Coworkings,
    BookingNew,
    MyBookings,
    ActiveBookings,
    BookingHistory,
    BookingDetail,
    Applications,
    ApplicationNew,
    ApplicationDetail,
    Login,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    View(RouteName),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Route {
    pattern: &'static str,
    target: Target,
    requires_auth: bool,
}

const fn view(pattern: &'static str, name: RouteName) -> Route {
    Route {
        pattern,
        target: Target::View(name),
        requires_auth: true,
    }
}

/// First match wins, so literal paths precede `:param` siblings.
const ROUTES: &[Route] = &[
    Route {
        pattern: "/",
        target: Target::Redirect("/coworkings"),
        requires_auth: false,
    },
    view("/coworkings", RouteName::Coworkings),
    view("/bookings/new/:coworkingId?", RouteName::BookingNew),
    view("/bookings/my", RouteName::MyBookings),
    view("/bookings/active", RouteName::ActiveBookings),
    view("/bookings/history", RouteName::BookingHistory),
    view("/bookings/:id", RouteName::BookingDetail),
    view("/applications", RouteName::Applications),
    view("/applications/new", RouteName::ApplicationNew),
    view("/applications/:id", RouteName::ApplicationDetail),
    Route {
        pattern: LOGIN_PATH,
        target: Target::View(RouteName::Login),
        requires_auth: false,
    },
];

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub name: RouteName,
    pub path: String,
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub requires_auth: bool,
}

/// Outcome of the navigation guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Navigation {
    Proceed(RouteMatch),
    Redirect {
        name: RouteName,
        query: BTreeMap<String, String>,
        full_path: String,
    },
}

// ── Matching ─────────────────────────────────────────────────────

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    let mut actual = segments(path);

    for expected in segments(pattern) {
        let segment = actual.next();
        match (expected.strip_prefix(':'), segment) {
            (Some(param), value) if param.ends_with('?') => {
                if let Some(value) = value {
                    params.insert(param.trim_end_matches('?').to_owned(), value.to_owned());
                }
            }
            (Some(param), Some(value)) => {
                params.insert(param.to_owned(), value.to_owned());
            }
            (None, Some(value)) if value == expected => {}
            _ => return None,
        }
    }

    actual.next().is_none().then_some(params)
}

fn split_location(full_path: &str) -> (&str, &str) {
    let without_hash = full_path.split('#').next().unwrap_or_default();
    match without_hash.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_hash, ""),
    }
}

fn normalize(path: &str) -> String {
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

/// Build `/login?redirect=<full path>`.
fn login_redirect(full_path: &str) -> Navigation {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_PARAM, full_path)
        .finish();
    Navigation::Redirect {
        name: RouteName::Login,
        query: BTreeMap::from([(REDIRECT_PARAM.to_owned(), full_path.to_owned())]),
        full_path: format!("{LOGIN_PATH}?{encoded}"),
    }
}

// ── Router ───────────────────────────────────────────────────────

pub struct Router {
    storage: Arc<dyn Storage>,
    current: watch::Sender<Option<RouteMatch>>,
}

impl Router {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (current, _) = watch::channel(None);
        Self { storage, current }
    }

    /// Match a location against the route table without the guard.
    pub fn match_location(full_path: &str) -> Result<RouteMatch, CoreError> {
        let (path, query) = split_location(full_path);

        for route in ROUTES {
            let Some(params) = match_pattern(route.pattern, path) else {
                continue;
            };
            return match route.target {
                Target::Redirect(to) => Self::match_location(to),
                Target::View(name) => Ok(RouteMatch {
                    name,
                    path: normalize(path),
                    full_path: full_path.to_owned(),
                    params,
                    query: form_urlencoded::parse(query.as_bytes())
                        .into_owned()
                        .collect(),
                    requires_auth: route.requires_auth,
                }),
            };
        }

        Err(CoreError::UnknownRoute {
            path: path.to_owned(),
        })
    }

    /// Run the navigation guard for `full_path`.
    pub fn resolve(full_path: &str, token_present: bool) -> Result<Navigation, CoreError> {
        let matched = Self::match_location(full_path)?;
        if matched.requires_auth && !token_present {
            debug!(to = %matched.full_path, "unauthenticated, redirecting to login");
            return Ok(login_redirect(&matched.full_path));
        }
        Ok(Navigation::Proceed(matched))
    }

    fn token_present(&self) -> bool {
        self.storage
            .get(ACCESS_TOKEN_KEY)
            .is_some_and(|t| !t.is_empty())
    }

    /// Navigate using the stored token, following a guard redirect, and
    /// publish the final location.
    pub fn navigate(&self, full_path: &str) -> Result<RouteMatch, CoreError> {
        let matched = match Self::resolve(full_path, self.token_present())? {
            Navigation::Proceed(matched) => matched,
            Navigation::Redirect { full_path, .. } => Self::match_location(&full_path)?,
        };
        debug!(name = %matched.name, path = %matched.full_path, "navigated");
        self.current.send_replace(Some(matched.clone()));
        Ok(matched)
    }

    pub fn current(&self) -> Option<RouteMatch> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RouteMatch>> {
        self.current.subscribe()
    }
}

impl SessionExpired for Router {
    fn session_expired(&self) {
        info!("session expired, returning to login");
        if let Err(e) = self.navigate(LOGIN_PATH) {
            debug!(error = %e, "login route unavailable");
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.current.borrow().as_ref().map(|m| &m.full_path))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dormdesk_api::MemoryStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn root_redirects_to_coworkings() {
        let m = Router::match_location("/").unwrap();
        assert_eq!(m.name, RouteName::Coworkings);
        assert_eq!(m.path, "/coworkings");
    }

    #[test]
    fn optional_segment_matches_with_and_without_value() {
        let without = Router::match_location("/bookings/new").unwrap();
        assert_eq!(without.name, RouteName::BookingNew);
        assert!(without.params.is_empty());

        let with = Router::match_location("/bookings/new/C1").unwrap();
        assert_eq!(with.name, RouteName::BookingNew);
        assert_eq!(with.params.get("coworkingId").map(String::as_str), Some("C1"));
    }

    #[test]
    fn literal_routes_win_over_params() {
        assert_eq!(
            Router::match_location("/bookings/my").unwrap().name,
            RouteName::MyBookings
        );
        assert_eq!(
            Router::match_location("/bookings/history").unwrap().name,
            RouteName::BookingHistory
        );
        let detail = Router::match_location("/bookings/b42/").unwrap();
        assert_eq!(detail.name, RouteName::BookingDetail);
        assert_eq!(detail.params.get("id").map(String::as_str), Some("b42"));
        assert_eq!(
            Router::match_location("/applications/new").unwrap().name,
            RouteName::ApplicationNew
        );
    }

    #[test]
    fn unknown_paths_are_rejected() {
        assert!(matches!(
            Router::match_location("/nope"),
            Err(CoreError::UnknownRoute { .. })
        ));
        assert!(Router::match_location("/bookings/b1/extra").is_err());
    }

    #[test]
    fn query_is_parsed() {
        let m = Router::match_location("/bookings/history?date_from=2025-03-01#top").unwrap();
        assert_eq!(m.query.get("date_from").map(String::as_str), Some("2025-03-01"));
    }

    #[test]
    fn guard_redirects_with_intended_path() {
        let nav = Router::resolve("/bookings/my?status=active", false).unwrap();
        match nav {
            Navigation::Redirect {
                name,
                query,
                full_path,
            } => {
                assert_eq!(name, RouteName::Login);
                assert_eq!(
                    query.get(REDIRECT_PARAM).map(String::as_str),
                    Some("/bookings/my?status=active")
                );
                assert_eq!(full_path, "/login?redirect=%2Fbookings%2Fmy%3Fstatus%3Dactive");
            }
            other @ Navigation::Proceed(_) => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn guard_allows_public_and_authenticated() {
        assert!(matches!(
            Router::resolve("/login", false).unwrap(),
            Navigation::Proceed(RouteMatch { name: RouteName::Login, .. })
        ));
        assert!(matches!(
            Router::resolve("/coworkings", true).unwrap(),
            Navigation::Proceed(_)
        ));
    }

    #[test]
    fn navigate_follows_redirect_and_publishes() {
        let storage = Arc::new(MemoryStorage::new());
        let router = Router::new(storage.clone());
        let mut rx = router.subscribe();

        let m = router.navigate("/bookings/active").unwrap();
        assert_eq!(m.name, RouteName::Login);
        assert_eq!(
            m.query.get(REDIRECT_PARAM).map(String::as_str),
            Some("/bookings/active")
        );
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|m| m.name), Some(RouteName::Login));

        storage.set(ACCESS_TOKEN_KEY, "tok").unwrap();
        assert_eq!(
            router.navigate("/bookings/active").unwrap().name,
            RouteName::ActiveBookings
        );
    }

    #[test]
    fn session_expired_goes_to_login() {
        let storage = Arc::new(MemoryStorage::new().with_entry(ACCESS_TOKEN_KEY, "tok"));
        let router = Router::new(storage);
        router.navigate("/coworkings").unwrap();

        router.session_expired();
        assert_eq!(router.current().map(|m| m.name), Some(RouteName::Login));
    }
}
