//! Shared configuration for dormdesk front-ends.
//!
//! TOML profiles layered with `DORMDESK_` environment overrides, token
//! resolution for `login`, translation to `dormdesk_core::ClientConfig`,
//! and [`FileStorage`], the persistent key/value store that holds the
//! session token and theme preference between runs.

mod storage;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dormdesk_core::ClientConfig;

pub use storage::FileStorage;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    ProfileNotFound { profile: String },

    #[error("no access token configured for profile '{profile}'")]
    NoToken { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("storage file {path} is corrupt: {source}")]
    CorruptStorage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile; the default profile name falls back to built-in
    /// settings when it is not defined, any other name is an error.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::default()),
            None => Err(ConfigError::ProfileNotFound {
                profile: name.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A named API profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL (e.g. "https://dorm.example.org").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token in plaintext; prefer `token_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Override the default request deadline (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            token_env: None,
            timeout: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dormdesk", "dormdesk")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "dormdesk", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for per-profile session data.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "dormdesk"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Session storage file of one profile.
pub fn storage_path(profile_name: &str) -> PathBuf {
    data_dir().join(profile_name).join("storage.json")
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer built-in defaults, the TOML file at `path` (if present), and
/// `DORMDESK_` variables. Nested keys use a double underscore, e.g.
/// `DORMDESK_DEFAULTS__TIMEOUT=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DORMDESK_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults when it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    })
}

/// Serialize config to TOML at the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve a bearer token from the profile: `token_env` first, then the
/// plaintext `token`.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(value) = profile
        .token_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
    {
        return Ok(SecretString::from(value));
    }

    if let Some(token) = profile.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token.to_owned()));
    }

    Err(ConfigError::NoToken {
        profile: profile_name.into(),
    })
}

/// Build a `ClientConfig` from a profile and global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    validate_api_url(&profile.api_url)?;
    Ok(ClientConfig {
        api_url: profile.api_url.clone(),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

/// Accept only absolute http(s) URLs.
pub fn validate_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL {raw:?}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.defaults.timeout, 15);
            Ok(())
        });
    }

    #[test]
    fn file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "campus"

                [defaults]
                output = "json"

                [profiles.campus]
                api_url = "https://dorm.example.org"
                token_env = "CAMPUS_TOKEN"
                "#,
            )?;
            jail.set_env("DORMDESK_DEFAULTS__TIMEOUT", "40");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("campus"));
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "auto");
            assert_eq!(cfg.defaults.timeout, 40);

            let profile = cfg.profile("campus").unwrap();
            assert_eq!(profile.api_url, "https://dorm.example.org");
            assert_eq!(profile.token_env.as_deref(), Some("CAMPUS_TOKEN"));
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                api_url: "http://10.0.0.5:8080".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.lab]"));
        assert!(!text.contains("token"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles.get("lab"), cfg.profiles.get("lab"));
    }

    #[test]
    fn unknown_profile_is_an_error_but_default_falls_back() {
        let cfg = Config::default();
        assert_eq!(cfg.profile(DEFAULT_PROFILE).unwrap(), Profile::default());
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn token_resolution_prefers_env() {
        Jail::expect_with(|jail| {
            let mut profile = Profile {
                token: Some("plain".into()),
                token_env: Some("DORMDESK_TEST_TOKEN".into()),
                ..Profile::default()
            };
            assert_eq!(resolve_token(&profile, "p").unwrap().expose_secret(), "plain");

            jail.set_env("DORMDESK_TEST_TOKEN", "from-env");
            assert_eq!(resolve_token(&profile, "p").unwrap().expose_secret(), "from-env");

            profile.token = None;
            profile.token_env = None;
            assert!(matches!(
                resolve_token(&profile, "p"),
                Err(ConfigError::NoToken { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn client_config_from_profile() {
        let profile = Profile {
            api_url: "https://dorm.example.org/gw".into(),
            ..Profile::default()
        };
        let cfg = profile_to_client_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.api_url, "https://dorm.example.org/gw");
        assert_eq!(cfg.timeout, Duration::from_secs(15));

        let bad = Profile {
            api_url: "ftp://dorm".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_client_config(&bad, &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
