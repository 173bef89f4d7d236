//! CLI configuration: thin wrapper around `dormdesk_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --api-url, --timeout, --output) and opens the per-profile
//! session storage.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;

use dormdesk_core::{ClientConfig, ThemeSink};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use dormdesk_config::{
    Config, DEFAULT_PROFILE, FileStorage, Profile, config_path, load_config_or_default,
    save_config, storage_path,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// Look up the active profile, listing the known ones when it is missing.
pub fn active_profile(name: &str, config: &Config) -> Result<Profile, CliError> {
    config.profile(name).map_err(|_| {
        let mut names: Vec<_> = config.profiles.keys().cloned().collect();
        names.sort();
        CliError::ProfileNotFound {
            name: name.into(),
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        }
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// Flag overrides take priority over profile values.
pub fn resolve_client_config(
    profile: &Profile,
    global: &GlobalOpts,
    config: &Config,
) -> Result<ClientConfig, CliError> {
    let mut effective = profile.clone();
    if let Some(url) = &global.api_url {
        effective.api_url.clone_from(url);
    }
    if global.timeout.is_some() {
        effective.timeout = global.timeout;
    }
    let client = dormdesk_config::profile_to_client_config(&effective, &config.defaults)?;
    if client.timeout == Duration::ZERO {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(client)
}

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Open the session storage of a profile.
pub fn open_storage(profile_name: &str) -> Result<Arc<FileStorage>, CliError> {
    let storage = FileStorage::open(storage_path(profile_name))?;
    Ok(Arc::new(storage))
}

/// Theme sink for a terminal: nothing to repaint, so just trace it.
pub fn theme_sink() -> Arc<dyn ThemeSink> {
    Arc::new(|dark: bool| tracing::debug!(dark, "theme applied"))
}
