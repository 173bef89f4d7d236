//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DEFAULT_PROFILE, Profile};
use crate::error::CliError;
use crate::output;

/// Copy of the config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let format = config::output_format(global, &cfg);
            let rendered = output::render_single(
                format,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unrenderable: {e}")),
                |c| {
                    let mut names: Vec<_> = c.profiles.keys().cloned().collect();
                    names.sort();
                    names.join("\n")
                },
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            name,
            url,
            token_env,
            timeout,
            set_default,
            force,
        } => {
            let name = name
                .or_else(|| global.profile.clone())
                .unwrap_or_else(|| DEFAULT_PROFILE.into());
            dormdesk_config::validate_api_url(&url)?;

            let mut cfg = config::load_config_or_default();
            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::ProfileExists { name });
            }
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    api_url: url,
                    token: None,
                    token_env,
                    timeout,
                },
            );
            if set_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }

            let path = config::save_config(&cfg)?;
            output::print_note(
                &format!("Profile '{name}' saved to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
