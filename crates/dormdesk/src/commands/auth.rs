//! Login / logout handlers.

use std::io::IsTerminal;

use secrecy::ExposeSecret;

use dormdesk_core::Router;

use crate::cli::LoginArgs;
use crate::config;
use crate::error::CliError;

use super::Context;

const HOME_PATH: &str = "/";

/// Token from `--token`, then the profile (`token_env` / `token`), then an
/// interactive prompt.
fn obtain_token(ctx: &Context<'_>, flag: Option<String>) -> Result<String, CliError> {
    if let Some(token) = flag {
        return Ok(token);
    }

    let cfg = config::load_config_or_default();
    if let Some(secret) = cfg
        .profile(ctx.profile)
        .ok()
        .and_then(|p| dormdesk_config::resolve_token(&p, ctx.profile).ok())
    {
        return Ok(secret.expose_secret().to_owned());
    }

    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoToken {
            profile: ctx.profile.to_owned(),
        });
    }
    Ok(rpassword::prompt_password("Access token: ")?)
}

pub fn login(ctx: &Context<'_>, args: LoginArgs) -> Result<(), CliError> {
    let token = obtain_token(ctx, args.token)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "cannot be empty".into(),
        });
    }

    // Reject a bad redirect before touching the stored token.
    let target = args.redirect.as_deref().unwrap_or(HOME_PATH);
    Router::match_location(target)?;

    ctx.client.login(&token)?;
    let landed = ctx.open(target)?;
    ctx.note(&format!(
        "Logged in (profile '{}'), opening {}",
        ctx.profile, landed.path
    ));
    Ok(())
}

pub fn logout(ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.client.logout()?;
    ctx.note(&format!("Logged out (profile '{}')", ctx.profile));
    Ok(())
}
