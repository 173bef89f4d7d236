//! Theme command handlers.

use serde::Serialize;

use dormdesk_core::ThemePreference;

use crate::cli::{ThemeArgs, ThemeCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines};

use super::Context;

#[derive(Serialize)]
struct ThemeView {
    theme: ThemePreference,
    dark: bool,
    system_dark: bool,
}

pub fn handle(ctx: &Context<'_>, args: ThemeArgs) -> Result<(), CliError> {
    let theme = ctx.client.theme();
    ctx.client.appearance().set_prefers_dark(args.system_dark);
    theme.update_applied();

    match args.command {
        ThemeCommand::Show => {}
        ThemeCommand::Set { theme: preference } => theme.set_theme(preference)?,
        ThemeCommand::Toggle => {
            theme.toggle_theme()?;
        }
    }

    let view = ThemeView {
        theme: theme.theme(),
        dark: theme.is_dark(),
        system_dark: ctx.client.appearance().prefers_dark(),
    };
    ctx.print(&output::render_single(
        ctx.format,
        &view,
        |v| {
            detail_lines(&[
                ("Theme", v.theme.to_string()),
                ("Applied", if v.dark { "dark" } else { "light" }.into()),
            ])
        },
        |v| v.theme.to_string(),
    ));
    Ok(())
}
