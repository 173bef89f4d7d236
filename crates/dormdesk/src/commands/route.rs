//! `route`: show where a location lands after the auth guard.

use dormdesk_core::RouteMatch;

use crate::cli::RouteArgs;
use crate::error::CliError;
use crate::output::{self, detail_lines};

use super::Context;

fn pairs(map: &std::collections::BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn detail(m: &RouteMatch) -> String {
    detail_lines(&[
        ("View", m.name.to_string()),
        ("Path", m.path.clone()),
        ("Location", m.full_path.clone()),
        ("Params", pairs(&m.params)),
        ("Query", pairs(&m.query)),
        ("Auth", if m.requires_auth { "required" } else { "public" }.into()),
    ])
}

pub fn handle(ctx: &Context<'_>, args: &RouteArgs) -> Result<(), CliError> {
    let matched = ctx.client.router().navigate(&args.path)?;
    ctx.print(&output::render_single(
        ctx.format,
        &matched,
        detail,
        |m| m.full_path.clone(),
    ));
    Ok(())
}
