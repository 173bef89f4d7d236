//! Command dispatch: bridges CLI args -> stores -> output formatting.

pub mod applications;
pub mod auth;
pub mod bookings;
pub mod config_cmd;
pub mod coworkings;
pub mod route;
pub mod theme;

use dormdesk_core::{Client, RouteMatch, RouteName};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a handler needs besides its own arguments.
pub struct Context<'a> {
    pub client: &'a Client,
    pub global: &'a GlobalOpts,
    pub profile: &'a str,
    pub format: OutputFormat,
    pub color: bool,
}

impl Context<'_> {
    /// Enter a view through the auth guard. A redirect to `login` means no
    /// token is stored for this profile.
    pub fn open(&self, path: &str) -> Result<RouteMatch, CliError> {
        let matched = self.client.router().navigate(path)?;
        if matched.name == RouteName::Login && !path.starts_with("/login") {
            return Err(CliError::NotLoggedIn {
                profile: self.profile.to_owned(),
            });
        }
        Ok(matched)
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.global.quiet);
    }

    pub fn note(&self, note: &str) {
        output::print_note(note, self.global.quiet);
    }
}

/// Dispatch a client-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args),
        Command::Logout => auth::logout(ctx),
        Command::Applications(args) => applications::handle(ctx, args).await,
        Command::Coworkings(args) => coworkings::handle(ctx, args).await,
        Command::Bookings(args) => bookings::handle(ctx, args).await,
        Command::Theme(args) => theme::handle(ctx, args),
        Command::Route(args) => route::handle(ctx, &args),
        // Config and Completions are handled before a client is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
