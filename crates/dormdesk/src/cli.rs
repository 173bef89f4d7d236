//! Clap derive structures for the `dormdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dormdesk_api::{ApplicationStatus, BookingStatus};
use dormdesk_core::ThemePreference;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dormdesk -- dormitory back-office from the command line
#[derive(Debug, Parser)]
#[command(
    name = "dormdesk",
    version,
    about = "Manage dormitory leave applications and coworking bookings",
    long_about = "Command-line front-end for the dormitory back-office API.\n\n\
        Review and decide leave applications, upload supporting documents,\n\
        and book, confirm, close or cancel coworking sessions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "DORMDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "DORMDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "DORMDESK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DORMDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an access token for the active profile
    Login(LoginArgs),

    /// Forget the stored access token
    Logout,

    /// Leave applications: list, review, decide, attach documents
    #[command(alias = "apps", alias = "a")]
    Applications(ApplicationsArgs),

    /// Coworking spaces
    #[command(alias = "cw")]
    Coworkings(CoworkingsArgs),

    /// Coworking bookings and their lifecycle
    #[command(alias = "b")]
    Bookings(BookingsArgs),

    /// Light/dark preference
    Theme(ThemeArgs),

    /// Resolve a view path through the router and auth guard
    Route(RouteArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Access token (otherwise from the profile, else prompted)
    #[arg(long, env = "DORMDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// View to open after login
    #[arg(long, value_name = "PATH")]
    pub redirect: Option<String>,
}

// ── Applications ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ApplicationsCommand {
    /// List applications (paginated)
    #[command(alias = "ls")]
    List(ApplicationListArgs),

    /// Show one application with its documents
    Show { id: String },

    /// Submit a new leave application
    Create(ApplicationCreateArgs),

    /// Approve or reject an application
    Decide {
        id: String,

        #[command(flatten)]
        decision: DecisionArgs,
    },

    /// Attach a document to an application
    Upload {
        id: String,

        /// File to upload
        file: PathBuf,

        /// Document kind (signed_application, parent_letter, voice_message)
        #[arg(long = "type", short = 't', default_value = "signed_application")]
        document_type: String,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ApplicationListArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub size: Option<u32>,

    #[arg(long, value_parser = parse_application_status)]
    pub status: Option<ApplicationStatus>,

    /// Leave time lower bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<String>,

    /// Leave time upper bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<String>,

    #[arg(long)]
    pub entrance: Option<u32>,

    #[arg(long)]
    pub room: Option<String>,
}

#[derive(Debug, Args)]
pub struct ApplicationCreateArgs {
    /// Departure (ISO-8601)
    #[arg(long)]
    pub leave_time: String,

    /// Return (ISO-8601)
    #[arg(long)]
    pub return_time: String,

    #[arg(long)]
    pub reason: String,

    #[arg(long)]
    pub contact_phone: String,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct DecisionArgs {
    /// Approve the application
    #[arg(long)]
    pub approve: bool,

    /// Reject the application with a reason
    #[arg(long, value_name = "REASON")]
    pub reject: Option<String>,
}

// ── Coworkings ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoworkingsArgs {
    #[command(subcommand)]
    pub command: CoworkingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoworkingsCommand {
    /// List coworking spaces
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        building: Option<u32>,

        #[arg(long)]
        entrance: Option<u32>,

        /// Only spaces that are (or are not) free right now
        #[arg(long)]
        available: Option<bool>,
    },

    /// Show one coworking space
    Show { id: String },
}

// ── Bookings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BookingsArgs {
    #[command(subcommand)]
    pub command: BookingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookingsCommand {
    /// Book a coworking space
    Create {
        /// Coworking id
        #[arg(long, short = 'c')]
        coworking: String,

        /// Start (ISO-8601)
        #[arg(long)]
        from: String,

        /// End (ISO-8601)
        #[arg(long)]
        to: String,
    },

    /// List all bookings (staff view)
    #[command(alias = "ls")]
    List {
        #[arg(long, value_parser = parse_booking_status)]
        status: Option<BookingStatus>,

        #[arg(long)]
        coworking: Option<String>,

        #[arg(long)]
        coworking_name: Option<String>,

        #[arg(long)]
        student: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// The current user's bookings
    My {
        #[arg(long, value_parser = parse_booking_status)]
        status: Option<BookingStatus>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Bookings in progress, with student and coworking details
    Active,

    /// Finished bookings
    History {
        #[arg(long)]
        coworking: Option<String>,

        #[arg(long)]
        coworking_name: Option<String>,

        #[arg(long)]
        student: Option<String>,

        /// Start lower bound (YYYY-MM-DD)
        #[arg(long)]
        date_from: Option<String>,

        /// Start upper bound (YYYY-MM-DD)
        #[arg(long)]
        date_to: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one booking
    Show { id: String },

    /// Hand over the keys: created -> active
    Confirm { id: String },

    /// Take the keys back: active -> completed
    Close { id: String },

    /// Cancel a booking that has not started
    Cancel { id: String },
}

/// Offset pagination shared by booking list commands.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Max results per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Pagination offset
    #[arg(long)]
    pub offset: Option<u32>,
}

// ── Theme ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Treat the OS appearance as dark when resolving `system`
    #[arg(long, global = true)]
    pub system_dark: bool,

    #[command(subcommand)]
    pub command: ThemeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Show the stored preference and the applied mode
    Show,

    /// Store a preference
    Set {
        #[arg(value_parser = parse_theme)]
        theme: ThemePreference,
    },

    /// Flip between light and dark
    Toggle,
}

// ── Route ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Location, e.g. /bookings/my?status=active
    pub path: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init {
        /// Profile name [default: --profile, else "default"]
        #[arg(long)]
        name: Option<String>,

        /// API base URL
        #[arg(long, default_value = dormdesk_config::DEFAULT_API_URL)]
        url: String,

        /// Environment variable holding the access token
        #[arg(long)]
        token_env: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,

        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_application_status(s: &str) -> Result<ApplicationStatus, String> {
    s.parse()
        .map_err(|_| format!("expected pending, approved or rejected, got '{s}'"))
}

fn parse_booking_status(s: &str) -> Result<BookingStatus, String> {
    s.parse()
        .map_err(|_| format!("expected created, active, completed or cancelled, got '{s}'"))
}

fn parse_theme(s: &str) -> Result<ThemePreference, String> {
    s.parse()
        .map_err(|_| format!("expected light, dark or system, got '{s}'"))
}
