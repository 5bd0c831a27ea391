//! Clap derive structures for the `lodgely` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lodgely -- browse and manage rental listings from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "lodgely",
    version,
    about = "Browse and manage rental listings from the command line",
    long_about = "Lists, filters, edits and deletes rental listings on a listing server.\n\n\
        Edits and deletes apply optimistically and roll back if the server\n\
        rejects them. `lodgely watch` keeps a live view refreshed on an interval.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "LODGELY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Listing server URL (overrides profile)
    #[arg(long, short = 's', env = "LODGELY_SERVER", global = true)]
    pub server: Option<String>,

    /// Session token for mutating calls
    #[arg(long, env = "LODGELY_SESSION_TOKEN", global = true, hide_env = true)]
    pub session_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LODGELY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "LODGELY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LODGELY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// Browse, edit and delete listings
    #[command(alias = "ls", alias = "l")]
    Listings(ListingsArgs),

    /// Keep a live, auto-refreshing view of the listings
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Listings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListingsArgs {
    #[command(subcommand)]
    pub command: ListingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListingsCommand {
    /// List listings, optionally filtered by category
    #[command(alias = "ls")]
    List {
        /// Only show listings in this category ("all" shows everything)
        #[arg(long, short = 'c')]
        category: Option<String>,
    },

    /// List the distinct categories present in the current listings
    Categories,

    /// Show one listing in detail
    Show {
        /// Listing ID
        id: String,
    },

    /// Edit a listing (only the given fields change)
    Edit(EditArgs),

    /// Delete a listing
    #[command(alias = "rm")]
    Delete {
        /// Listing ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Listing ID
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Nightly price (numeric, non-negative)
    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Number of rooms
    #[arg(long)]
    pub rooms: Option<u32>,

    /// Number of bathrooms
    #[arg(long)]
    pub baths: Option<u32>,

    /// Maximum number of guests
    #[arg(long)]
    pub guests: Option<u32>,

    /// Location code
    #[arg(long)]
    pub location: Option<String>,
}

impl EditArgs {
    /// Whether any field flag was passed.
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.price.is_some()
            || self.category.is_some()
            || self.image.is_some()
            || self.rooms.is_some()
            || self.baths.is_some()
            || self.guests.is_some()
            || self.location.is_some()
    }
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh interval, e.g. "5s" or "1m" (overrides profile)
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Only show listings in this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Show details of this listing below the table while it is visible
    #[arg(long, value_name = "ID")]
    pub select: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the current configuration (secrets masked)
    Show,

    /// Interactive configuration wizard
    Init,

    /// Set a profile key
    Set {
        /// Key: server, session_token_env, refresh_interval_secs, timeout, insecure, ca_cert
        key: String,
        value: String,
    },

    /// Store a session token in the system keyring
    SetToken {
        /// Profile to store the token for (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
