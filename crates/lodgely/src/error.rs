//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use lodgely_config::ConfigError;
use lodgely_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach listing server at {url}")]
    #[diagnostic(
        code(lodgely::connection_failed),
        help(
            "Check that the server is running and accessible.\n\
             URL: {url}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request failed: {message}")]
    #[diagnostic(
        code(lodgely::request_failed),
        help("The listing was restored. Re-run the command to retry.")
    )]
    RequestFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not authorized to modify listings")]
    #[diagnostic(
        code(lodgely::unauthorized),
        help(
            "Provide a session token with --session-token, or store one with:\n\
             lodgely config set-token --profile {profile}"
        )
    )]
    Unauthorized { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Listing '{identifier}' not found")]
    #[diagnostic(
        code(lodgely::not_found),
        help("Run: lodgely listings list to see available listings")
    )]
    NotFound { identifier: String },

    #[error("Listing '{identifier}' already has a change in progress")]
    #[diagnostic(
        code(lodgely::in_flight),
        help("Wait for the pending change to finish, then try again.")
    )]
    InFlight { identifier: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lodgely::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lodgely::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lodgely config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No listing server configured")]
    #[diagnostic(
        code(lodgely::no_config),
        help(
            "Pass --server <URL>, or create a profile with: lodgely config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(lodgely::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(code(lodgely::keyring))]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lodgely::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(lodgely::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(lodgely::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(lodgely::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(lodgely::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RequestFailed { .. } => exit_code::CONNECTION,
            Self::Unauthorized { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InFlight { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::Unauthorized => Self::Unauthorized {
                profile: "default".into(),
            },
            CoreError::NotFound { identifier } => Self::NotFound { identifier },
            CoreError::TransientFailure { message } => Self::RequestFailed { message },
            CoreError::MutationInFlight { identifier } => Self::InFlight { identifier },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::IllegalTransition { .. }
            | CoreError::EngineStopped
            | CoreError::Internal(_)) => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see lodgely config show)".into(),
            },
            ConfigError::Keyring(message) => Self::Keyring { message },
            ConfigError::Serialization(e) => Self::Toml(e),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
