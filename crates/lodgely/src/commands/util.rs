//! Shared helpers for command handlers.

use std::io::IsTerminal;

use lodgely_core::{
    Confirm, ConfirmPrompt, CoreError, EngineConfig, ListingClient, ListingSnapshot,
    RefreshOutcome, SyncEngine,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// A connected engine plus what the handlers need to report errors.
pub struct Session {
    pub engine: SyncEngine<ListingClient>,
    pub profile_name: String,
    pub url: String,
}

/// Resolve config and flags into a sync engine. Does not touch the network.
pub fn connect(global: &GlobalOpts) -> Result<Session, CliError> {
    connect_with(global, |_| {})
}

/// Like [`connect`], with a hook to adjust the engine settings.
pub fn connect_with(
    global: &GlobalOpts,
    tune: impl FnOnce(&mut EngineConfig),
) -> Result<Session, CliError> {
    let cfg = config::load_config_or_default();
    let mut resolved = config::resolve(global, &cfg)?;
    tune(&mut resolved.engine);
    let url = resolved.server.url.to_string();
    let client = resolved.server.build_client()?;

    tracing::debug!(
        profile = %resolved.profile_name,
        %url,
        authorized = client.is_authorized(),
        "connecting to listing server"
    );

    Ok(Session {
        engine: SyncEngine::new(client, resolved.engine),
        profile_name: resolved.profile_name,
        url,
    })
}

/// Turn a refresh outcome into the snapshot to render, or a connection error.
///
/// Only the first refresh of an invocation is fatal; later failures keep
/// the previous view.
pub fn require_refresh(
    session: &Session,
    outcome: RefreshOutcome,
) -> Result<ListingSnapshot, CliError> {
    match outcome {
        RefreshOutcome::Failed { reason } => Err(CliError::ConnectionFailed {
            url: session.url.clone(),
            reason,
        }),
        RefreshOutcome::Applied { .. }
        | RefreshOutcome::AlreadyRunning
        | RefreshOutcome::Discarded => Ok(session.engine.snapshot()),
    }
}

/// Attach the active profile to authorization failures.
pub fn mutation_error(err: CoreError, profile_name: &str) -> CliError {
    match err {
        CoreError::Unauthorized => CliError::Unauthorized {
            profile: profile_name.to_owned(),
        },
        other => other.into(),
    }
}

// ── Confirmation ────────────────────────────────────────────────────

/// How the CLI answers the controller's confirmation step.
#[derive(Debug, Clone, Copy)]
pub enum CliConfirm {
    /// `--yes`: approve without asking.
    Assume,
    /// Ask on the terminal.
    Prompt,
}

impl CliConfirm {
    /// `--yes` approves everything; otherwise a terminal is required.
    pub fn for_action(global: &GlobalOpts, action: &str) -> Result<Self, CliError> {
        if global.yes {
            return Ok(Self::Assume);
        }
        if !std::io::stdin().is_terminal() {
            return Err(CliError::NonInteractiveRequiresYes {
                action: action.into(),
            });
        }
        Ok(Self::Prompt)
    }
}

impl Confirm for CliConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        match self {
            Self::Assume => true,
            Self::Prompt => {
                let message = prompt.message.clone();
                // dialoguer blocks on stdin.
                tokio::task::spawn_blocking(move || {
                    dialoguer::Confirm::new()
                        .with_prompt(message)
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                })
                .await
                .unwrap_or(false)
            }
        }
    }
}
