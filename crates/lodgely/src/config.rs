//! CLI configuration: thin wrapper around `lodgely_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--server, --session-token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use lodgely_core::{EngineConfig, ServerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use lodgely_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
    store_session_token,
};

/// Fully resolved connection settings for one invocation.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build server and engine settings from the config file, profile, and
/// CLI overrides. Flags win over profile values.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let (mut server, engine) = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut profile = profile.clone();
        if let Some(ref url_str) = global.server {
            profile.server.clone_from(url_str);
        }
        (
            lodgely_config::profile_to_server_config(&profile, &profile_name, &cfg.defaults)?,
            lodgely_config::profile_to_engine_config(&profile, &cfg.defaults),
        )
    } else if global.profile.is_some() {
        // An explicitly named profile must exist.
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    } else {
        // No profile: build from flags / env alone.
        let url_str = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let mut server = ServerConfig::new(parse_url(url_str)?);
        server.timeout = Duration::from_secs(cfg.defaults.timeout);
        if cfg.defaults.insecure {
            server.tls = TlsVerification::DangerAcceptInvalid;
        }
        (
            server,
            EngineConfig::with_interval(Duration::from_secs(cfg.defaults.refresh_interval_secs)),
        )
    };

    apply_overrides(&mut server, global);

    Ok(Resolved {
        profile_name,
        server,
        engine,
    })
}

fn apply_overrides(server: &mut ServerConfig, global: &GlobalOpts) {
    // Flag first in the token chain.
    if let Some(ref token) = global.session_token {
        server.session_token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        server.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        server.timeout = Duration::from_secs(secs);
    }
}

fn parse_url(url_str: &str) -> Result<url::Url, CliError> {
    url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })
}
