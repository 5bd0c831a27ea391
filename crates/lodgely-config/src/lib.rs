//! Shared configuration for the lodgely CLI.
//!
//! TOML profiles, session-token resolution (env + keyring + plaintext),
//! and translation to `lodgely_core::{ServerConfig, EngineConfig}`. The
//! CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lodgely_core::{EngineConfig, ServerConfig, TlsVerification};

/// Keyring service name for stored session tokens.
pub const KEYRING_SERVICE: &str = "lodgely";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between background refreshes. 0 = never.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    5
}

/// A named listing-server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://localhost:3000").
    pub server: String,

    /// Session token (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Environment variable name containing the session token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override refresh interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "lodgely", "lodgely").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lodgely");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from a specific file, layered over defaults and under
/// `LODGELY_`-prefixed environment variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LODGELY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Session token resolution (without CLI flags) ────────────────────

/// Resolve the session token: profile env var, then keyring, then plaintext.
///
/// `None` is not an error: the engine runs read-only and mutations fail
/// as unauthorized.
pub fn resolve_session_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's session_token_env → env var lookup
    if let Some(ref env_name) = profile.session_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .session_token
        .as_ref()
        .filter(|t| !t.trim().is_empty())
        .map(|t| SecretString::from(t.clone()))
}

/// Store a session token in the system keyring for `profile_name`.
pub fn store_session_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(token.expose_secret())
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/session-token")
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `ServerConfig` from a profile and global defaults.
pub fn profile_to_server_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServerConfig, ConfigError> {
    let url: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ServerConfig {
        url,
        session_token: resolve_session_token(profile, profile_name),
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

/// Build the engine's polling configuration. A zero interval disables polling.
pub fn profile_to_engine_config(profile: &Profile, defaults: &Defaults) -> EngineConfig {
    let secs = profile
        .refresh_interval_secs
        .unwrap_or(defaults.refresh_interval_secs);
    EngineConfig::with_interval(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "local"

[defaults]
output = "json"
refresh_interval_secs = 10

[profiles.local]
server = "http://localhost:3000"
session_token = "plain-token"

[profiles.staging]
server = "https://staging.lodgely.example"
insecure = true
timeout = 5
refresh_interval_secs = 0
"#;

    fn load_sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_over_defaults() {
        let cfg = load_sample();
        assert_eq!(cfg.active_profile_name(), "local");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.profiles.len(), 2);
        assert!(cfg.profile("missing").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.defaults.refresh_interval_secs, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                server: "http://localhost:3000".into(),
                refresh_interval_secs: Some(2),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.server, "http://localhost:3000");
        assert_eq!(profile.refresh_interval_secs, Some(2));
        assert!(profile.session_token.is_none());
    }

    #[test]
    fn server_config_from_profile() {
        let cfg = load_sample();
        let staging = cfg.profile("staging").unwrap();
        let server =
            profile_to_server_config(staging, "lodgely-test-staging", &cfg.defaults).unwrap();

        assert_eq!(server.url.as_str(), "https://staging.lodgely.example/");
        assert_eq!(server.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(server.timeout, Duration::from_secs(5));
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let cfg = load_sample();
        let local = cfg.profile("local").unwrap();
        let token = resolve_session_token(local, "lodgely-test-local").unwrap();
        assert_eq!(token.expose_secret(), "plain-token");
    }

    #[test]
    fn engine_interval_follows_profile_then_defaults() {
        let cfg = load_sample();
        let local = profile_to_engine_config(cfg.profile("local").unwrap(), &cfg.defaults);
        assert_eq!(local.refresh_interval, Duration::from_secs(10));

        let staging = profile_to_engine_config(cfg.profile("staging").unwrap(), &cfg.defaults);
        assert!(staging.refresh_interval.is_zero());
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let profile = Profile {
            server: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_server_config(&profile, "x", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }
}
