// ── Runtime connection configuration ──
//
// These types describe *how* to reach a listing server and how often to
// poll it. They carry the session token but never touch disk: the CLI
// builds them from lodgely-config and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use lodgely_api::transport::{TlsMode, TransportConfig};
use lodgely_api::ListingClient;

use crate::error::CoreError;

/// Default polling period for the sync engine.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development servers).
    DangerAcceptInvalid,
}

/// Where the listing server lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server base URL (e.g., `http://localhost:3000`).
    pub url: Url,
    /// Session token; `None` means read-only.
    pub session_token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Request timeout applied by the transport.
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            session_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build the HTTP adapter for this server.
    pub fn build_client(&self) -> Result<ListingClient, CoreError> {
        let transport = build_transport(self);
        Ok(ListingClient::new(
            self.url.clone(),
            self.session_token.as_ref(),
            &transport,
        )?)
    }
}

/// Sync engine tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Period between background refreshes.
    pub refresh_interval: Duration,
    /// Spawn the background poll task on `start()`. When `false` only the
    /// initial refresh runs; a zero interval has the same effect.
    pub auto_refresh: bool,
}

impl EngineConfig {
    pub fn with_interval(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            ..Self::default()
        }
    }

    /// One-shot mode: initial refresh only, no timer.
    pub fn oneshot() -> Self {
        Self {
            auto_refresh: false,
            ..Self::default()
        }
    }

    pub(crate) fn polls(&self) -> bool {
        self.auto_refresh && !self.refresh_interval.is_zero()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            auto_refresh: true,
        }
    }
}

fn build_transport(config: &ServerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // ListingClient::new installs one when a token is set
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_polls_every_five_seconds() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.refresh_interval, Duration::from_secs(5));
        assert!(cfg.polls());
    }

    #[test]
    fn zero_interval_or_oneshot_never_polls() {
        assert!(!EngineConfig::with_interval(Duration::ZERO).polls());
        assert!(!EngineConfig::oneshot().polls());
    }

    #[test]
    fn client_authorization_follows_token() {
        let mut cfg = ServerConfig::new("http://localhost:3000".parse().unwrap());
        assert!(!cfg.build_client().unwrap().is_authorized());

        cfg.session_token = Some(SecretString::from("tok".to_string()));
        assert!(cfg.build_client().unwrap().is_authorized());
    }
}
