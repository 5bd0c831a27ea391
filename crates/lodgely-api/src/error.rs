use thiserror::Error;

/// Top-level error type for the `lodgely-api` crate.
///
/// Covers every failure mode of the listing endpoints: local request
/// validation, session authorization, transport, and response decoding.
/// `lodgely-core` maps these into its mutation error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request validation ──────────────────────────────────────────
    /// The request was rejected locally before anything was sent.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    // ── Authorization ───────────────────────────────────────────────
    /// No session token is configured, or the server refused it.
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    // ── Server responses ────────────────────────────────────────────
    /// The listing does not exist on the server.
    #[error("Listing not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-success response.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the caller lacks authorization.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
