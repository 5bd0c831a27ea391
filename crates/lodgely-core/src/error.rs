// ── Core error types ──
//
// User-facing errors from lodgely-core. Consumers never see HTTP status
// codes or JSON failures directly: `From<lodgely_api::Error>` folds the
// transport layer into the mutation taxonomy.

use thiserror::Error;

use crate::mutation::MutationPhase;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Mutation taxonomy ────────────────────────────────────────────
    /// Malformed or missing field. Recovered locally; no remote call is made.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No authorized caller, or the server refused the session.
    #[error("Not authorized to modify listings")]
    Unauthorized,

    /// The listing vanished remotely. Not retryable.
    #[error("Listing not found: {identifier}")]
    NotFound { identifier: String },

    /// Network or server-side failure. The caller may retry.
    #[error("Request failed: {message}")]
    TransientFailure { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// Another mutation on the same listing has not resolved yet.
    #[error("A mutation for listing {identifier} is already in progress")]
    MutationInFlight { identifier: String },

    #[error("Illegal mutation transition: {from} -> {to}")]
    IllegalTransition {
        from: MutationPhase,
        to: MutationPhase,
    },

    #[error("Sync engine has been shut down")]
    EngineStopped,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether a manual retry from the same draft or identifier makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lodgely_api::Error> for CoreError {
    fn from(err: lodgely_api::Error) -> Self {
        match err {
            lodgely_api::Error::Validation { field, reason } => Self::Validation {
                field: field.to_owned(),
                reason,
            },
            lodgely_api::Error::Unauthorized { .. } => Self::Unauthorized,
            lodgely_api::Error::NotFound { resource } => Self::NotFound {
                identifier: resource,
            },
            lodgely_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            other if other.is_not_found() => Self::NotFound {
                identifier: String::new(),
            },
            other => Self::TransientFailure {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_fold_into_taxonomy() {
        let err = CoreError::from(lodgely_api::Error::Unauthorized {
            message: "no session".into(),
        });
        assert!(matches!(err, CoreError::Unauthorized));

        let err = CoreError::from(lodgely_api::Error::NotFound {
            resource: "1".into(),
        });
        assert!(matches!(err, CoreError::NotFound { ref identifier } if identifier == "1"));

        let err = CoreError::from(lodgely_api::Error::Validation {
            field: "title",
            reason: "title is required".into(),
        });
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "title"));
    }

    #[test]
    fn server_and_decode_errors_are_transient() {
        let err = CoreError::from(lodgely_api::Error::Server {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(err.is_retryable());

        let err = CoreError::from(lodgely_api::Error::Deserialization {
            message: "expected array".into(),
            body: "{}".into(),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(!CoreError::Unauthorized.is_retryable());
        assert!(
            !CoreError::NotFound {
                identifier: "1".into()
            }
            .is_retryable()
        );
        assert!(!CoreError::validation("price", "must be a number").is_retryable());
    }
}
