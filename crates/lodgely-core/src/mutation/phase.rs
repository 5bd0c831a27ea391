use serde::Serialize;
use strum::Display;

use crate::error::CoreError;

/// Lifecycle of a single mutation.
///
/// ```text
/// delete: Idle -> AwaitingConfirmation -> Applying -> Committed | Failed
/// edit:   Idle -> Editing              -> Applying -> Committed | Failed
/// ```
///
/// `Failed` may re-enter `Applying` (manual retry) or go back to `Editing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    #[default]
    Idle,
    AwaitingConfirmation,
    Editing,
    Applying,
    Committed,
    Failed,
}

impl MutationPhase {
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::AwaitingConfirmation | Self::Editing)
                | (
                    Self::AwaitingConfirmation | Self::Editing,
                    Self::Idle | Self::Applying
                )
                | (Self::Applying, Self::Committed | Self::Failed)
                | (Self::Failed, Self::Applying | Self::Editing | Self::Idle)
                | (Self::Committed, Self::Idle)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(self, next: Self) -> Result<Self, CoreError> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delete_path_is_legal() {
        let phase = MutationPhase::Idle
            .advance(MutationPhase::AwaitingConfirmation)
            .and_then(|p| p.advance(MutationPhase::Applying))
            .and_then(|p| p.advance(MutationPhase::Committed))
            .unwrap();
        assert_eq!(phase, MutationPhase::Committed);
    }

    #[test]
    fn edit_retry_path_is_legal() {
        let phase = MutationPhase::Idle
            .advance(MutationPhase::Editing)
            .and_then(|p| p.advance(MutationPhase::Applying))
            .and_then(|p| p.advance(MutationPhase::Failed))
            .and_then(|p| p.advance(MutationPhase::Applying))
            .unwrap();
        assert_eq!(phase, MutationPhase::Applying);
    }

    #[test]
    fn saving_while_applying_is_rejected() {
        let err = MutationPhase::Applying
            .advance(MutationPhase::Applying)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::IllegalTransition {
                from: MutationPhase::Applying,
                to: MutationPhase::Applying
            }
        ));
    }

    #[test]
    fn skipping_confirmation_is_rejected() {
        assert!(!MutationPhase::Idle.can_advance_to(MutationPhase::Applying));
        assert!(!MutationPhase::Committed.can_advance_to(MutationPhase::Applying));
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(
            MutationPhase::AwaitingConfirmation.to_string(),
            "awaiting_confirmation"
        );
    }
}
