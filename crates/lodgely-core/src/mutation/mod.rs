// ── Mutation controller ──
//
// Drives one user-confirmed edit or delete through confirmation,
// optimistic registration, the remote call, and commit or rollback.

mod confirm;
mod controller;
mod notification;
mod phase;
mod session;

pub use confirm::{AutoConfirm, Confirm, ConfirmPrompt};
pub use controller::{MutationController, MutationOutcome};
pub use notification::{Notification, NotificationLevel};
pub use phase::MutationPhase;
pub use session::{EditSession, ListingDraft};
