//! Reactive listing cache between `lodgely-api` and presentation consumers.
//!
//! - **[`SyncEngine`]** owns the client-visible listing set. It polls the
//!   remote collection on an interval and merges in-flight optimistic
//!   mutations so a racing refresh can never resurrect a pending delete or
//!   revert a pending edit.
//!
//! - **[`MutationController`]** drives a single edit or delete through an
//!   explicit [`MutationPhase`] state machine: confirmation, optimistic
//!   registration, remote call, commit or rollback. At most one remote call
//!   per listing is in flight.
//!
//! - **[`ListingStream`]** is the subscription handle vended by the engine,
//!   with `current()` / `latest()` / `changed()` for reactive rendering.
//!
//! - **[`ListingView`]** holds presentation state: category filter and the
//!   detail/edit selections.
//!
//! - **[`ListingRemote`]** is the seam to the listing server, implemented
//!   for [`lodgely_api::ListingClient`].

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod mutation;
pub mod remote;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{EngineConfig, ServerConfig, TlsVerification};
pub use engine::{
    MutationKind, MutationStatus, PendingMutation, RefreshOutcome, Resolution, SyncEngine,
};
pub use error::CoreError;
pub use lodgely_api::ListingClient;
pub use model::{Listing, ListingId, MutationId};
pub use mutation::{
    AutoConfirm, Confirm, ConfirmPrompt, EditSession, ListingDraft, MutationController,
    MutationOutcome, MutationPhase, Notification, NotificationLevel,
};
pub use remote::ListingRemote;
pub use stream::{ListingSnapshot, ListingStream};
pub use view::{CategoryFilter, ListingView, categories};
