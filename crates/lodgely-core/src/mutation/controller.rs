// ── Mutation controller ──
//
// Single-flight per listing: a claim in `in_flight` is held from the first
// intent until the remote call resolves, and a second intent on the same
// listing is rejected. Different listings proceed in parallel.
//
// A failed delete is remembered in `failed_deletes`, so `retry_delete` only
// re-enters `Applying` from a recorded, retryable failure.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::confirm::{Confirm, ConfirmPrompt};
use super::notification::Notification;
use super::phase::MutationPhase;
use super::session::EditSession;
use crate::engine::{MutationKind, PendingMutation, Resolution, SyncEngine};
use crate::error::CoreError;
use crate::model::{Listing, ListingId, MutationId};
use crate::remote::ListingRemote;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

/// How a confirmed (or declined) mutation ended.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// The server accepted the mutation. `listing` is the committed value
    /// of an edit.
    Committed {
        mutation_id: MutationId,
        listing: Option<Arc<Listing>>,
    },
    /// The mutation reached `Failed`; any optimistic change was rolled back.
    Failed { error: CoreError },
    /// The user declined the confirmation prompt. Nothing happened.
    Cancelled,
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Orchestrates edits and deletes against a [`SyncEngine`].
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
pub struct MutationController<R: ListingRemote, C: Confirm> {
    inner: Arc<ControllerInner<R, C>>,
}

impl<R: ListingRemote, C: Confirm> Clone for MutationController<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<R: ListingRemote, C: Confirm> {
    engine: SyncEngine<R>,
    confirm: C,
    in_flight: DashMap<ListingId, MutationPhase>,
    failed_deletes: DashMap<ListingId, CoreError>,
    notifications: broadcast::Sender<Notification>,
}

impl<R: ListingRemote, C: Confirm> MutationController<R, C> {
    pub fn new(engine: SyncEngine<R>, confirm: C) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self {
            inner: Arc::new(ControllerInner {
                engine,
                confirm,
                in_flight: DashMap::new(),
                failed_deletes: DashMap::new(),
                notifications,
            }),
        }
    }

    pub fn engine(&self) -> &SyncEngine<R> {
        &self.inner.engine
    }

    /// Subscribe to success/error notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    /// Phase of the in-flight mutation on `id`, or `Idle`.
    pub fn phase(&self, id: &ListingId) -> MutationPhase {
        self.inner
            .in_flight
            .get(id)
            .map_or(MutationPhase::Idle, |p| *p)
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Confirm, then optimistically delete `id`.
    ///
    /// `Err` means nothing was attempted (invalid id, another mutation in
    /// flight). Remote and authorization failures come back as
    /// `MutationOutcome::Failed`.
    pub async fn delete(&self, id: &ListingId) -> Result<MutationOutcome, CoreError> {
        require_id(id)?;
        let flight = self.claim(id, MutationPhase::AwaitingConfirmation)?;
        self.inner.failed_deletes.remove(id);

        let title = self.inner.engine.get(id).map(|l| l.title.clone());
        let prompt = ConfirmPrompt::delete(id.clone(), title);
        if !self.inner.confirm.confirm(&prompt).await {
            flight.advance(MutationPhase::Idle)?;
            debug!(listing_id = %id, "delete declined");
            return Ok(MutationOutcome::Cancelled);
        }

        flight.advance(MutationPhase::Applying)?;
        self.apply_delete(id, &flight).await
    }

    /// Re-issue a failed delete without asking again.
    ///
    /// Only a delete that was confirmed and then failed with a retryable
    /// error can be retried. Anything else is an `IllegalTransition` out of
    /// `Idle`.
    pub async fn retry_delete(&self, id: &ListingId) -> Result<MutationOutcome, CoreError> {
        require_id(id)?;
        let retryable = self
            .inner
            .failed_deletes
            .get(id)
            .is_some_and(|error| error.is_retryable());
        if !retryable {
            debug!(listing_id = %id, "no retryable delete failure recorded");
            return Err(CoreError::IllegalTransition {
                from: MutationPhase::Idle,
                to: MutationPhase::Applying,
            });
        }

        let flight = self.claim(id, MutationPhase::Failed)?;
        self.inner.failed_deletes.remove(id);
        flight.advance(MutationPhase::Applying)?;
        self.apply_delete(id, &flight).await
    }

    async fn apply_delete(
        &self,
        id: &ListingId,
        flight: &FlightGuard<'_>,
    ) -> Result<MutationOutcome, CoreError> {
        let engine = &self.inner.engine;

        if !engine.remote().is_authorized() {
            flight.advance(MutationPhase::Failed)?;
            return Ok(self.fail_delete(id, CoreError::Unauthorized));
        }

        let mutation_id = engine
            .register_pending_mutation(PendingMutation::delete(id.clone()))
            .await?;

        match engine.remote().delete_by_id(id).await {
            Ok(()) => {
                engine
                    .resolve_pending_mutation(id, Resolution::Committed { confirmed: None })
                    .await;
                flight.advance(MutationPhase::Committed)?;
                info!(listing_id = %id, %mutation_id, "listing deleted");
                self.notify(Notification::success(id.clone(), MutationKind::Delete));
                Ok(MutationOutcome::Committed {
                    mutation_id,
                    listing: None,
                })
            }
            Err(error) => {
                engine
                    .resolve_pending_mutation(
                        id,
                        Resolution::Failed {
                            reason: error.to_string(),
                        },
                    )
                    .await;
                flight.advance(MutationPhase::Failed)?;
                Ok(self.fail_delete(id, error))
            }
        }
    }

    // ── Edit ─────────────────────────────────────────────────────

    /// Open an edit session on a visible listing.
    pub fn begin_edit(&self, id: &ListingId) -> Result<EditSession, CoreError> {
        require_id(id)?;
        let listing = self
            .inner
            .engine
            .get(id)
            .ok_or_else(|| CoreError::NotFound {
                identifier: id.to_string(),
            })?;
        debug!(listing_id = %id, "edit session opened");
        Ok(EditSession::new(listing))
    }

    /// Validate the draft and optimistically apply it.
    ///
    /// A validation failure leaves the session in `Editing` and returns
    /// `Err(CoreError::Validation)` without touching the engine or remote.
    /// A failed session may be saved again only when its error is retryable.
    pub async fn save(&self, session: &mut EditSession) -> Result<MutationOutcome, CoreError> {
        match session.phase {
            MutationPhase::Editing => {}
            MutationPhase::Failed if session.can_retry() => {}
            from => {
                return Err(CoreError::IllegalTransition {
                    from,
                    to: MutationPhase::Applying,
                });
            }
        }

        let proposed = session.validated()?;
        let id = session.listing_id().clone();
        let flight = self.claim(&id, MutationPhase::Applying)?;
        session.phase = session.phase.advance(MutationPhase::Applying)?;

        let outcome = self.apply_edit(&id, proposed, &flight).await;
        match &outcome {
            Ok(MutationOutcome::Committed { .. }) => {
                session.phase = MutationPhase::Committed;
                session.last_error = None;
            }
            Ok(MutationOutcome::Failed { error }) => {
                session.phase = MutationPhase::Failed;
                session.last_error = Some(error.clone());
            }
            Ok(MutationOutcome::Cancelled) | Err(_) => {
                session.phase = MutationPhase::Editing;
            }
        }
        outcome
    }

    async fn apply_edit(
        &self,
        id: &ListingId,
        proposed: Listing,
        flight: &FlightGuard<'_>,
    ) -> Result<MutationOutcome, CoreError> {
        let engine = &self.inner.engine;

        if !engine.remote().is_authorized() {
            flight.advance(MutationPhase::Failed)?;
            return Ok(self.fail(id, MutationKind::Edit, CoreError::Unauthorized));
        }

        let mutation_id = engine
            .register_pending_mutation(PendingMutation::edit(proposed.clone()))
            .await?;

        match engine.remote().update_by_id(id, &proposed).await {
            Ok(updated) => {
                let resolved = engine
                    .resolve_pending_mutation(
                        id,
                        Resolution::Committed {
                            confirmed: Some(updated.clone()),
                        },
                    )
                    .await;
                flight.advance(MutationPhase::Committed)?;
                info!(
                    listing_id = %id,
                    %mutation_id,
                    applied = resolved.is_some(),
                    "listing updated"
                );
                self.notify(Notification::success(id.clone(), MutationKind::Edit));
                Ok(MutationOutcome::Committed {
                    mutation_id,
                    listing: Some(Arc::new(updated)),
                })
            }
            Err(error) => {
                engine
                    .resolve_pending_mutation(
                        id,
                        Resolution::Failed {
                            reason: error.to_string(),
                        },
                    )
                    .await;
                flight.advance(MutationPhase::Failed)?;
                Ok(self.fail(id, MutationKind::Edit, error))
            }
        }
    }

    // ── Private helpers ──────────────────────────────────────────

    fn claim(&self, id: &ListingId, phase: MutationPhase) -> Result<FlightGuard<'_>, CoreError> {
        match self.inner.in_flight.entry(id.clone()) {
            Entry::Occupied(existing) => {
                debug!(listing_id = %id, phase = %existing.get(), "mutation already in flight");
                Err(CoreError::MutationInFlight {
                    identifier: id.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(phase);
                Ok(FlightGuard {
                    map: &self.inner.in_flight,
                    id: id.clone(),
                })
            }
        }
    }

    fn fail_delete(&self, id: &ListingId, error: CoreError) -> MutationOutcome {
        self.inner.failed_deletes.insert(id.clone(), error.clone());
        self.fail(id, MutationKind::Delete, error)
    }

    fn fail(&self, id: &ListingId, kind: MutationKind, error: CoreError) -> MutationOutcome {
        warn!(listing_id = %id, %kind, error = %error, "mutation failed");
        self.notify(Notification::error(id.clone(), kind, error.to_string()));
        MutationOutcome::Failed { error }
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine.
        let _ = self.inner.notifications.send(notification);
    }
}

fn require_id(id: &ListingId) -> Result<(), CoreError> {
    if id.is_blank() {
        return Err(CoreError::validation("id", "ID is required"));
    }
    Ok(())
}

/// Claim on one listing in the single-flight registry. Released on drop.
struct FlightGuard<'a> {
    map: &'a DashMap<ListingId, MutationPhase>,
    id: ListingId,
}

impl FlightGuard<'_> {
    fn advance(&self, next: MutationPhase) -> Result<(), CoreError> {
        let mut phase = self
            .map
            .get_mut(&self.id)
            .ok_or_else(|| CoreError::Internal(format!("lost flight claim for {}", self.id)))?;
        let advanced = phase.advance(next)?;
        *phase = advanced;
        debug!(listing_id = %self.id, phase = %advanced, "mutation phase");
        Ok(())
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}
