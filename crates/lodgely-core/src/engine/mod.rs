// ── Sync engine ──
//
// Owns the client-visible listing set. Polls the remote collection on an
// interval and merges the pending-mutation table into every published
// snapshot so a refresh never resurrects a pending delete or reverts a
// pending edit.

mod pending;
mod state;

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use pending::{MutationKind, MutationStatus, PendingMutation, Resolution};

use self::state::SyncState;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{Listing, ListingId, MutationId};
use crate::remote::ListingRemote;
use crate::stream::{ListingSnapshot, ListingStream};

// ── RefreshOutcome ───────────────────────────────────────────────

/// Result of one refresh attempt. Refresh failures are never errors: the
/// previous view is kept and the failure is reported here and in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched collection replaced the listing set.
    Applied { listings: usize },
    /// Another refresh was in progress; this one was not issued.
    AlreadyRunning,
    /// The remote call failed; the previous view is unchanged.
    Failed { reason: String },
    /// The engine was shut down before the result arrived.
    Discarded,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ── SyncEngine ───────────────────────────────────────────────────

/// Explicit polling timer owned by one engine instance.
struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// The listing cache and its refresh lifecycle.
///
/// Cheaply cloneable via `Arc<EngineInner>`. Every write to the listing set
/// and pending table goes through one state lock, so refresh application is
/// serialized with mutation registration and resolution.
pub struct SyncEngine<R: ListingRemote> {
    inner: Arc<EngineInner<R>>,
}

impl<R: ListingRemote> Clone for SyncEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct EngineInner<R: ListingRemote> {
    remote: R,
    config: EngineConfig,
    state: Mutex<SyncState>,
    /// Held for the duration of a refresh; `try_lock` failure means overlap.
    refresh_gate: Mutex<()>,
    snapshot: watch::Sender<ListingSnapshot>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    /// Root token. Cancelled on shutdown or drop; poll tasks hold children.
    shutdown: CancellationToken,
    poll: Mutex<Option<PollHandle>>,
}

impl<R: ListingRemote> Drop for EngineInner<R> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<R: ListingRemote> SyncEngine<R> {
    /// Create an engine around a remote. Does NOT fetch: call
    /// [`start()`](Self::start) or [`refresh_now()`](Self::refresh_now).
    pub fn new(remote: R, config: EngineConfig) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            inner: Arc::new(EngineInner {
                remote,
                config,
                state: Mutex::new(SyncState::default()),
                refresh_gate: Mutex::new(()),
                snapshot,
                last_refresh,
                shutdown: CancellationToken::new(),
                poll: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The remote this engine reads from.
    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Refresh once immediately, then spawn the poll task.
    ///
    /// Returns the initial refresh's outcome, or `AlreadyRunning` without
    /// refreshing if the engine was already started.
    pub async fn start(&self) -> Result<RefreshOutcome, CoreError> {
        if !self.is_live() {
            return Err(CoreError::EngineStopped);
        }

        let mut poll = self.inner.poll.lock().await;
        if poll.is_some() {
            debug!("sync engine already started");
            return Ok(RefreshOutcome::AlreadyRunning);
        }

        let outcome = self.refresh_now().await;

        let cancel = self.inner.shutdown.child_token();
        let task = if self.inner.config.polls() {
            let period = self.inner.config.refresh_interval;
            info!(interval_secs = period.as_secs_f64(), "starting listing poll");
            Some(tokio::spawn(poll_task(
                Arc::downgrade(&self.inner),
                period,
                cancel.clone(),
            )))
        } else {
            debug!("periodic refresh disabled");
            None
        };
        *poll = Some(PollHandle { cancel, task });

        Ok(outcome)
    }

    /// Cancel the periodic refresh and join the poll task.
    ///
    /// A refresh already dispatched by the timer completes first; once this
    /// returns the timer issues no further refreshes. The engine can be
    /// started again.
    pub async fn stop(&self) {
        let handle = self.inner.poll.lock().await.take();
        let Some(handle) = handle else { return };

        handle.cancel.cancel();
        if let Some(task) = handle.task {
            let _ = task.await;
        }
        debug!("listing poll stopped");
    }

    /// Stop polling and retire the engine. Remote results arriving after
    /// this are discarded and new mutations are refused.
    pub async fn shutdown(&self) {
        self.stop().await;
        self.inner.shutdown.cancel();
        info!("sync engine shut down");
    }

    /// Whether the poll lifecycle is started.
    pub async fn is_running(&self) -> bool {
        self.inner.poll.lock().await.is_some()
    }

    /// Whether results are still being applied.
    pub fn is_live(&self) -> bool {
        !self.inner.shutdown.is_cancelled()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch the whole collection and merge it into the listing set.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let Ok(_gate) = self.inner.refresh_gate.try_lock() else {
            debug!("refresh already in progress, skipping");
            return RefreshOutcome::AlreadyRunning;
        };
        if !self.is_live() {
            return RefreshOutcome::Discarded;
        }

        let dispatched_at = self.inner.state.lock().await.epoch();
        let result = self.inner.remote.get_all().await;

        if !self.is_live() {
            debug!("engine shut down during refresh, discarding result");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(listings) => {
                let count = listings.len();
                {
                    let mut state = self.inner.state.lock().await;
                    state.apply_refresh(listings, dispatched_at);
                    self.publish(&state);
                }
                self.inner.last_refresh.send_replace(Some(Utc::now()));
                debug!(listings = count, "refresh applied");
                RefreshOutcome::Applied { listings: count }
            }
            Err(e) => {
                warn!(error = %e, "listing refresh failed, keeping previous view");
                RefreshOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    // ── Pending mutations ────────────────────────────────────────

    /// Record an optimistic mutation and republish the merged view.
    pub async fn register_pending_mutation(
        &self,
        mutation: PendingMutation,
    ) -> Result<MutationId, CoreError> {
        if !self.is_live() {
            return Err(CoreError::EngineStopped);
        }

        let id = mutation.id;
        let listing_id = mutation.listing_id.clone();
        let kind = mutation.kind;

        let mut state = self.inner.state.lock().await;
        state.register(mutation)?;
        self.publish(&state);
        drop(state);

        debug!(listing_id = %listing_id, mutation_id = %id, %kind, "pending mutation registered");
        Ok(id)
    }

    /// Resolve the pending mutation for `listing_id`.
    ///
    /// `Committed` applies the effect to the listing set permanently;
    /// `Failed` clears the entry so the listing shows its last refreshed
    /// value again. Returns `None` if nothing was pending or the engine has
    /// been shut down.
    pub async fn resolve_pending_mutation(
        &self,
        listing_id: &ListingId,
        resolution: Resolution,
    ) -> Option<PendingMutation> {
        if !self.is_live() {
            debug!(listing_id = %listing_id, "engine shut down, discarding resolution");
            return None;
        }

        let mut state = self.inner.state.lock().await;
        let resolved = state.resolve(listing_id, resolution)?;
        self.publish(&state);
        drop(state);

        debug!(
            listing_id = %listing_id,
            mutation_id = %resolved.id,
            status = %resolved.status,
            "pending mutation resolved"
        );
        Some(resolved)
    }

    /// Pending mutations in registration order.
    pub async fn pending_mutations(&self) -> Vec<PendingMutation> {
        self.inner.state.lock().await.pending()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Current merged view (cheap `Arc` clone).
    pub fn snapshot(&self) -> ListingSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Look up a visible listing.
    pub fn get(&self, id: &ListingId) -> Option<Arc<Listing>> {
        self.inner
            .snapshot
            .borrow()
            .iter()
            .find(|l| &l.id == id)
            .cloned()
    }

    pub fn subscribe(&self) -> ListingStream {
        ListingStream::new(self.inner.snapshot.subscribe())
    }

    /// Time of the last applied refresh.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    /// How stale the listing set is, if it was ever refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|at| Utc::now() - at)
    }

    // ── Private helpers ──────────────────────────────────────────

    /// Publish the merged view. Subscribers are only woken when it changed,
    /// so an identical refresh causes no re-render.
    fn publish(&self, state: &SyncState) {
        let merged = state.merged();
        self.inner.snapshot.send_if_modified(|current| {
            if **current == merged {
                false
            } else {
                *current = Arc::new(merged);
                true
            }
        });
    }
}

/// Periodically refresh the listing set.
///
/// Holds only a weak reference so a dropped engine cannot keep polling.
async fn poll_task<R: ListingRemote>(
    engine: Weak<EngineInner<R>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = engine.upgrade() else { break };
                let outcome = SyncEngine { inner }.refresh_now().await;
                debug!(?outcome, "poll tick");
            }
        }
    }
}
