// In-memory listing server for engine and controller tests.
//
// Remote calls can be held at a `Gate` so a test can interleave a refresh
// with a mutation deterministically.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use lodgely_core::{
    AutoConfirm, Confirm, ConfirmPrompt, CoreError, EngineConfig, Listing, ListingId,
    ListingRemote, MutationController, SyncEngine,
};

// ── Gate ────────────────────────────────────────────────────────────

/// Holds one call until released. `entered` fires when the call arrives.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

// ── FakeRemote ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeState {
    listings: Mutex<Vec<Listing>>,
    unauthorized: AtomicBool,
    get_failures: Mutex<VecDeque<CoreError>>,
    mutation_failures: Mutex<VecDeque<CoreError>>,
    get_gate: Mutex<Option<Arc<Gate>>>,
    mutation_gate: Mutex<Option<Arc<Gate>>>,
    get_calls: AtomicUsize,
    mutation_log: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeRemote(Arc<FakeState>);

impl FakeRemote {
    pub fn with(listings: Vec<Listing>) -> Self {
        let remote = Self::default();
        remote.set_listings(listings);
        remote
    }

    pub fn set_listings(&self, listings: Vec<Listing>) {
        *self.0.listings.lock().unwrap() = listings;
    }

    pub fn server_listings(&self) -> Vec<Listing> {
        self.0.listings.lock().unwrap().clone()
    }

    pub fn deauthorize(&self) {
        self.0.unauthorized.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_get(&self, error: CoreError) {
        self.0.get_failures.lock().unwrap().push_back(error);
    }

    pub fn fail_next_mutation(&self, error: CoreError) {
        self.0.mutation_failures.lock().unwrap().push_back(error);
    }

    /// Hold the next `get_all` call.
    pub fn gate_next_get(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.0.get_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold the next update or delete call.
    pub fn gate_next_mutation(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.0.mutation_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn get_calls(&self) -> usize {
        self.0.get_calls.load(Ordering::SeqCst)
    }

    /// Mutation calls received, as `"delete:<id>"` / `"update:<id>"`.
    pub fn mutation_log(&self) -> Vec<String> {
        self.0.mutation_log.lock().unwrap().clone()
    }

    async fn enter_mutation(&self, entry: String) -> Option<CoreError> {
        self.0.mutation_log.lock().unwrap().push(entry);
        let gate = self.0.mutation_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.0.mutation_failures.lock().unwrap().pop_front()
    }
}

impl ListingRemote for FakeRemote {
    fn is_authorized(&self) -> bool {
        !self.0.unauthorized.load(Ordering::SeqCst)
    }

    async fn get_all(&self) -> Result<Vec<Listing>, CoreError> {
        self.0.get_calls.fetch_add(1, Ordering::SeqCst);
        // Snapshot at dispatch: a held call returns what the server had then.
        let snapshot = self.server_listings();
        let gate = self.0.get_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let failure = self.0.get_failures.lock().unwrap().pop_front();
        match failure {
            Some(error) => Err(error),
            None => Ok(snapshot),
        }
    }

    async fn update_by_id(&self, id: &ListingId, draft: &Listing) -> Result<Listing, CoreError> {
        if let Some(error) = self.enter_mutation(format!("update:{id}")).await {
            return Err(error);
        }
        let mut listings = self.0.listings.lock().unwrap();
        let slot = listings
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| CoreError::NotFound {
                identifier: id.to_string(),
            })?;
        *slot = draft.clone();
        Ok(draft.clone())
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<(), CoreError> {
        if let Some(error) = self.enter_mutation(format!("delete:{id}")).await {
            return Err(error);
        }
        let mut listings = self.0.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|l| &l.id != id);
        if listings.len() == before {
            return Err(CoreError::NotFound {
                identifier: id.to_string(),
            });
        }
        Ok(())
    }
}

// ── Confirmation held at a gate ─────────────────────────────────────

#[derive(Clone, Default)]
pub struct GatedConfirm {
    pub gate: Arc<Gate>,
}

impl Confirm for GatedConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        self.gate.pass().await;
        true
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn cabin(price: f64) -> Listing {
    Listing::new("1", "Cabin", price)
        .with_description("Quiet cabin by the lake")
        .with_category("Lake")
}

pub fn loft() -> Listing {
    Listing::new("2", "Loft", 250.0)
        .with_description("Downtown loft")
        .with_category("Modern")
}

/// Engine over `remote`, refreshed once, with a controller that always confirms.
pub async fn setup(remote: &FakeRemote) -> MutationController<FakeRemote, AutoConfirm> {
    let engine = SyncEngine::new(remote.clone(), EngineConfig::oneshot());
    assert!(engine.refresh_now().await.is_applied());
    MutationController::new(engine, AutoConfirm(true))
}

/// `(id, price)` pairs of the engine's merged view.
pub fn view<R: ListingRemote>(engine: &SyncEngine<R>) -> Vec<(String, f64)> {
    engine
        .snapshot()
        .iter()
        .map(|l| (l.id.to_string(), l.price))
        .collect()
}
