// ── Listing set and pending-mutation table ──
//
// Pure state behind the engine's lock. `apply_refresh`, `register` and
// `resolve` are the only writers; `merged` is the view subscribers see.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::pending::{MutationKind, MutationStatus, PendingMutation, Resolution};
use crate::error::CoreError;
use crate::model::{Listing, ListingId};

#[derive(Debug, Clone)]
enum Effect {
    Replace(Arc<Listing>),
    Remove,
}

/// A committed mutation, tagged with the epoch it landed in.
///
/// A refresh dispatched before that epoch may carry pre-commit data, so the
/// effect is re-applied on top of it. Refreshes dispatched later already
/// reflect it and retire the entry.
#[derive(Debug, Clone)]
struct CommittedEffect {
    listing_id: ListingId,
    effect: Effect,
    epoch: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SyncState {
    /// Last successful refresh with committed effects applied, server order.
    base: IndexMap<ListingId, Arc<Listing>>,
    pending: HashMap<ListingId, PendingMutation>,
    committed: Vec<CommittedEffect>,
    epoch: u64,
}

impl SyncState {
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replace the base set with a fetched collection dispatched at `dispatched_at`.
    pub(crate) fn apply_refresh(&mut self, fetched: Vec<Listing>, dispatched_at: u64) {
        self.committed.retain(|c| c.epoch > dispatched_at);

        self.base = fetched
            .into_iter()
            .map(|listing| (listing.id.clone(), Arc::new(listing)))
            .collect();

        for committed in &self.committed {
            apply_effect(&mut self.base, &committed.listing_id, &committed.effect);
        }
    }

    pub(crate) fn register(&mut self, mutation: PendingMutation) -> Result<(), CoreError> {
        if self.pending.contains_key(&mutation.listing_id) {
            return Err(CoreError::MutationInFlight {
                identifier: mutation.listing_id.to_string(),
            });
        }
        self.pending.insert(mutation.listing_id.clone(), mutation);
        Ok(())
    }

    /// Remove the pending entry for `listing_id`, making a committed effect
    /// permanent. Returns the resolved entry, or `None` if nothing was pending.
    pub(crate) fn resolve(
        &mut self,
        listing_id: &ListingId,
        resolution: Resolution,
    ) -> Option<PendingMutation> {
        let mut mutation = self.pending.remove(listing_id)?;

        match resolution {
            Resolution::Committed { confirmed } => {
                let effect = match mutation.kind {
                    MutationKind::Delete => Some(Effect::Remove),
                    MutationKind::Edit => confirmed
                        .map(Arc::new)
                        .or_else(|| mutation.proposed.clone())
                        .map(Effect::Replace),
                };
                if let Some(effect) = effect {
                    self.epoch += 1;
                    apply_effect(&mut self.base, listing_id, &effect);
                    self.committed.push(CommittedEffect {
                        listing_id: listing_id.clone(),
                        effect,
                        epoch: self.epoch,
                    });
                }
                mutation.status = MutationStatus::Committed;
            }
            Resolution::Failed { .. } => {
                mutation.status = MutationStatus::Failed;
            }
        }

        Some(mutation)
    }

    /// Base set with pending deletes suppressed and pending edits overlaid.
    pub(crate) fn merged(&self) -> Vec<Arc<Listing>> {
        self.base
            .values()
            .filter_map(|listing| match self.pending.get(&listing.id) {
                None => Some(Arc::clone(listing)),
                Some(p) if p.kind == MutationKind::Delete => None,
                Some(p) => Some(p.proposed.clone().unwrap_or_else(|| Arc::clone(listing))),
            })
            .collect()
    }

    pub(crate) fn pending(&self) -> Vec<PendingMutation> {
        let mut pending: Vec<_> = self.pending.values().cloned().collect();
        pending.sort_by_key(|p| p.registered_at);
        pending
    }
}

fn apply_effect(base: &mut IndexMap<ListingId, Arc<Listing>>, id: &ListingId, effect: &Effect) {
    match effect {
        Effect::Remove => {
            base.shift_remove(id);
        }
        Effect::Replace(listing) => {
            if let Some(slot) = base.get_mut(id) {
                *slot = Arc::clone(listing);
            }
        }
    }
}
