// ── Pending mutation table entries ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::model::{Listing, ListingId, MutationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    Pending,
    Committed,
    Failed,
}

/// An optimistic mutation tracked by the sync engine until its remote
/// call returns.
///
/// While `pending`, a delete hides its listing from the merged view and an
/// edit shows `proposed` in place of the server's value.
#[derive(Debug, Clone, Serialize)]
pub struct PendingMutation {
    pub id: MutationId,
    pub listing_id: ListingId,
    pub kind: MutationKind,
    /// Draft value for edits; `None` for deletes.
    pub proposed: Option<Arc<Listing>>,
    pub status: MutationStatus,
    pub registered_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn delete(listing_id: ListingId) -> Self {
        Self {
            id: MutationId::new(),
            listing_id,
            kind: MutationKind::Delete,
            proposed: None,
            status: MutationStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    pub fn edit(draft: Listing) -> Self {
        Self {
            id: MutationId::new(),
            listing_id: draft.id.clone(),
            kind: MutationKind::Edit,
            proposed: Some(Arc::new(draft)),
            status: MutationStatus::Pending,
            registered_at: Utc::now(),
        }
    }
}

/// How a pending mutation's remote call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The server accepted the mutation. `confirmed` is the server's copy
    /// of an edited listing, when it sent one back.
    Committed { confirmed: Option<Listing> },
    Failed { reason: String },
}
