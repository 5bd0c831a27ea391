// ── Listing page view state ──
//
// Category filter plus the detail and edit selections. Pure projection
// over engine snapshots; never writes to the engine.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::model::{Listing, ListingId};

/// Filter predicate for the listing set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// `"All"` (any case) or empty means no filter.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Category(raw.to_owned())
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::All => true,
            Self::Category(c) => listing.category == *c,
        }
    }
}

/// Unique categories in order of first appearance.
pub fn categories(listings: &[Arc<Listing>]) -> Vec<String> {
    listings
        .iter()
        .filter(|l| !l.category.is_empty())
        .map(|l| l.category.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Presentation state for the listing page.
///
/// At most one listing is selected for detail and at most one is open for
/// edit. [`reconcile`](Self::reconcile) drops selections whose listing left
/// the visible set.
#[derive(Debug, Clone, Default)]
pub struct ListingView {
    filter: CategoryFilter,
    selected: Option<ListingId>,
    editing: Option<ListingId>,
}

impl ListingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Listings passing the active filter, in snapshot order.
    pub fn visible(&self, snapshot: &[Arc<Listing>]) -> Vec<Arc<Listing>> {
        snapshot
            .iter()
            .filter(|l| self.filter.matches(l))
            .cloned()
            .collect()
    }

    // ── Selection ────────────────────────────────────────────────

    pub fn select(&mut self, id: ListingId) {
        self.selected = Some(id);
    }

    pub fn selected(&self) -> Option<&ListingId> {
        self.selected.as_ref()
    }

    pub fn open_editor(&mut self, id: ListingId) {
        self.editing = Some(id);
    }

    pub fn editing(&self) -> Option<&ListingId> {
        self.editing.as_ref()
    }

    /// Drop selections that no longer point at a visible listing.
    pub fn reconcile(&mut self, snapshot: &[Arc<Listing>]) {
        let visible = self.visible(snapshot);
        let present = |id: &ListingId| visible.iter().any(|l| &l.id == id);

        if self.selected.as_ref().is_some_and(|id| !present(id)) {
            self.selected = None;
        }
        if self.editing.as_ref().is_some_and(|id| !present(id)) {
            self.editing = None;
        }
    }
}
