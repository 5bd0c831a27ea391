// ── Edit sessions ──
//
// A draft copy of one listing. Draft changes are local until `save`; the
// sync engine never sees them before validation passes.

use std::sync::Arc;

use serde::Serialize;

use super::phase::MutationPhase;
use crate::error::CoreError;
use crate::model::{Listing, ListingId};

/// Editable form of a listing. `price` is kept as entered so that
/// non-numeric input is caught by validation rather than at the keyboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_src: String,
    pub category: String,
    pub room_count: u32,
    pub bathroom_count: u32,
    pub guest_count: u32,
    pub location_value: String,
    pub size: Option<f64>,
}

impl From<&Listing> for ListingDraft {
    fn from(l: &Listing) -> Self {
        Self {
            title: l.title.clone(),
            description: l.description.clone(),
            price: l.price.to_string(),
            image_src: l.image_src.clone(),
            category: l.category.clone(),
            room_count: l.room_count,
            bathroom_count: l.bathroom_count,
            guest_count: l.guest_count,
            location_value: l.location_value.clone(),
            size: l.size,
        }
    }
}

impl ListingDraft {
    /// Validate the draft and build the full record to send.
    ///
    /// Fields the draft does not carry (`created_at`, `owner_id`) come
    /// from `original`.
    pub fn validate(&self, original: &Listing) -> Result<Listing, CoreError> {
        if original.id.is_blank() {
            return Err(CoreError::validation("id", "ID is required"));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title", "title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("description", "description is required"));
        }
        let price = parse_price(&self.price)?;

        Ok(Listing {
            id: original.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image_src: self.image_src.clone(),
            category: self.category.clone(),
            price,
            room_count: self.room_count,
            bathroom_count: self.bathroom_count,
            guest_count: self.guest_count,
            location_value: self.location_value.clone(),
            size: self.size,
            created_at: original.created_at,
            owner_id: original.owner_id.clone(),
        })
    }
}

fn parse_price(raw: &str) -> Result<f64, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::validation("price", "price is required"));
    }
    let price: f64 = raw
        .parse()
        .map_err(|_| CoreError::validation("price", format!("{raw:?} is not a number")))?;
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::validation(
            "price",
            "price must be a non-negative number",
        ));
    }
    Ok(price)
}

/// An in-progress edit of one listing.
///
/// Created by [`MutationController::begin_edit`](super::MutationController::begin_edit)
/// in the `Editing` phase.
#[derive(Debug)]
pub struct EditSession {
    original: Arc<Listing>,
    draft: ListingDraft,
    pub(super) phase: MutationPhase,
    pub(super) last_error: Option<CoreError>,
}

impl EditSession {
    pub(crate) fn new(original: Arc<Listing>) -> Self {
        let draft = ListingDraft::from(original.as_ref());
        Self {
            original,
            draft,
            phase: MutationPhase::Editing,
            last_error: None,
        }
    }

    pub fn listing_id(&self) -> &ListingId {
        &self.original.id
    }

    /// The listing as it was when the session began.
    pub fn original(&self) -> &Listing {
        &self.original
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Error from the last failed save, if any.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    /// Whether `save` may re-enter `Applying` from `Failed`.
    pub fn can_retry(&self) -> bool {
        self.phase == MutationPhase::Failed
            && self.last_error.as_ref().is_some_and(CoreError::is_retryable)
    }

    /// Change the draft. A failed session goes back to `Editing`.
    pub fn edit(&mut self, f: impl FnOnce(&mut ListingDraft)) -> Result<(), CoreError> {
        if self.phase != MutationPhase::Editing {
            self.phase = self.phase.advance(MutationPhase::Editing)?;
            self.last_error = None;
        }
        f(&mut self.draft);
        Ok(())
    }

    /// Discard the draft. Nothing reaches the engine.
    pub fn cancel(self) -> MutationPhase {
        self.phase
            .advance(MutationPhase::Idle)
            .unwrap_or(self.phase)
    }

    pub(super) fn validated(&self) -> Result<Listing, CoreError> {
        self.draft.validate(&self.original)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> EditSession {
        let listing = Listing::new("1", "Cabin", 100.0).with_description("Lakeside");
        EditSession::new(Arc::new(listing))
    }

    #[test]
    fn draft_starts_from_listing() {
        let s = session();
        assert_eq!(s.phase(), MutationPhase::Editing);
        assert_eq!(s.draft().title, "Cabin");
        assert_eq!(s.draft().price, "100");
    }

    #[test]
    fn edits_stay_local_until_validated() {
        let mut s = session();
        s.edit(|d| d.price = "150".into()).unwrap();
        assert!((s.original().price - 100.0).abs() < f64::EPSILON);

        let built = s.validated().unwrap();
        assert!((built.price - 150.0).abs() < f64::EPSILON);
        assert_eq!(built.id.as_str(), "1");
    }

    #[test]
    fn validation_is_field_level() {
        let mut s = session();
        s.edit(|d| d.title = " ".into()).unwrap();
        assert!(matches!(
            s.validated(),
            Err(CoreError::Validation { ref field, .. }) if field == "title"
        ));

        let mut s = session();
        s.edit(|d| d.description.clear()).unwrap();
        assert!(matches!(
            s.validated(),
            Err(CoreError::Validation { ref field, .. }) if field == "description"
        ));

        for bad in ["", "abc", "-5", "NaN", "inf"] {
            let mut s = session();
            s.edit(|d| d.price = bad.into()).unwrap();
            assert!(
                matches!(s.validated(), Err(CoreError::Validation { ref field, .. }) if field == "price"),
                "price {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn editing_a_failed_session_returns_to_editing() {
        let mut s = session();
        s.phase = MutationPhase::Failed;
        s.last_error = Some(CoreError::TransientFailure {
            message: "timeout".into(),
        });
        assert!(s.can_retry());

        s.edit(|d| d.title = "Cabin II".into()).unwrap();
        assert_eq!(s.phase(), MutationPhase::Editing);
        assert!(s.last_error().is_none());
    }

    #[test]
    fn committed_session_cannot_be_edited() {
        let mut s = session();
        s.phase = MutationPhase::Committed;
        assert!(s.edit(|d| d.title = "x".into()).is_err());
    }

    #[test]
    fn cancel_returns_to_idle() {
        assert_eq!(session().cancel(), MutationPhase::Idle);
    }
}
