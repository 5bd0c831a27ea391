use std::future::Future;

use crate::model::ListingId;

/// What the user is asked before a destructive mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub listing_id: ListingId,
    /// Title of the listing, when it is visible.
    pub title: Option<String>,
    pub message: String,
}

impl ConfirmPrompt {
    pub(crate) fn delete(listing_id: ListingId, title: Option<String>) -> Self {
        let message = match &title {
            Some(t) => format!("Delete listing \"{t}\" ({listing_id})?"),
            None => format!("Delete listing {listing_id}?"),
        };
        Self {
            listing_id,
            title,
            message,
        }
    }
}

/// Confirmation step: an async suspension point returning the user's answer.
///
/// The controller does not proceed past `AwaitingConfirmation` until this
/// resolves, and only `true` proceeds.
pub trait Confirm: Send + Sync + 'static {
    fn confirm(&self, prompt: &ConfirmPrompt) -> impl Future<Output = bool> + Send;
}

/// Answers every prompt the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        self.0
    }
}
