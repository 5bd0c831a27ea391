use serde::Serialize;
use strum::Display;

use crate::engine::MutationKind;
use crate::model::ListingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// User-facing result of a mutation, broadcast to presentation subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub listing_id: ListingId,
    pub kind: MutationKind,
    pub message: String,
}

impl Notification {
    pub(crate) fn success(listing_id: ListingId, kind: MutationKind) -> Self {
        let message = match kind {
            MutationKind::Delete => "Listing deleted successfully",
            MutationKind::Edit => "Listing updated successfully",
        };
        Self {
            level: NotificationLevel::Success,
            listing_id,
            kind,
            message: message.to_owned(),
        }
    }

    pub(crate) fn error(listing_id: ListingId, kind: MutationKind, message: String) -> Self {
        Self {
            level: NotificationLevel::Error,
            listing_id,
            kind,
            message,
        }
    }
}
