// ── Listing domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ListingId;

/// A rental listing as seen by the client.
///
/// Everything except `id` can change through an edit. `created_at` and
/// `owner_id` are carried through from the server untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub image_src: String,
    pub category: String,
    pub price: f64,
    pub room_count: u32,
    pub bathroom_count: u32,
    pub guest_count: u32,
    pub location_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Listing {
    /// Minimal listing with empty display fields.
    pub fn new(id: impl Into<ListingId>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image_src: String::new(),
            category: String::new(),
            price,
            room_count: 0,
            bathroom_count: 0,
            guest_count: 0,
            location_value: String::new(),
            size: None,
            created_at: None,
            owner_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
