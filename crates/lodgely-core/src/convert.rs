// ── API-to-domain type conversions ──
//
// Bridges `lodgely_api` wire records into `lodgely_core::model` types and
// back into the full-record body the edit endpoint expects.

use lodgely_api::{ListingRecord, UpdateListingRequest};

use crate::model::{Listing, ListingId};

impl From<ListingRecord> for Listing {
    fn from(r: ListingRecord) -> Self {
        Self {
            id: ListingId::from(r.id),
            title: r.title,
            description: r.description,
            image_src: r.image_src,
            category: r.category,
            price: r.price,
            room_count: r.room_count,
            bathroom_count: r.bathroom_count,
            guest_count: r.guest_count,
            location_value: r.location_value,
            size: r.size,
            created_at: r.created_at,
            owner_id: r.user_id,
        }
    }
}

impl From<&Listing> for UpdateListingRequest {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id.as_str().to_owned(),
            title: l.title.clone(),
            description: l.description.clone(),
            price: l.price,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_to_listing_keeps_owner() {
        let record: ListingRecord = serde_json::from_value(json!({
            "id": "1",
            "title": "Cabin",
            "price": 100,
            "userId": "u-7",
            "createdAt": "2024-03-01T12:00:00Z"
        }))
        .unwrap();

        let listing = Listing::from(record);
        assert_eq!(listing.id.as_str(), "1");
        assert_eq!(listing.owner_id.as_deref(), Some("u-7"));
        assert!(listing.created_at.is_some());
    }

    #[test]
    fn listing_to_update_request_carries_every_mutable_field() {
        let mut listing = Listing::new("1", "Cabin", 100.0)
            .with_description("By the lake")
            .with_category("Lake");
        listing.room_count = 3;
        listing.size = Some(42.5);

        let req = UpdateListingRequest::from(&listing);
        assert_eq!(req.id, "1");
        assert_eq!(req.description, "By the lake");
        assert_eq!(req.category, "Lake");
        assert_eq!(req.room_count, 3);
        assert_eq!(req.size, Some(42.5));
    }
}
