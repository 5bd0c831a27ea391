// Wire types for the listing endpoints.
//
// Field names follow the server's camelCase JSON. Every field except
// `id` tolerates absence so a partially populated record still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// A listing as returned by `GET /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(default)]
    pub room_count: u32,
    #[serde(default)]
    pub bathroom_count: u32,
    #[serde(default)]
    pub guest_count: u32,
    #[serde(default)]
    pub location_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of `PUT /api/edit`: the full draft record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_src: String,
    pub category: String,
    pub room_count: u32,
    pub bathroom_count: u32,
    pub guest_count: u32,
    pub location_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl UpdateListingRequest {
    /// Enforce the server's required fields before dispatch.
    pub fn validate(&self) -> Result<(), Error> {
        require_id(&self.id)?;
        if self.title.trim().is_empty() {
            return Err(Error::Validation {
                field: "title",
                reason: "title is required".into(),
            });
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation {
                field: "description",
                reason: "description is required".into(),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::Validation {
                field: "price",
                reason: format!("price must be a non-negative number, got {}", self.price),
            });
        }
        Ok(())
    }
}

/// Body of `DELETE /api/delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteListingRequest {
    pub id: String,
}

impl DeleteListingRequest {
    pub fn validate(&self) -> Result<(), Error> {
        require_id(&self.id)
    }
}

/// Response of `PUT /api/edit`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateListingResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_listing: Option<ListingRecord>,
}

/// Response of `DELETE /api/delete`.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

fn require_id(id: &str) -> Result<(), Error> {
    if id.trim().is_empty() {
        return Err(Error::Validation {
            field: "id",
            reason: "ID is required".into(),
        });
    }
    Ok(())
}

/// Accept a price sent either as a JSON number or a numeric string.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("price is not a number: {s:?}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> UpdateListingRequest {
        UpdateListingRequest {
            id: "1".into(),
            title: "Cabin".into(),
            description: "Quiet cabin by the lake".into(),
            price: 100.0,
            image_src: String::new(),
            category: "Lake".into(),
            room_count: 2,
            bathroom_count: 1,
            guest_count: 4,
            location_value: "ID".into(),
            size: None,
        }
    }

    #[test]
    fn record_decodes_camel_case() {
        let record: ListingRecord = serde_json::from_value(json!({
            "id": "abc",
            "title": "Cabin",
            "imageSrc": "https://res.cloudinary.com/x.jpg",
            "roomCount": 3,
            "bathroomCount": 2,
            "guestCount": 6,
            "locationValue": "ID",
            "price": 100
        }))
        .unwrap();

        assert_eq!(record.id, "abc");
        assert_eq!(record.image_src, "https://res.cloudinary.com/x.jpg");
        assert_eq!(record.room_count, 3);
        assert_eq!(record.guest_count, 6);
        assert!(record.created_at.is_none());
    }

    #[test]
    fn record_accepts_price_as_text() {
        let record: ListingRecord =
            serde_json::from_value(json!({ "id": "abc", "price": " 150 " })).unwrap();
        assert!((record.price - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn record_rejects_non_numeric_price_text() {
        let result = serde_json::from_value::<ListingRecord>(json!({ "id": "abc", "price": "cheap" }));
        assert!(result.is_err());
    }

    #[test]
    fn update_request_serializes_camel_case() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(value["imageSrc"], "");
        assert_eq!(value["roomCount"], 2);
        assert!(value.get("size").is_none());
    }

    #[test]
    fn validate_accepts_complete_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut req = request();
        req.title = "  ".into();
        assert!(matches!(req.validate(), Err(Error::Validation { field: "title", .. })));

        let mut req = request();
        req.description = String::new();
        assert!(matches!(
            req.validate(),
            Err(Error::Validation { field: "description", .. })
        ));

        let mut req = request();
        req.price = f64::NAN;
        assert!(matches!(req.validate(), Err(Error::Validation { field: "price", .. })));

        let mut req = request();
        req.id = String::new();
        assert!(matches!(req.validate(), Err(Error::Validation { field: "id", .. })));
    }

    #[test]
    fn delete_request_requires_id() {
        let req = DeleteListingRequest { id: String::new() };
        assert!(req.validate().is_err());
    }
}
