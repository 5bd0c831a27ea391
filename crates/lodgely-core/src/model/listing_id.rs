// ── Identity types ──
//
// ListingId keys the listing set and the pending-mutation table.
// MutationId tags a single optimistic mutation for log correlation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── ListingId ───────────────────────────────────────────────────────

/// Server-assigned listing identifier. Stable and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank identifiers are never valid targets for a mutation.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ListingId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for ListingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── MutationId ──────────────────────────────────────────────────────

/// Unique tag for one registered optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(Uuid);

impl MutationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn listing_id_display_and_parse() {
        let id: ListingId = "65f1c0ffee".parse().unwrap();
        assert_eq!(id.to_string(), "65f1c0ffee");
        assert_eq!(id.as_str(), "65f1c0ffee");
    }

    #[test]
    fn listing_id_blank_detection() {
        assert!(ListingId::from("").is_blank());
        assert!(ListingId::from("  ").is_blank());
        assert!(!ListingId::from("1").is_blank());
    }

    #[test]
    fn listing_id_serializes_transparently() {
        let json = serde_json::to_string(&ListingId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn mutation_ids_are_unique() {
        assert_ne!(MutationId::new(), MutationId::new());
    }
}
