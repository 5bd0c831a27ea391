// ── Domain model ──

pub mod listing;
pub mod listing_id;

pub use listing::Listing;
pub use listing_id::{ListingId, MutationId};
