// lodgely-api: Async Rust client for the Lodgely listing server

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ListingClient;
pub use error::Error;
pub use models::{DeleteListingRequest, ListingRecord, UpdateListingRequest};
pub use transport::{TlsMode, TransportConfig};
