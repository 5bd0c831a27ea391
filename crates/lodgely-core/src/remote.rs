// ── Remote listing collection seam ──
//
// The sync engine and mutation controller only ever talk to the server
// through `ListingRemote`. The HTTP adapter implements it; tests plug in
// an in-memory fake.

use std::future::Future;

use lodgely_api::{ListingClient, UpdateListingRequest};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Listing, ListingId};

/// Logical calls against the authoritative listing collection.
pub trait ListingRemote: Send + Sync + 'static {
    /// Whether a caller is authorized to mutate.
    fn is_authorized(&self) -> bool;

    /// Fetch the whole collection, in server order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Listing>, CoreError>> + Send;

    /// Replace a listing with the full draft. Returns the server's copy.
    fn update_by_id(
        &self,
        id: &ListingId,
        draft: &Listing,
    ) -> impl Future<Output = Result<Listing, CoreError>> + Send;

    fn delete_by_id(&self, id: &ListingId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ListingRemote for ListingClient {
    fn is_authorized(&self) -> bool {
        ListingClient::is_authorized(self)
    }

    async fn get_all(&self) -> Result<Vec<Listing>, CoreError> {
        let records = self.list_listings().await?;
        debug!(listings = records.len(), "fetched listing collection");
        Ok(records.into_iter().map(Listing::from).collect())
    }

    async fn update_by_id(&self, id: &ListingId, draft: &Listing) -> Result<Listing, CoreError> {
        let mut request = UpdateListingRequest::from(draft);
        id.as_str().clone_into(&mut request.id);

        // Older servers acknowledge without echoing the record back.
        let updated = self.update_listing(&request).await?;
        Ok(updated.map_or_else(|| draft.clone(), Listing::from))
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<(), CoreError> {
        self.delete_listing(id.as_str()).await?;
        Ok(())
    }
}
