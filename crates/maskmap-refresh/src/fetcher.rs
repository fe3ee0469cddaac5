//! The seam between the refresh machinery and the HTTP client.

use std::future::Future;

use maskmap_api::{FetchError, StoreClient, StoreResponse};
use maskmap_core::GeoPoint;

/// A source of geo-radius store queries.
///
/// Implemented by [`StoreClient`] for production and by in-memory mocks in
/// tests, so the controller and session never depend on a live network.
pub trait StoreFetcher: Send + Sync {
    /// Fetches all stores within `radius_m` meters of `center`.
    fn fetch_stores(
        &self,
        center: GeoPoint,
        radius_m: u32,
    ) -> impl Future<Output = Result<StoreResponse, FetchError>> + Send;
}

impl StoreFetcher for StoreClient {
    async fn fetch_stores(
        &self,
        center: GeoPoint,
        radius_m: u32,
    ) -> Result<StoreResponse, FetchError> {
        StoreClient::fetch_stores(self, center, radius_m).await
    }
}
