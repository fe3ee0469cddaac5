//! HTTP client for the mask-store geo query API.
//!
//! Wraps `reqwest` with typed response deserialization and the service's
//! geographic constraints. The API only covers latitude [33.0, 43.0] and
//! longitude [124.0, 132.0]; a query centered outside those bounds is
//! short-circuited to an empty result without touching the network.

use std::time::Duration;

use reqwest::{Client, Url};

use maskmap_core::GeoPoint;

use crate::error::FetchError;
use crate::types::StoreResponse;

const DEFAULT_BASE_URL: &str = "https://8oi9s0nnth.apigw.ntruss.com";
const STORES_BY_GEO_PATH: &str = "corona19-masks/v1/storesByGeo/json";

/// Southernmost latitude the API accepts.
pub const MIN_LAT: f64 = 33.0;
/// Northernmost latitude the API accepts.
pub const MAX_LAT: f64 = 43.0;
/// Westernmost longitude the API accepts.
pub const MIN_LNG: f64 = 124.0;
/// Easternmost longitude the API accepts.
pub const MAX_LNG: f64 = 132.0;

/// Largest radius the API will answer, in meters. The caller's radius
/// policy is responsible for staying at or under this cap; the service
/// does not reject larger values, it just returns garbage.
pub const MAX_QUERY_RADIUS_M: u32 = 5000;

/// Client for the store-status query API.
///
/// Manages the HTTP client and base URL. Use [`StoreClient::new`] for
/// production or [`StoreClient::with_base_url`] to point at a mock server
/// in tests.
pub struct StoreClient {
    client: Client,
    endpoint: Url,
}

impl StoreClient {
    /// Creates a new client pointed at the production reporting API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with
    /// wiremock, or a relocated API host).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("maskmap/0.1 (stock-map)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends the endpoint path instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(STORES_BY_GEO_PATH))
            .map_err(|e| FetchError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, endpoint })
    }

    /// Whether `center` lies inside the latitude/longitude window the API
    /// serves.
    #[must_use]
    pub fn in_bounds(center: GeoPoint) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&center.lat) && (MIN_LNG..=MAX_LNG).contains(&center.lng)
    }

    /// Fetches all stores within `radius_m` meters of `center`.
    ///
    /// An out-of-bounds center returns `{count: 0, stores: []}` without a
    /// network call — not an error, just a region the service has no data
    /// for. No retry is attempted here; the caller's periodic re-evaluation
    /// is the retry policy.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on network failure or a non-2xx status.
    /// - [`FetchError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch_stores(
        &self,
        center: GeoPoint,
        radius_m: u32,
    ) -> Result<StoreResponse, FetchError> {
        if !Self::in_bounds(center) {
            tracing::debug!(
                lat = center.lat,
                lng = center.lng,
                "query center outside accepted bounds, returning empty result"
            );
            return Ok(StoreResponse::empty());
        }

        let url = self.build_url(center, radius_m);
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let parsed: StoreResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        tracing::debug!(
            count = parsed.count,
            radius_m,
            "geo query returned store records"
        );
        Ok(parsed)
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters.
    fn build_url(&self, center: GeoPoint, radius_m: u32) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("lat", &center.lat.to_string());
            pairs.append_pair("lng", &center.lng.to_string());
            pairs.append_pair("m", &radius_m.to_string());
        }
        url
    }
}
