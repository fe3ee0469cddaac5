//! Store-status API response types.
//!
//! These model the JSON returned by the `storesByGeo` endpoint verbatim.
//! Records are immutable once received; status resolution and filtering
//! happen downstream in the projection layer.

use serde::{Deserialize, Serialize};

/// Response envelope for a geo-radius store query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResponse {
    /// Total number of stores in the result.
    pub count: i64,
    pub stores: Vec<StoreRecord>,
}

impl StoreResponse {
    /// The zero-result success used when a query is short-circuited.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            stores: Vec::new(),
        }
    }
}

/// A single reporting station as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// When the reported stock level was last updated, in the wire
    /// timestamp format. Null when the station has never reported.
    #[serde(default)]
    pub stock_at: Option<String>,
    /// Raw stock-status code. Null when the station has never reported.
    #[serde(default)]
    pub remain_stat: Option<String>,
    /// When the record itself was generated, in the wire timestamp format.
    #[serde(default)]
    pub created_at: Option<String>,
}
