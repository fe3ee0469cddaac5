//! Projection of raw store records into display-ready pin data.

use maskmap_api::StoreRecord;
use maskmap_core::{GeoPoint, StockStatus};

/// A display-ready map pin: the store subset worth rendering plus its
/// resolved status. Timestamps stay raw strings; an external formatter
/// handles locale-aware rendering.
#[derive(Debug, Clone)]
pub struct PinRecord {
    pub name: String,
    pub position: GeoPoint,
    pub status: StockStatus,
    pub stock_at: Option<String>,
    pub created_at: Option<String>,
}

/// Maps raw store records into pins, dropping non-actionable entries.
///
/// `Unknown` (never reported) and `Empty` (zero stock) records are
/// suppressed from the map. Input order is preserved; duplicates are not
/// deduplicated, so overlapping query results yield overlapping pins.
#[must_use]
pub fn project(stores: Vec<StoreRecord>) -> Vec<PinRecord> {
    stores
        .into_iter()
        .filter_map(|store| {
            let status = StockStatus::from_wire(store.remain_stat.as_deref());
            if matches!(status, StockStatus::Unknown | StockStatus::Empty) {
                return None;
            }
            Some(PinRecord {
                name: store.name,
                position: GeoPoint::new(store.lat, store.lng),
                status,
                stock_at: store.stock_at,
                created_at: store.created_at,
            })
        })
        .collect()
}
