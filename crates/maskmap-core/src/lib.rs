pub mod app_config;
pub mod config;
pub mod geo;
pub mod status;
pub mod timestamp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use status::{PinColor, StockStatus};

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The map area currently on screen: its center plus the distance from the
/// center to a visible edge. The radius is a proxy for "how much area is on
/// screen", derived by the map boundary from its visible bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRegion {
    pub center: GeoPoint,
    pub visible_radius_m: f64,
}

/// Fallback region center used before any real viewport has been observed.
/// Roughly the geographic center of South Korea.
pub const FALLBACK_CENTER: GeoPoint = GeoPoint {
    lat: 36.378_218,
    lng: 127.834_492,
};

/// Visible radius paired with the fallback region (half of a 4-degree span).
pub const FALLBACK_VISIBLE_RADIUS_M: f64 = 222_000.0;

impl ViewportRegion {
    /// The region a fresh session starts from until the map reports a real
    /// viewport.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            center: FALLBACK_CENTER,
            visible_radius_m: FALLBACK_VISIBLE_RADIUS_M,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
