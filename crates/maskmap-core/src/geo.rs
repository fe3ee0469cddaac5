//! Geodesic math for viewport bookkeeping.
//!
//! The refresh trigger compares pan distance against the previously fetched
//! radius, so all it needs is great-circle distance between two WGS84 points.

use crate::GeoPoint;

/// Mean Earth radius in meters (IUGG sphere).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters, via the haversine
/// formula. Accurate to well under a percent at the city scales the refresh
/// trigger cares about.
#[must_use]
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
