//! Fetch-radius policy.
//!
//! Quantizes the viewport radius into coarse bands so small viewport jitter
//! does not cause radius churn: zooming far out jumps straight to the
//! maximum radius the API will answer, zooming far in jumps to a sane
//! minimum, and anything between doubles to over-cover the viewport.

/// Largest fetch radius, matching the API's 5 km query cap.
pub const MAX_FETCH_RADIUS_M: f64 = 5000.0;

/// Smallest fetch radius worth re-querying at.
pub const MIN_FETCH_RADIUS_M: f64 = 800.0;

/// Viewport radius above which the policy snaps to [`MAX_FETCH_RADIUS_M`].
const WIDE_VIEWPORT_M: f64 = 2500.0;

/// Viewport radius below which the policy snaps to [`MIN_FETCH_RADIUS_M`].
const NARROW_VIEWPORT_M: f64 = 400.0;

/// Maps the current viewport radius to the radius the next fetch should
/// use. Pure, no side effects.
#[must_use]
pub fn next_radius(current_m: f64) -> f64 {
    if current_m > WIDE_VIEWPORT_M {
        MAX_FETCH_RADIUS_M
    } else if current_m < NARROW_VIEWPORT_M {
        MIN_FETCH_RADIUS_M
    } else {
        current_m * 2.0
    }
}
