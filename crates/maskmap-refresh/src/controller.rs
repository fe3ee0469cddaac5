//! The adaptive region-refresh state machine.
//!
//! Decides when a viewport change or timer tick warrants re-fetching store
//! data, and applies completed fetches to the displayed pin set. The
//! machine is deliberately synchronous — triggers come in as method calls
//! and fetch plans come out as values — so the async plumbing lives
//! entirely in [`crate::session`] and the decision logic unit-tests
//! without a runtime.

use std::time::Duration;

use tokio::time::Instant;

use maskmap_api::{FetchError, StoreResponse};
use maskmap_core::{geo, AppConfig, ViewportRegion};

use crate::policy;
use crate::projector::{self, PinRecord};

/// Timing knobs for a map session.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// How often the staleness check runs.
    pub tick_period: Duration,
    /// Age at which displayed data is re-fetched even without movement.
    pub staleness_threshold: Duration,
}

impl RefreshConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            tick_period: Duration::from_secs(config.tick_secs),
            staleness_threshold: Duration::from_secs(config.staleness_secs),
        }
    }
}

/// Bookkeeping for the most recent successful refresh.
///
/// Mutated only by [`RefreshController::complete`], exactly once per
/// completed refresh, and never rolled back on failure — stale state
/// persists and the next eligible trigger retries naturally.
#[derive(Debug, Clone, Copy)]
pub struct RefreshState {
    pub last_region: ViewportRegion,
    pub last_fetch_radius_m: f64,
    pub last_refresh_at: Instant,
}

impl RefreshState {
    /// Bookkeeping radius paired with the fallback region at session start.
    /// Deliberately small so the first real viewport report triggers a
    /// fetch.
    pub const INITIAL_FETCH_RADIUS_M: f64 = 1000.0;

    fn initial(now: Instant) -> Self {
        Self {
            last_region: ViewportRegion::fallback(),
            last_fetch_radius_m: Self::INITIAL_FETCH_RADIUS_M,
            last_refresh_at: now,
        }
    }
}

/// A fetch the controller has decided to run: the viewport snapshot it was
/// planned for and the policy-chosen radius to query at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchPlan {
    pub region: ViewportRegion,
    pub fetch_radius_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Refreshing,
}

/// Owns refresh state and the current pin set.
///
/// At most one fetch is outstanding at a time: triggers arriving while a
/// plan is in flight are dropped, not queued. Latest-viewport-wins is NOT
/// guaranteed — an in-flight fetch still applies even if the viewport has
/// moved again — which is acceptable because the next tick or movement
/// corrects it.
pub struct RefreshController {
    staleness_threshold: Duration,
    state: RefreshState,
    phase: Phase,
    pins: Vec<PinRecord>,
    /// Latest viewport reported by the map, used for timer-triggered
    /// refreshes.
    current_region: ViewportRegion,
}

impl RefreshController {
    #[must_use]
    pub fn new(staleness_threshold: Duration, now: Instant) -> Self {
        Self {
            staleness_threshold,
            state: RefreshState::initial(now),
            phase: Phase::Idle,
            pins: Vec::new(),
            current_region: ViewportRegion::fallback(),
        }
    }

    /// The currently displayed pin set.
    #[must_use]
    pub fn pins(&self) -> &[PinRecord] {
        &self.pins
    }

    #[must_use]
    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.phase == Phase::Refreshing
    }

    /// Handles a viewport-change event from the map.
    ///
    /// Fires a refresh only when the pan distance plus the new visible
    /// radius exceed the previously fetched radius — i.e. when the last
    /// fetch no longer covers what is on screen. The fetch radius is grown
    /// by the radius policy to over-cover the viewport.
    pub fn on_viewport_change(&mut self, region: ViewportRegion) -> Option<FetchPlan> {
        self.current_region = region;
        if self.phase == Phase::Refreshing {
            tracing::debug!("viewport change ignored, refresh already in flight");
            return None;
        }

        let distance = geo::distance_m(region.center, self.state.last_region.center);
        if distance + region.visible_radius_m <= self.state.last_fetch_radius_m {
            return None;
        }

        tracing::debug!(
            distance_m = distance,
            visible_radius_m = region.visible_radius_m,
            last_fetch_radius_m = self.state.last_fetch_radius_m,
            "viewport left fetched coverage, refreshing"
        );
        Some(self.begin(FetchPlan {
            region,
            fetch_radius_m: policy::next_radius(region.visible_radius_m),
        }))
    }

    /// Handles a periodic timer tick.
    ///
    /// Fires a refresh once the displayed data is older than the staleness
    /// threshold, using the current viewport radius un-grown — this forces
    /// periodic freshness without widening the query. The radius is still
    /// clamped to the API's query cap: a viewport wider than the cap would
    /// otherwise issue a query the service answers with garbage, and the
    /// garbage would replace last-known-good pins.
    pub fn on_tick(&mut self, now: Instant) -> Option<FetchPlan> {
        if self.phase == Phase::Refreshing {
            return None;
        }

        let age = now.duration_since(self.state.last_refresh_at);
        if age < self.staleness_threshold {
            return None;
        }

        tracing::debug!(age_secs = age.as_secs(), "displayed data stale, refreshing");
        let region = self.current_region;
        Some(self.begin(FetchPlan {
            region,
            fetch_radius_m: region.visible_radius_m.min(policy::MAX_FETCH_RADIUS_M),
        }))
    }

    /// Applies the outcome of a fetch started by one of the trigger
    /// methods, returning `true` if the pin set was replaced.
    ///
    /// On success the entire pin set is swapped for the projected records
    /// and the refresh bookkeeping moves to the plan's region, radius and
    /// `now`. On failure nothing changes beyond logging — last-known-good
    /// pins stay displayed and the next eligible trigger retries.
    pub fn complete(
        &mut self,
        plan: &FetchPlan,
        now: Instant,
        result: Result<StoreResponse, FetchError>,
    ) -> bool {
        self.phase = Phase::Idle;
        match result {
            Ok(response) => {
                self.pins = projector::project(response.stores);
                self.state = RefreshState {
                    last_region: plan.region,
                    last_fetch_radius_m: plan.fetch_radius_m,
                    last_refresh_at: now,
                };
                tracing::debug!(
                    count = response.count,
                    pins = self.pins.len(),
                    "refresh applied"
                );
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "store refresh failed, keeping previous pins");
                false
            }
        }
    }

    /// Abandons an in-flight refresh without applying anything, e.g. when
    /// the fetch task was torn down. State is untouched, as with a failed
    /// fetch.
    pub fn abandon(&mut self) {
        self.phase = Phase::Idle;
    }

    fn begin(&mut self, plan: FetchPlan) -> FetchPlan {
        self.phase = Phase::Refreshing;
        plan
    }
}
