//! The map-session event loop.
//!
//! One cooperative timeline per session reacts to viewport-change events,
//! periodic staleness ticks and fetch completions. The fetch itself runs
//! on a spawned task so the loop stays responsive, but the controller's
//! Refreshing guard keeps at most one outstanding at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use maskmap_api::{FetchError, StoreResponse};
use maskmap_core::ViewportRegion;

use crate::controller::{FetchPlan, RefreshConfig, RefreshController};
use crate::fetcher::StoreFetcher;
use crate::projector::PinRecord;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Inbound events from the map boundary.
#[derive(Debug, Clone, Copy)]
pub enum MapEvent {
    /// The user panned or zoomed; here is the new viewport snapshot.
    ViewportChanged(ViewportRegion),
}

/// The map boundary's handle to a running session: send events in, watch
/// pin-set replacements come out.
///
/// Dropping the event sender ends the session; the loop drains, aborts any
/// in-flight fetch and returns.
pub struct SessionHandle {
    pub events: mpsc::Sender<MapEvent>,
    pub pins: watch::Receiver<Vec<PinRecord>>,
}

/// Owns the refresh controller, the staleness ticker and the single
/// in-flight fetch task for one map session.
pub struct MapSession<F> {
    controller: RefreshController,
    fetcher: Arc<F>,
    config: RefreshConfig,
    events: mpsc::Receiver<MapEvent>,
    pins_tx: watch::Sender<Vec<PinRecord>>,
}

impl<F> MapSession<F>
where
    F: StoreFetcher + 'static,
{
    /// Builds a session around an injected fetcher, returning the session
    /// and the handle the map boundary drives it through.
    #[must_use]
    pub fn new(fetcher: Arc<F>, config: RefreshConfig) -> (Self, SessionHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (pins_tx, pins_rx) = watch::channel(Vec::new());

        let session = Self {
            controller: RefreshController::new(config.staleness_threshold, Instant::now()),
            fetcher,
            config,
            events: events_rx,
            pins_tx,
        };
        let handle = SessionHandle {
            events: events_tx,
            pins: pins_rx,
        };
        (session, handle)
    }

    /// Runs the session until the event channel closes.
    ///
    /// The ticker is reset on every trigger — movement- or time-driven —
    /// so staleness is always measured from the most recent refresh and a
    /// movement refresh is not chased by a near-simultaneous timer one.
    pub async fn run(mut self) {
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.config.tick_period, self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<JoinHandle<(FetchPlan, Result<StoreResponse, FetchError>)>> =
            None;

        loop {
            tokio::select! {
                maybe_event = self.events.recv() => {
                    match maybe_event {
                        Some(MapEvent::ViewportChanged(region)) => {
                            if let Some(plan) = self.controller.on_viewport_change(region) {
                                ticker.reset();
                                in_flight = Some(self.spawn_fetch(plan));
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    if let Some(plan) = self.controller.on_tick(Instant::now()) {
                        ticker.reset();
                        in_flight = Some(self.spawn_fetch(plan));
                    }
                }
                joined = join_next(&mut in_flight) => {
                    in_flight = None;
                    match joined {
                        Ok((plan, outcome)) => {
                            if self.controller.complete(&plan, Instant::now(), outcome) {
                                let _ = self.pins_tx.send(self.controller.pins().to_vec());
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "fetch task failed to join");
                            self.controller.abandon();
                        }
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
        tracing::debug!("map session ended");
    }

    fn spawn_fetch(
        &self,
        plan: FetchPlan,
    ) -> JoinHandle<(FetchPlan, Result<StoreResponse, FetchError>)> {
        let fetcher = Arc::clone(&self.fetcher);
        tokio::spawn(async move {
            // The policy guarantees an API-legal radius, so truncation to
            // whole meters is the only conversion happening here.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let radius_m = plan.fetch_radius_m.round().max(0.0) as u32;
            let result = fetcher.fetch_stores(plan.region.center, radius_m).await;
            (plan, result)
        })
    }
}

/// Resolves the in-flight fetch if there is one, pending forever otherwise
/// so the select arm simply never fires while idle.
async fn join_next(
    in_flight: &mut Option<JoinHandle<(FetchPlan, Result<StoreResponse, FetchError>)>>,
) -> Result<(FetchPlan, Result<StoreResponse, FetchError>), tokio::task::JoinError> {
    match in_flight.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
