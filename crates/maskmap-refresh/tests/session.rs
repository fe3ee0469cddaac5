//! End-to-end tests for the map-session event loop, driven by an
//! in-memory fetcher and tokio's paused clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;

use maskmap_api::{FetchError, StoreRecord, StoreResponse};
use maskmap_core::{GeoPoint, ViewportRegion};
use maskmap_refresh::{MapEvent, MapSession, RefreshConfig, StoreFetcher};

const CONFIG: RefreshConfig = RefreshConfig {
    tick_period: Duration::from_secs(30),
    staleness_threshold: Duration::from_secs(300),
};

/// Meters of latitude per degree, for building offset test points.
const LAT_M_PER_DEG: f64 = 111_195.0;

fn region(center: GeoPoint, visible_radius_m: f64) -> ViewportRegion {
    ViewportRegion {
        center,
        visible_radius_m,
    }
}

fn north_of(p: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(p.lat + meters / LAT_M_PER_DEG, p.lng)
}

fn response(codes: &[&str]) -> StoreResponse {
    let stores: Vec<StoreRecord> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| StoreRecord {
            name: format!("store-{i}"),
            lat: 37.5,
            lng: 127.0,
            stock_at: None,
            remain_stat: Some((*code).to_owned()),
            created_at: None,
        })
        .collect();
    StoreResponse {
        count: i64::try_from(stores.len()).expect("test sizes fit i64"),
        stores,
    }
}

fn fetch_error() -> FetchError {
    FetchError::InvalidBaseUrl {
        url: "test".to_owned(),
        reason: "simulated failure".to_owned(),
    }
}

/// Scripted fetcher: counts calls, records the radius each was made with,
/// optionally blocks on a gate, and answers from a queued script (repeating
/// the final entry once the script is exhausted).
struct MockFetcher {
    calls: AtomicU32,
    radii: Mutex<Vec<u32>>,
    gate: Option<Arc<Notify>>,
    script: Mutex<VecDeque<Result<StoreResponse, FetchError>>>,
    fallback: StoreResponse,
}

impl MockFetcher {
    fn always(response: StoreResponse) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            radii: Mutex::new(Vec::new()),
            gate: None,
            script: Mutex::new(VecDeque::new()),
            fallback: response,
        })
    }

    fn gated(response: StoreResponse, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            radii: Mutex::new(Vec::new()),
            gate: Some(gate),
            script: Mutex::new(VecDeque::new()),
            fallback: response,
        })
    }

    fn scripted(script: Vec<Result<StoreResponse, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            radii: Mutex::new(Vec::new()),
            gate: None,
            script: Mutex::new(script.into()),
            fallback: StoreResponse::empty(),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn radii(&self) -> Vec<u32> {
        self.radii.lock().expect("radii lock").clone()
    }
}

impl StoreFetcher for MockFetcher {
    async fn fetch_stores(
        &self,
        _center: GeoPoint,
        radius_m: u32,
    ) -> Result<StoreResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.radii.lock().expect("radii lock").push(radius_m);

        let scripted = self.script.lock().expect("script lock").pop_front();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match scripted {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Yield long enough for the session loop to process everything pending.
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn two_viewport_events_before_resolution_cause_one_fetch() {
    let gate = Arc::new(Notify::new());
    let fetcher = MockFetcher::gated(response(&["plenty", "few"]), Arc::clone(&gate));
    let (session, handle) = MapSession::new(Arc::clone(&fetcher), CONFIG);
    let session_task = tokio::spawn(session.run());

    let base = GeoPoint::new(36.5, 127.8);
    handle
        .events
        .send(MapEvent::ViewportChanged(region(base, 1000.0)))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 1);

    // A second movement while the first fetch is outstanding is dropped.
    handle
        .events
        .send(MapEvent::ViewportChanged(region(
            north_of(base, 5000.0),
            1000.0,
        )))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 1);

    gate.notify_one();
    settle().await;

    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(handle.pins.borrow().len(), 2);

    drop(handle);
    session_task.await.expect("session should exit cleanly");
}

#[tokio::test(start_paused = true)]
async fn stale_tick_refreshes_once_at_unchanged_radius() {
    let fetcher = MockFetcher::always(response(&["plenty"]));
    let (session, handle) = MapSession::new(Arc::clone(&fetcher), CONFIG);
    let session_task = tokio::spawn(session.run());

    // Settle the session at a viewport whose first report triggers the
    // initial movement refresh.
    let base = GeoPoint::new(36.5, 127.8);
    handle
        .events
        .send(MapEvent::ViewportChanged(region(base, 600.0)))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 1);
    // Movement refreshes grow the radius via the policy: 600 doubles.
    assert_eq!(fetcher.radii(), vec![1200]);

    // No movement: nothing happens until the staleness threshold passes.
    sleep(Duration::from_secs(299)).await;
    assert_eq!(fetcher.call_count(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(fetcher.call_count(), 2);
    // Timer refreshes use the viewport radius un-grown.
    assert_eq!(fetcher.radii(), vec![1200, 600]);

    // The timer restarts from the refresh, not from the old schedule.
    sleep(Duration::from_secs(200)).await;
    assert_eq!(fetcher.call_count(), 2);

    drop(handle);
    session_task.await.expect("session should exit cleanly");
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_keeps_pins_and_allows_retry() {
    let fetcher = MockFetcher::scripted(vec![
        Ok(response(&["plenty", "some"])),
        Err(fetch_error()),
        Ok(response(&["few"])),
    ]);
    let (session, mut handle) = MapSession::new(Arc::clone(&fetcher), CONFIG);
    let session_task = tokio::spawn(session.run());

    let base = GeoPoint::new(36.5, 127.8);
    handle
        .events
        .send(MapEvent::ViewportChanged(region(base, 1000.0)))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(handle.pins.borrow_and_update().len(), 2);

    // This fetch fails: the displayed pins and the refresh bookkeeping are
    // untouched.
    let far = region(north_of(base, 10_000.0), 1000.0);
    handle
        .events
        .send(MapEvent::ViewportChanged(far))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 2);
    assert!(!handle.pins.has_changed().expect("watch should be open"));
    assert_eq!(handle.pins.borrow().len(), 2);

    // Because state never advanced, re-reporting the same viewport retries
    // naturally and the success replaces the pin set.
    handle
        .events
        .send(MapEvent::ViewportChanged(far))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 3);
    assert_eq!(handle.pins.borrow().len(), 1);

    drop(handle);
    session_task.await.expect("session should exit cleanly");
}

#[tokio::test(start_paused = true)]
async fn in_coverage_movement_causes_no_fetch() {
    let fetcher = MockFetcher::always(response(&["plenty"]));
    let (session, handle) = MapSession::new(Arc::clone(&fetcher), CONFIG);
    let session_task = tokio::spawn(session.run());

    let base = GeoPoint::new(36.5, 127.8);
    handle
        .events
        .send(MapEvent::ViewportChanged(region(base, 1000.0)))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 1);

    // 500 m of travel with a 500 m viewport stays inside the 2000 m fetch.
    handle
        .events
        .send(MapEvent::ViewportChanged(region(
            north_of(base, 500.0),
            500.0,
        )))
        .await
        .expect("session should be running");
    settle().await;
    assert_eq!(fetcher.call_count(), 1);

    drop(handle);
    session_task.await.expect("session should exit cleanly");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_ends_the_session() {
    let fetcher = MockFetcher::always(StoreResponse::empty());
    let (session, handle) = MapSession::new(fetcher, CONFIG);
    let session_task = tokio::spawn(session.run());

    drop(handle);

    tokio::time::timeout(Duration::from_secs(1), session_task)
        .await
        .expect("session should end promptly")
        .expect("session should exit cleanly");
}
