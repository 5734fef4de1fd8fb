use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_core::{
    AnimationState, CoreResult, Environment, Ping, PingSource, SnapshotFeed, Trail, VesselId,
    VesselSnapshot, error::UnexpectedSnafu,
};
use tracker::{
    engine::EngineConfig,
    ping_cache::PingCacheConfig,
    settings::Settings,
    smoother::SmootherConfig,
    startup::{App, TrackerHandle},
    trail::TrailConfig,
};

pub struct TestHelper {
    pub feed: Arc<TestFeed>,
    pub ping_source: Arc<TestPingSource>,
    pub handle: TrackerHandle,
    app_task: tokio::task::JoinHandle<tracker::Result<()>>,
}

impl TestHelper {
    pub async fn shutdown(self) {
        self.handle.shutdown();
        self.app_task.await.unwrap().unwrap();
    }
}

pub async fn spawn_app() -> TestHelper {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let feed = TestFeed::new();
    let ping_source = TestPingSource::new();

    let settings = Settings {
        environment: Environment::Test,
        feed_poll_interval: Duration::from_millis(20),
        feed_buffer_size: 32,
    };

    let (app, handle) = App::build_with_config(
        &settings,
        fast_config(),
        feed.clone(),
        ping_source.clone(),
    );
    let app_task = tokio::spawn(app.run());

    TestHelper {
        feed,
        ping_source,
        handle,
        app_task,
    }
}

/// Engine config with test-friendly cadences. The incremental fetch is kept
/// slow on purpose so tests exercising refresh paths are not raced by it.
fn fast_config() -> EngineConfig {
    EngineConfig {
        smoother: SmootherConfig {
            tick_interval: Duration::from_millis(25),
            ..SmootherConfig::default()
        },
        cache: PingCacheConfig {
            fetch_interval: Duration::from_secs(10),
            watchdog_interval: Duration::from_millis(50),
            reconnect_debounce: Duration::from_millis(30),
            ..PingCacheConfig::default()
        },
        trail: TrailConfig::default(),
        projection_horizon: Duration::from_secs(15),
    }
}

pub async fn await_position<F>(handle: &TrackerHandle, mut predicate: F) -> AnimationState
where
    F: FnMut(&AnimationState) -> bool,
{
    let mut rx = handle.positions();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let found = rx.borrow().iter().find(|s| predicate(s)).cloned();
            if let Some(state) = found {
                return state;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("position did not appear in time")
}

pub async fn await_trail(handle: &TrackerHandle, vessel_id: VesselId) -> Trail {
    let mut rx = handle.trails();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let found = rx.borrow().get(&vessel_id).cloned();
            if let Some(trail) = found {
                return trail;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("trail did not appear in time")
}

pub struct TestFeed {
    batches: Mutex<VecDeque<Vec<VesselSnapshot>>>,
}

impl TestFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(VecDeque::new()),
        })
    }

    pub fn push(&self, batch: Vec<VesselSnapshot>) {
        self.batches.lock().unwrap().push_back(batch);
    }
}

#[async_trait]
impl SnapshotFeed for TestFeed {
    async fn snapshots(&self) -> CoreResult<Vec<VesselSnapshot>> {
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub struct TestPingSource {
    pings: Mutex<Vec<Ping>>,
    fail_next: AtomicBool,
}

impl TestPingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pings: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        })
    }

    pub fn seed(&self, mut pings: Vec<Ping>) {
        self.pings.lock().unwrap().append(&mut pings);
    }

    pub fn fail_next_fetch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PingSource for TestPingSource {
    async fn pings_since(&self, since: DateTime<Utc>) -> CoreResult<Vec<Ping>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return UnexpectedSnafu {
                error: "ping source offline",
            }
            .fail();
        }

        let mut pings: Vec<Ping> = self
            .pings
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.timestamp > since)
            .cloned()
            .collect();
        pings.sort_by_key(|p| p.timestamp);

        Ok(pings)
    }
}
