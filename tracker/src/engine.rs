use std::{collections::HashMap, sync::Arc, time::Duration};

use async_channel::Receiver;
use chrono::Utc;
use ferry_core::{AnimationState, CoreResult, Ping, PingSource, Trail, VesselId, VesselSnapshot};
use tokio::{
    sync::watch,
    task::{JoinError, JoinHandle},
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, warn};

use crate::{
    dedup::dedup_snapshots,
    ping_cache::{PingCache, PingCacheConfig},
    projection::{PROJECTION_HORIZON, project},
    smoother::{Smoother, SmootherConfig},
    trail::{TrailConfig, build_trail},
};

#[derive(Debug, Clone, Copy)]
enum FetchKind {
    Refresh,
    Incremental,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub smoother: SmootherConfig,
    pub cache: PingCacheConfig,
    pub trail: TrailConfig,
    pub projection_horizon: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoother: SmootherConfig::default(),
            cache: PingCacheConfig::default(),
            trail: TrailConfig::default(),
            projection_horizon: PROJECTION_HORIZON,
        }
    }
}

/// Owns every piece of mutable tracking state: the smoother with its
/// animation states and the ping cache. All updates happen on one task,
/// driven to completion tick by tick, so none of it needs locking.
pub struct VesselTrackingContext {
    config: EngineConfig,
    smoother: Smoother,
    cache: PingCache,
    ping_source: Arc<dyn PingSource>,
    positions_tx: watch::Sender<Vec<AnimationState>>,
    trails_tx: watch::Sender<HashMap<VesselId, Trail>>,
}

impl VesselTrackingContext {
    pub fn new(
        config: EngineConfig,
        ping_source: Arc<dyn PingSource>,
        positions_tx: watch::Sender<Vec<AnimationState>>,
        trails_tx: watch::Sender<HashMap<VesselId, Trail>>,
    ) -> Self {
        Self {
            smoother: Smoother::new(config.smoother.clone()),
            cache: PingCache::default(),
            config,
            ping_source,
            positions_tx,
            trails_tx,
        }
    }

    /// Runs the engine until the token is cancelled or the feed channel
    /// closes. Three periodic activities share this task: the smoothing
    /// tick, the incremental ping fetch and the staleness watchdog. Fetches
    /// are spawned so a slow ping source never stalls the animation; at
    /// most one is in flight at a time, and fetch ticks occurring while one
    /// is outstanding are skipped.
    pub async fn run(
        mut self,
        feed_rx: Receiver<Vec<VesselSnapshot>>,
        reconnect_rx: Receiver<()>,
        token: CancellationToken,
    ) {
        let mut smooth_interval = tokio::time::interval(self.config.smoother.tick_interval);
        let mut fetch_interval = tokio::time::interval(self.config.cache.fetch_interval);
        let mut watchdog_interval = tokio::time::interval(self.config.cache.watchdog_interval);
        for interval in [
            &mut smooth_interval,
            &mut fetch_interval,
            &mut watchdog_interval,
        ] {
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        // Prime the cache so trails are available right after startup.
        let mut in_flight = Some(self.spawn_fetch(FetchKind::Refresh));
        let mut reconnect_deadline: Option<Instant> = None;
        let mut reconnect_open = true;

        loop {
            let fetch_pending = in_flight.is_some();

            tokio::select! {
                _ = token.cancelled() => break,
                batch = feed_rx.recv() => match batch {
                    Ok(batch) => self.apply_batch(batch),
                    Err(_) => {
                        warn!("snapshot feed channel closed, shutting down");
                        break;
                    }
                },
                _ = smooth_interval.tick() => self.smoother_tick(),
                _ = fetch_interval.tick(), if !fetch_pending => {
                    in_flight = Some(self.spawn_fetch(FetchKind::Incremental));
                }
                _ = watchdog_interval.tick(), if !fetch_pending => {
                    if self
                        .cache
                        .is_stale(Utc::now(), self.config.cache.staleness_threshold)
                    {
                        warn!("ping watermark stalled, refreshing");
                        in_flight = Some(self.spawn_fetch(FetchKind::Refresh));
                    }
                }
                result = await_fetch(&mut in_flight), if fetch_pending => {
                    let (kind, result) = result;
                    self.finish_fetch(kind, result);
                }
                signal = reconnect_rx.recv(), if reconnect_open => match signal {
                    Ok(()) => {
                        reconnect_deadline =
                            Some(Instant::now() + self.config.cache.reconnect_debounce);
                    }
                    Err(_) => reconnect_open = false,
                },
                _ = async {
                    // Safe unwrap, the branch is disabled when no deadline
                    // is set.
                    tokio::time::sleep_until(reconnect_deadline.unwrap()).await
                }, if reconnect_deadline.is_some() => {
                    if in_flight.is_none() {
                        reconnect_deadline = None;
                        in_flight = Some(self.spawn_fetch(FetchKind::Refresh));
                    } else {
                        // Another fetch is mid-flight; try again once it
                        // settles.
                        reconnect_deadline =
                            Some(Instant::now() + self.config.cache.reconnect_debounce);
                    }
                }
            }
        }
    }

    /// Deduplicates a feed batch and registers each vessel's
    /// latency-compensated target.
    #[instrument(skip_all, fields(app.num_snapshots))]
    fn apply_batch(&mut self, batch: Vec<VesselSnapshot>) {
        tracing::Span::current().record("app.num_snapshots", batch.len());

        for (_, snapshot) in dedup_snapshots(batch) {
            let projected = project(&snapshot, self.config.projection_horizon);
            self.smoother.set_target(snapshot, projected);
        }
    }

    fn smoother_tick(&mut self) {
        let states = self.smoother.tick();
        self.positions_tx.send_replace(states);
        self.publish_trails();
    }

    fn spawn_fetch(&self, kind: FetchKind) -> (FetchKind, JoinHandle<CoreResult<Vec<Ping>>>) {
        let source = self.ping_source.clone();
        let since = match kind {
            FetchKind::Refresh => Utc::now() - self.config.cache.history_window,
            FetchKind::Incremental => self.cache.watermark(),
        };

        (kind, tokio::spawn(async move { source.pings_since(since).await }))
    }

    /// Applies a completed fetch. Failures are logged and left for the next
    /// scheduled attempt; the cache is never touched by a failed fetch.
    #[instrument(skip_all)]
    fn finish_fetch(&mut self, kind: FetchKind, result: Result<CoreResult<Vec<Ping>>, JoinError>) {
        match result {
            Ok(Ok(pings)) => {
                match kind {
                    FetchKind::Refresh => self.cache.replace(pings),
                    FetchKind::Incremental => self.cache.merge(pings),
                }
                self.cache.prune(Utc::now(), self.config.cache.history_window);
                self.publish_trails();
            }
            Ok(Err(e)) => error!("ping fetch failed: {e:?}"),
            Err(e) => error!("ping fetch panicked: {e:?}"),
        }
    }

    fn publish_trails(&mut self) {
        let now = Utc::now();
        let mut trails = HashMap::new();

        for state in self.smoother.states() {
            let pings = self.cache.pings(state.vessel_id);
            if let Some(trail) = build_trail(pings, state, now, &self.config.trail) {
                trails.insert(state.vessel_id, trail);
            }
        }

        self.trails_tx.send_replace(trails);
    }
}

async fn await_fetch(
    in_flight: &mut Option<(FetchKind, JoinHandle<CoreResult<Vec<Ping>>>)>,
) -> (FetchKind, Result<CoreResult<Vec<Ping>>, JoinError>) {
    match in_flight.as_mut() {
        Some((kind, handle)) => {
            let kind = *kind;
            let result = handle.await;
            *in_flight = None;
            (kind, result)
        }
        None => std::future::pending().await,
    }
}
