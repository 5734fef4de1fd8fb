use std::{collections::HashMap, sync::Arc};

use async_channel::Receiver;
use ferry_core::{AnimationState, PingSource, SnapshotFeed, Trail, VesselId, VesselSnapshot};
use tokio::{sync::watch, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    engine::{EngineConfig, VesselTrackingContext},
    error::{Result, error::JoinSnafu},
    feed::FeedPoller,
    settings::Settings,
};

pub struct App {
    poller: FeedPoller,
    engine: VesselTrackingContext,
    feed_rx: Receiver<Vec<VesselSnapshot>>,
    reconnect_rx: Receiver<()>,
    token: CancellationToken,
}

/// Handed to the embedding application: read sides of the engine's outputs
/// plus the reconnect and shutdown signals.
#[derive(Clone)]
pub struct TrackerHandle {
    positions: watch::Receiver<Vec<AnimationState>>,
    trails: watch::Receiver<HashMap<VesselId, Trail>>,
    reconnect: async_channel::Sender<()>,
    token: CancellationToken,
}

impl TrackerHandle {
    /// Current display state per tracked vessel, updated every smoothing
    /// tick.
    pub fn positions(&self) -> watch::Receiver<Vec<AnimationState>> {
        self.positions.clone()
    }

    /// Per-vessel trail geometries, rebuilt whenever a tick or new ping
    /// data changes them.
    pub fn trails(&self) -> watch::Receiver<HashMap<VesselId, Trail>> {
        self.trails.clone()
    }

    /// Signals that connectivity was regained (app foregrounded, network
    /// restored). Rapid repeated signals are coalesced by the engine's
    /// debounce window.
    pub fn signal_reconnect(&self) {
        let _ = self.reconnect.try_send(());
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl App {
    pub fn build(
        settings: &Settings,
        feed: Arc<dyn SnapshotFeed>,
        ping_source: Arc<dyn PingSource>,
    ) -> (App, TrackerHandle) {
        Self::build_with_config(settings, EngineConfig::default(), feed, ping_source)
    }

    pub fn build_with_config(
        settings: &Settings,
        config: EngineConfig,
        feed: Arc<dyn SnapshotFeed>,
        ping_source: Arc<dyn PingSource>,
    ) -> (App, TrackerHandle) {
        let (feed_tx, feed_rx) = async_channel::bounded(settings.feed_buffer_size);
        let (reconnect_tx, reconnect_rx) = async_channel::bounded(16);
        let (positions_tx, positions_rx) = watch::channel(Vec::new());
        let (trails_tx, trails_rx) = watch::channel(HashMap::new());
        let token = CancellationToken::new();

        let poller = FeedPoller::new(feed, feed_tx, settings.feed_poll_interval);
        let engine = VesselTrackingContext::new(config, ping_source, positions_tx, trails_tx);

        let handle = TrackerHandle {
            positions: positions_rx,
            trails: trails_rx,
            reconnect: reconnect_tx,
            token: token.clone(),
        };

        (
            App {
                poller,
                engine,
                feed_rx,
                reconnect_rx,
                token,
            },
            handle,
        )
    }

    /// Runs the poller and the engine until shutdown is signalled through
    /// the handle.
    pub async fn run(self) -> Result<()> {
        let App {
            poller,
            engine,
            feed_rx,
            reconnect_rx,
            token,
        } = self;

        let mut set = JoinSet::new();

        set.spawn(poller.run(token.clone()));
        set.spawn(engine.run(feed_rx, reconnect_rx, token));

        while let Some(out) = set.join_next().await {
            out.map_err(|error| JoinSnafu { error }.build())?;
        }

        Ok(())
    }
}
