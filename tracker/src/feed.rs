use std::{sync::Arc, time::Duration};

use async_channel::Sender;
use ferry_core::{SnapshotFeed, VesselSnapshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};

/// Polls the snapshot feed at a fixed cadence and forwards non-empty
/// batches to the engine.
pub struct FeedPoller {
    feed: Arc<dyn SnapshotFeed>,
    sender: Sender<Vec<VesselSnapshot>>,
    poll_interval: Duration,
}

impl FeedPoller {
    pub fn new(
        feed: Arc<dyn SnapshotFeed>,
        sender: Sender<Vec<VesselSnapshot>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            feed,
            sender,
            poll_interval,
        }
    }

    pub async fn run(self, token: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => self.poll_once().await,
            }
        }
    }

    #[instrument(skip_all)]
    async fn poll_once(&self) {
        match self.feed.snapshots().await {
            Ok(batch) => {
                if batch.is_empty() {
                    return;
                }
                // Can only fail if the engine has shut down.
                if let Err(e) = self.sender.send(batch).await {
                    error!("engine channel closed: {e:?}");
                }
            }
            Err(e) => error!("snapshot feed poll failed: {e:?}"),
        }
    }
}
