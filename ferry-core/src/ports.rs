use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{CoreResult, Ping, VesselSnapshot};

/// Live vessel feed, polled at the caller's cadence. A poll returns the
/// latest batch of snapshots, possibly containing duplicate and out-of-order
/// entries per vessel.
#[async_trait]
pub trait SnapshotFeed: Send + Sync {
    async fn snapshots(&self) -> CoreResult<Vec<VesselSnapshot>>;
}

/// Historical position source. Implementations return pings with a timestamp
/// strictly greater than `since`, ordered ascending by timestamp.
#[async_trait]
pub trait PingSource: Send + Sync {
    async fn pings_since(&self, since: DateTime<Utc>) -> CoreResult<Vec<Ping>>;
}
