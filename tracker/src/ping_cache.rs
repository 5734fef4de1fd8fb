use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, Utc};
use ferry_core::{Ping, VesselId};

static HISTORY_WINDOW: chrono::Duration = chrono::Duration::minutes(20);
static FETCH_INTERVAL: Duration = Duration::from_secs(60);
static WATCHDOG_INTERVAL: Duration = Duration::from_secs(5);
static STALENESS_THRESHOLD: chrono::Duration = chrono::Duration::seconds(150);
static RECONNECT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct PingCacheConfig {
    /// How much history is retained per vessel.
    pub history_window: chrono::Duration,
    /// Cadence of incremental fetches.
    pub fetch_interval: Duration,
    /// Cadence of the staleness check.
    pub watchdog_interval: Duration,
    /// Watermark age beyond which the cache is refreshed rather than
    /// waiting for the next incremental fetch.
    pub staleness_threshold: chrono::Duration,
    /// Coalescing window for reconnect signals.
    pub reconnect_debounce: Duration,
}

impl Default for PingCacheConfig {
    fn default() -> Self {
        Self {
            history_window: HISTORY_WINDOW,
            fetch_interval: FETCH_INTERVAL,
            watchdog_interval: WATCHDOG_INTERVAL,
            staleness_threshold: STALENESS_THRESHOLD,
            reconnect_debounce: RECONNECT_DEBOUNCE,
        }
    }
}

/// Rolling window of recent pings per vessel. Sequences are kept ascending
/// by timestamp and the watermark tracks the newest timestamp ever merged,
/// so incremental fetches only ask for data past it.
#[derive(Debug)]
pub struct PingCache {
    by_vessel: BTreeMap<VesselId, Vec<Ping>>,
    watermark: DateTime<Utc>,
}

impl Default for PingCache {
    fn default() -> Self {
        Self {
            by_vessel: BTreeMap::new(),
            watermark: DateTime::UNIX_EPOCH,
        }
    }
}

impl PingCache {
    pub fn watermark(&self) -> DateTime<Utc> {
        self.watermark
    }

    pub fn pings(&self, vessel_id: VesselId) -> &[Ping] {
        self.by_vessel
            .get(&vessel_id)
            .map(|pings| pings.as_slice())
            .unwrap_or_default()
    }

    pub fn is_stale(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        now - self.watermark > threshold
    }

    /// Replaces the cache wholesale with a refresh result. An empty result
    /// leaves the cache empty with the watermark back at epoch; there is
    /// simply nothing tracked right now.
    pub fn replace(&mut self, pings: Vec<Ping>) {
        self.by_vessel.clear();
        self.watermark = DateTime::UNIX_EPOCH;
        self.merge(pings);
    }

    /// Appends incrementally fetched pings, which arrive ascending by
    /// timestamp, and advances the watermark to the newest among them.
    pub fn merge(&mut self, pings: Vec<Ping>) {
        for ping in pings {
            if ping.timestamp > self.watermark {
                self.watermark = ping.timestamp;
            }
            self.by_vessel.entry(ping.vessel_id).or_default().push(ping);
        }
    }

    /// Drops every ping older than the history window, removing vessels
    /// whose whole sequence aged out.
    pub fn prune(&mut self, now: DateTime<Utc>, window: chrono::Duration) {
        let cutoff = now - window;
        self.by_vessel.retain(|_, pings| {
            pings.retain(|p| p.timestamp >= cutoff);
            !pings.is_empty()
        });
    }
}
