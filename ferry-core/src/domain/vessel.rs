use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct VesselId(i32);

impl VesselId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl From<i32> for VesselId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl Display for VesselId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reported position/velocity sample for a vessel, immutable once
/// produced by the feed adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VesselSnapshot {
    pub vessel_id: VesselId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f64,
    /// Heading in degrees, `0-360`.
    pub heading: f64,
    pub at_dock: bool,
    pub in_service: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(feature = "test")]
mod test {
    use rand::random;

    use super::*;

    impl VesselSnapshot {
        pub fn test_default(vessel_id: Option<VesselId>) -> VesselSnapshot {
            VesselSnapshot {
                vessel_id: vessel_id
                    .unwrap_or_else(|| VesselId::new(random::<i32>().abs())),
                latitude: 47.6025,
                longitude: -122.334,
                speed_knots: 12.0,
                heading: 270.0,
                at_dock: false,
                in_service: true,
                timestamp: chrono::offset::Utc::now(),
            }
        }
    }
}
