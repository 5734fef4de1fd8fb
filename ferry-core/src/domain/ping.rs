use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{VesselId, VesselSnapshot};

/// Slimmed position sample retained in the rolling history window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ping {
    pub vessel_id: VesselId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f64,
    pub heading: f64,
    pub at_dock: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<&VesselSnapshot> for Ping {
    fn from(snapshot: &VesselSnapshot) -> Self {
        let VesselSnapshot {
            vessel_id,
            latitude,
            longitude,
            speed_knots,
            heading,
            at_dock,
            in_service: _,
            timestamp,
        } = snapshot;

        Ping {
            vessel_id: *vessel_id,
            latitude: *latitude,
            longitude: *longitude,
            speed_knots: *speed_knots,
            heading: *heading,
            at_dock: *at_dock,
            timestamp: *timestamp,
        }
    }
}


#[cfg(feature = "test")]
mod test {
    use rand::random;

    use super::*;

    impl Ping {
        pub fn test_default(vessel_id: Option<VesselId>) -> Ping {
            Ping {
                vessel_id: vessel_id
                    .unwrap_or_else(|| VesselId::new(random::<i32>().abs())),
                latitude: 47.6025,
                longitude: -122.334,
                speed_knots: 12.0,
                heading: 270.0,
                at_dock: false,
                timestamp: chrono::offset::Utc::now(),
            }
        }
    }
}
