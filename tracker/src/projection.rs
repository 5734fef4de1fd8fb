use std::time::Duration;

use ferry_core::{VesselSnapshot, haversine_destination};
use tracing::warn;

/// How far ahead reported positions are projected to offset feed latency.
pub static PROJECTION_HORIZON: Duration = Duration::from_secs(15);

/// Speeds outside this band are treated as sensor noise and left
/// unprojected.
static MIN_PROJECTION_SPEED_KNOTS: f64 = 1.0;
static MAX_PROJECTION_SPEED_KNOTS: f64 = 40.0;

static KNOTS_TO_METERS_PER_SECOND: f64 = 1852.0 / 3600.0;

/// Advances a snapshot's position along the great-circle implied by its
/// heading and speed for `horizon`, leaving every other field untouched.
/// Snapshots with implausible or non-finite kinematics are returned
/// unchanged, as is any snapshot whose projected position does not resolve
/// to finite coordinates.
pub fn project(snapshot: &VesselSnapshot, horizon: Duration) -> VesselSnapshot {
    if !snapshot.speed_knots.is_finite()
        || !snapshot.heading.is_finite()
        || snapshot.speed_knots < MIN_PROJECTION_SPEED_KNOTS
        || snapshot.speed_knots > MAX_PROJECTION_SPEED_KNOTS
    {
        return snapshot.clone();
    }

    let distance = snapshot.speed_knots * KNOTS_TO_METERS_PER_SECOND * horizon.as_secs_f64();
    let (latitude, longitude) = haversine_destination(
        snapshot.latitude,
        snapshot.longitude,
        snapshot.heading,
        distance,
    );

    if !latitude.is_finite() || !longitude.is_finite() {
        warn!(
            "projection failed for vessel {}, using the reported position",
            snapshot.vessel_id
        );
        return snapshot.clone();
    }

    VesselSnapshot {
        latitude,
        longitude,
        ..snapshot.clone()
    }
}
