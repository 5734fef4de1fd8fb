use std::{collections::HashMap, time::Duration};

use ferry_core::{AnimationState, VesselId, VesselSnapshot, normalize_heading};
use geoutils::Location;
use tracing::error;

use crate::error::{Result, error::DistanceEstimationSnafu};

/// How often displayed states are advanced toward their targets,
/// independent of the feed arrival rate.
pub static SMOOTHING_INTERVAL: Duration = Duration::from_secs(1);

static SMOOTHING_PERIOD: Duration = Duration::from_secs(15);
static TELEPORT_THRESHOLD_METERS: f64 = 500.0;
static HEADING_SNAP_DEGREES: f64 = 45.0;

#[derive(Debug, Clone)]
pub struct SmootherConfig {
    pub tick_interval: Duration,
    /// Period over which a stationary target is adopted; together with
    /// `tick_interval` this sets the per-tick blend weight.
    pub smoothing_period: Duration,
    /// Position changes beyond this are snapped, not blended.
    pub teleport_threshold_meters: f64,
    /// Heading changes beyond this are treated as real course changes and
    /// snapped.
    pub heading_snap_degrees: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            tick_interval: SMOOTHING_INTERVAL,
            smoothing_period: SMOOTHING_PERIOD,
            teleport_threshold_meters: TELEPORT_THRESHOLD_METERS,
            heading_snap_degrees: HEADING_SNAP_DEGREES,
        }
    }
}

#[derive(Debug, Clone)]
struct Target {
    raw: VesselSnapshot,
    projected: VesselSnapshot,
}

/// Exclusive owner of all per-vessel animation states. States are created
/// on first sighting and never evicted; a vessel that stops reporting
/// simply stops being updated.
#[derive(Debug, Default)]
pub struct Smoother {
    config: SmootherConfig,
    states: HashMap<VesselId, AnimationState>,
    targets: HashMap<VesselId, Target>,
}

impl Smoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
            targets: HashMap::new(),
        }
    }

    /// Registers the latest deduplicated snapshot for a vessel. The first
    /// snapshot seen for a vessel initializes its displayed state directly;
    /// later snapshots only move the target the next ticks blend toward.
    pub fn set_target(&mut self, raw: VesselSnapshot, projected: VesselSnapshot) {
        self.states
            .entry(raw.vessel_id)
            .or_insert_with(|| AnimationState::from(raw.clone()));
        self.targets.insert(raw.vessel_id, Target { raw, projected });
    }

    pub fn states(&self) -> impl Iterator<Item = &AnimationState> {
        self.states.values()
    }

    /// Advances every tracked vessel one tick toward its target and returns
    /// the resulting display states. A vessel whose update fails is logged
    /// and left out of this tick's output without affecting the rest; a
    /// vessel without a target is carried through unchanged.
    pub fn tick(&mut self) -> Vec<AnimationState> {
        let mut output = Vec::with_capacity(self.states.len());

        for (vessel_id, state) in &mut self.states {
            if let Some(target) = self.targets.get(vessel_id) {
                if let Err(e) = Self::advance(state, target, &self.config) {
                    error!("failed to advance vessel {vessel_id}: {e:?}");
                    continue;
                }
            }
            output.push(state.clone());
        }

        output
    }

    fn advance(state: &mut AnimationState, target: &Target, config: &SmootherConfig) -> Result<()> {
        let displayed = Location::new(state.latitude, state.longitude);
        let projected = Location::new(target.projected.latitude, target.projected.longitude);

        let distance = displayed.distance_to(&projected).map_err(|e| {
            DistanceEstimationSnafu {
                from: displayed,
                to: projected,
                error_stringified: e,
            }
            .build()
        })?;

        if !distance.meters().is_finite() {
            return DistanceEstimationSnafu {
                from: Location::new(state.latitude, state.longitude),
                to: Location::new(target.projected.latitude, target.projected.longitude),
                error_stringified: "non-finite distance".to_string(),
            }
            .fail();
        }

        if distance.meters() > config.teleport_threshold_meters {
            // Too far to be real motion between ticks (dock change, route
            // reassignment), adopt the target outright.
            state.latitude = target.projected.latitude;
            state.longitude = target.projected.longitude;
            state.heading = normalize_heading(target.projected.heading);
        } else {
            let new_weight =
                config.tick_interval.as_secs_f64() / config.smoothing_period.as_secs_f64();
            let prev_weight = 1.0 - new_weight;

            state.latitude =
                round_coordinate(prev_weight * state.latitude + new_weight * target.projected.latitude);
            state.longitude = round_coordinate(
                prev_weight * state.longitude + new_weight * target.projected.longitude,
            );
            state.heading = blend_heading(
                state.heading,
                target.projected.heading,
                new_weight,
                config.heading_snap_degrees,
            );
        }

        state.snapshot = target.raw.clone();

        Ok(())
    }
}

/// Rounds a coordinate to six decimal places (~1M) to keep repeated blends
/// from accumulating floating-point drift.
fn round_coordinate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn blend_heading(displayed: f64, target: f64, new_weight: f64, snap_degrees: f64) -> f64 {
    let displayed = normalize_heading(displayed);
    let target = normalize_heading(target);

    let diff = (target - displayed).abs();
    let shortest = if diff > 180.0 { 360.0 - diff } else { diff };

    if shortest > snap_degrees {
        return target;
    }

    let mut delta = target - displayed;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }

    normalize_heading(displayed + new_weight * delta)
}
