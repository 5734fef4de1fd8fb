use chrono::{DateTime, Utc};
use ferry_core::{AnimationState, Ping, Trail, TrailPoint};
use itertools::Itertools;
use tracing::warn;

static RECENT_CUTOFF: chrono::Duration = chrono::Duration::minutes(1);
static HISTORY_WINDOW: chrono::Duration = chrono::Duration::minutes(20);
static SPLINE_SEGMENTS: usize = 8;

#[derive(Debug, Clone)]
pub struct TrailConfig {
    /// How far back pings are considered.
    pub history_window: chrono::Duration,
    /// Pings newer than this are excluded; the live smoothed position
    /// covers the head of the trail.
    pub recent_cutoff: chrono::Duration,
    /// Interpolated points emitted per input segment.
    pub spline_segments: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            history_window: HISTORY_WINDOW,
            recent_cutoff: RECENT_CUTOFF,
            spline_segments: SPLINE_SEGMENTS,
        }
    }
}

/// Builds the renderable trail for one vessel from its ping history plus
/// its current smoothed position, which becomes the trail's terminal point.
///
/// Runs of consecutive at-dock pings are collapsed to the final dock ping
/// before departure so idle time at a terminal does not pile points onto
/// the line. Returns `None` when fewer than two points remain.
pub fn build_trail(
    pings: &[Ping],
    state: &AnimationState,
    now: DateTime<Utc>,
    config: &TrailConfig,
) -> Option<Trail> {
    let oldest_allowed = now - config.history_window;
    let newest_allowed = now - config.recent_cutoff;

    let windowed: Vec<&Ping> = pings
        .iter()
        .filter(|p| p.timestamp >= oldest_allowed && p.timestamp <= newest_allowed)
        .collect();

    let mut points = Vec::with_capacity(windowed.len() + 1);
    let mut iter = windowed.iter().peekable();
    while let Some(ping) = iter.next() {
        if ping.at_dock {
            match iter.peek() {
                Some(next) if !next.at_dock => points.push(TrailPoint {
                    latitude: ping.latitude,
                    longitude: ping.longitude,
                }),
                _ => {}
            }
        } else {
            points.push(TrailPoint {
                latitude: ping.latitude,
                longitude: ping.longitude,
            });
        }
    }

    points.push(TrailPoint {
        latitude: state.latitude,
        longitude: state.longitude,
    });

    if points.len() < 2 {
        return None;
    }

    match catmull_rom(&points, config.spline_segments) {
        Some(curve) => Some(Trail {
            vessel_id: state.vessel_id,
            points: curve,
            smoothed: true,
        }),
        None => {
            warn!(
                "curve interpolation failed for vessel {}, falling back to the raw polyline",
                state.vessel_id
            );
            Some(Trail {
                vessel_id: state.vessel_id,
                points,
                smoothed: false,
            })
        }
    }
}

/// Catmull-Rom interpolation through `points`, with the endpoints doubled
/// so the curve passes through them. Returns `None` if
/// any interpolated coordinate fails to resolve to a finite value.
fn catmull_rom(points: &[TrailPoint], segments: usize) -> Option<Vec<TrailPoint>> {
    if points.len() < 3 {
        return Some(points.to_vec());
    }

    let segments = segments.max(1);

    let mut padded = Vec::with_capacity(points.len() + 2);
    padded.push(points[0]);
    padded.extend_from_slice(points);
    padded.push(points[points.len() - 1]);

    let mut curve = Vec::with_capacity((points.len() - 1) * segments + 1);
    for (p0, p1, p2, p3) in padded.iter().copied().tuple_windows() {
        for step in 0..segments {
            let t = step as f64 / segments as f64;
            let latitude = catmull_rom_value(p0.latitude, p1.latitude, p2.latitude, p3.latitude, t);
            let longitude =
                catmull_rom_value(p0.longitude, p1.longitude, p2.longitude, p3.longitude, t);

            if !latitude.is_finite() || !longitude.is_finite() {
                return None;
            }

            curve.push(TrailPoint {
                latitude,
                longitude,
            });
        }
    }
    curve.push(points[points.len() - 1]);

    Some(curve)
}

fn catmull_rom_value(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
