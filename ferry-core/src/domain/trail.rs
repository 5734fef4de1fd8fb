use crate::VesselId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Renderable recent path for one vessel, rebuilt on demand and never
/// persisted. `smoothed` is false when curve interpolation failed and the
/// raw polyline was used instead.
#[derive(Debug, Clone)]
pub struct Trail {
    pub vessel_id: VesselId,
    pub points: Vec<TrailPoint>,
    pub smoothed: bool,
}
