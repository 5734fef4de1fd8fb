use crate::{VesselId, VesselSnapshot};

/// Displayed state for one vessel. Created directly from the first snapshot
/// seen for the vessel, then advanced toward feed targets one smoothing tick
/// at a time.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub vessel_id: VesselId,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: f64,
    /// Last raw snapshot received for the vessel, carried through for the
    /// dock and service flags.
    pub snapshot: VesselSnapshot,
}

impl From<VesselSnapshot> for AnimationState {
    fn from(snapshot: VesselSnapshot) -> Self {
        Self {
            vessel_id: snapshot.vessel_id,
            latitude: snapshot.latitude,
            longitude: snapshot.longitude,
            heading: snapshot.heading,
            snapshot,
        }
    }
}

impl AnimationState {
    pub fn at_dock(&self) -> bool {
        self.snapshot.at_dock
    }

    pub fn in_service(&self) -> bool {
        self.snapshot.in_service
    }
}
