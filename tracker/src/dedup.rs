use std::collections::HashMap;

use ferry_core::{VesselId, VesselSnapshot};

/// Collapses a feed batch to one snapshot per vessel, keeping the most
/// recently timestamped entry. On equal timestamps the later element in
/// arrival order wins.
pub fn dedup_snapshots(batch: Vec<VesselSnapshot>) -> HashMap<VesselId, VesselSnapshot> {
    let mut latest: HashMap<VesselId, VesselSnapshot> = HashMap::with_capacity(batch.len());

    for snapshot in batch {
        match latest.get(&snapshot.vessel_id) {
            Some(existing) if snapshot.timestamp < existing.timestamp => {}
            _ => {
                latest.insert(snapshot.vessel_id, snapshot);
            }
        }
    }

    latest
}
