use chrono::Utc;
use ferry_core::{Ping, VesselId, VesselSnapshot};

use crate::helper::{await_position, await_trail, spawn_app};

fn snapshot_at(vessel_id: i32, latitude: f64, longitude: f64) -> VesselSnapshot {
    let mut snapshot = VesselSnapshot::test_default(Some(VesselId::new(vessel_id)));
    snapshot.latitude = latitude;
    snapshot.longitude = longitude;
    // Below the projection band so the displayed position settles exactly
    // on the reported one.
    snapshot.speed_knots = 0.5;
    snapshot.timestamp = Utc::now();
    snapshot
}

fn ping_at(vessel_id: i32, latitude: f64, age: chrono::Duration) -> Ping {
    let mut ping = Ping::test_default(Some(VesselId::new(vessel_id)));
    ping.latitude = latitude;
    ping.longitude = -122.33;
    ping.timestamp = Utc::now() - age;
    ping
}

#[tokio::test]
async fn test_first_sighting_is_published_directly() {
    let helper = spawn_app().await;
    let id = VesselId::new(42);

    helper.feed.push(vec![snapshot_at(42, 47.6, -122.33)]);

    let state = await_position(&helper.handle, |s| s.vessel_id == id).await;
    assert_eq!(state.latitude, 47.6);
    assert_eq!(state.longitude, -122.33);
    assert!(state.in_service());
    assert!(!state.at_dock());

    helper.shutdown().await;
}

#[tokio::test]
async fn test_reassigned_vessel_snaps_to_new_position() {
    let helper = spawn_app().await;
    let id = VesselId::new(7);

    helper.feed.push(vec![snapshot_at(7, 47.6, -122.33)]);
    await_position(&helper.handle, |s| s.vessel_id == id).await;

    helper.feed.push(vec![snapshot_at(7, 47.7, -122.5)]);

    let state = await_position(&helper.handle, |s| s.vessel_id == id && s.latitude == 47.7).await;
    assert_eq!(state.longitude, -122.5);

    helper.shutdown().await;
}

#[tokio::test]
async fn test_trails_are_built_from_ping_history() {
    let helper = spawn_app().await;
    let id = VesselId::new(3);

    let pings = (0..8)
        .map(|i| {
            ping_at(
                3,
                47.6 + i as f64 * 0.001,
                chrono::Duration::minutes(10 - i),
            )
        })
        .collect();
    helper.ping_source.seed(pings);

    helper.feed.push(vec![snapshot_at(3, 47.61, -122.33)]);

    let trail = await_trail(&helper.handle, id).await;
    assert!(trail.smoothed);
    assert!(trail.points.len() >= 2);
    // The live smoothed position terminates the trail.
    assert_eq!(trail.points.last().unwrap().latitude, 47.61);

    helper.shutdown().await;
}

#[tokio::test]
async fn test_failed_fetch_is_retried_by_the_watchdog() {
    let helper = spawn_app().await;
    let id = VesselId::new(9);

    helper.ping_source.fail_next_fetch();
    let pings = (0..5)
        .map(|i| ping_at(9, 47.6 + i as f64 * 0.001, chrono::Duration::minutes(10 - i)))
        .collect();
    helper.ping_source.seed(pings);

    helper.feed.push(vec![snapshot_at(9, 47.62, -122.33)]);

    let trail = await_trail(&helper.handle, id).await;
    assert!(trail.points.len() >= 2);

    helper.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_triggers_an_immediate_refresh() {
    let helper = spawn_app().await;
    let id_a = VesselId::new(11);
    let id_b = VesselId::new(12);

    // Vessel A's history is available from the start and keeps the
    // watermark fresh enough that the watchdog stays quiet.
    let a_pings = (0..5)
        .map(|i| ping_at(11, 47.6 + i as f64 * 0.001, chrono::Duration::minutes(10 - 2 * i)))
        .collect();
    helper.ping_source.seed(a_pings);

    helper
        .feed
        .push(vec![snapshot_at(11, 47.6, -122.33), snapshot_at(12, 47.8, -122.33)]);

    await_trail(&helper.handle, id_a).await;
    assert!(helper.handle.trails().borrow().get(&id_b).is_none());

    // Vessel B's history landed while we were offline; it is older than the
    // watermark, so only a wholesale refresh can pick it up.
    let b_pings = (0..5)
        .map(|i| ping_at(12, 47.8 + i as f64 * 0.001, chrono::Duration::minutes(12 - 2 * i)))
        .collect();
    helper.ping_source.seed(b_pings);

    helper.handle.signal_reconnect();

    let trail = await_trail(&helper.handle, id_b).await;
    assert!(trail.points.len() >= 2);

    helper.shutdown().await;
}
