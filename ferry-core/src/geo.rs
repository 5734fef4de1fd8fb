static EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Destination reached when travelling `distance` meters from
/// `(latitude, longitude)` along the great-circle with initial `bearing`
/// degrees. Returns `(latitude, longitude)` in degrees.
pub fn haversine_destination(
    latitude: f64,
    longitude: f64,
    bearing: f64,
    distance: f64,
) -> (f64, f64) {
    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    let bearing = bearing.to_radians();
    let angular = distance / EARTH_RADIUS_METERS;

    let dest_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let dest_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * dest_lat.sin());

    (dest_lat.to_degrees(), normalize_longitude(dest_lon.to_degrees()))
}

/// Normalizes a heading in degrees into `[0, 360)`.
pub fn normalize_heading(heading: f64) -> f64 {
    let normalized = heading % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

fn normalize_longitude(longitude: f64) -> f64 {
    let normalized = (longitude + 180.0) % 360.0;
    if normalized < 0.0 {
        normalized + 360.0 - 180.0
    } else {
        normalized - 180.0
    }
}
