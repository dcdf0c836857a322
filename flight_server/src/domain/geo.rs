// Spherical-earth navigation helpers. Angles in degrees, distances in meters.

use serde::Serialize;

/// Mean earth radius (m).
pub const EARTH_RADIUS: f64 = 6_371_000.0;
pub const METERS_PER_NM: f64 = 1852.0;
pub const METERS_PER_FOOT: f64 = 0.3048;

// Angular separation below which two points are treated as coincident (rad).
const COINCIDENT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

fn central_angle(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (to.lon - from.lon).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Great-circle (haversine) distance.
pub fn distance(from: GeoPoint, to: GeoPoint) -> f64 {
    EARTH_RADIUS * central_angle(from, to)
}

/// Initial bearing (forward azimuth) from `from` to `to`, in `[0, 360)`.
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_heading(y.atan2(x).to_degrees())
}

/// Point reached after travelling `distance` meters along `heading` degrees.
pub fn destination(from: GeoPoint, heading: f64, distance: f64) -> GeoPoint {
    let delta = distance / EARTH_RADIUS;
    let theta = heading.to_radians();
    let lat1 = from.lat.to_radians();
    let lon1 = from.lon.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Point at `fraction` (0..=1) of the way along the great circle.
///
/// Falls back to straight interpolation when the endpoints coincide.
pub fn intermediate(from: GeoPoint, to: GeoPoint, fraction: f64) -> GeoPoint {
    let f = fraction.clamp(0.0, 1.0);
    let delta = central_angle(from, to);
    if delta < COINCIDENT_EPSILON {
        return GeoPoint::new(
            from.lat + (to.lat - from.lat) * f,
            from.lon + (to.lon - from.lon) * f,
        );
    }

    let a = ((1.0 - f) * delta).sin() / delta.sin();
    let b = (f * delta).sin() / delta.sin();
    let (lat1, lon1) = (from.lat.to_radians(), from.lon.to_radians());
    let (lat2, lon2) = (to.lat.to_radians(), to.lon.to_radians());

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    GeoPoint::new(z.atan2(x.hypot(y)).to_degrees(), y.atan2(x).to_degrees())
}

/// `points` evenly spaced positions from `from` to `to`, endpoints included.
pub fn great_circle_path(from: GeoPoint, to: GeoPoint, points: usize) -> Vec<GeoPoint> {
    let points = points.max(2);
    let last = (points - 1) as f64;
    (0..points)
        .map(|i| intermediate(from, to, i as f64 / last))
        .collect()
}

pub fn normalize_heading(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    if h >= 360.0 { 0.0 } else { h }
}

/// Signed smallest rotation from `from` to `to`, in `(-180, 180]`.
pub fn heading_difference(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

fn normalize_longitude(degrees: f64) -> f64 {
    (degrees + 540.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const JFK: GeoPoint = GeoPoint { lat: 40.6413, lon: -73.7781 };
    const LHR: GeoPoint = GeoPoint { lat: 51.4700, lon: -0.4543 };

    #[test]
    fn distance_matches_known_route() {
        // JFK-LHR is about 5,540 km.
        let d = distance(JFK, LHR);
        assert!((d - 5_540_000.0).abs() < 20_000.0, "distance {d}");
        assert_eq!(distance(JFK, JFK), 0.0);
    }

    #[test]
    fn bearing_points_along_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((bearing(origin, GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn destination_follows_bearing_and_distance() {
        let heading = bearing(JFK, LHR);
        let step = destination(JFK, heading, 100_000.0);
        assert!((distance(JFK, step) - 100_000.0).abs() < 1.0);
        // Stepping along the initial bearing keeps us on the great circle.
        let remaining = distance(step, LHR);
        assert!((remaining - (distance(JFK, LHR) - 100_000.0)).abs() < 10.0);
    }

    #[test]
    fn destination_wraps_across_antimeridian() {
        let p = destination(GeoPoint::new(0.0, 179.9), 90.0, 50_000.0);
        assert!(p.lon < -179.0 && p.lon >= -180.0, "lon {}", p.lon);
    }

    #[test]
    fn intermediate_hits_endpoints_and_midpoint() {
        let start = intermediate(JFK, LHR, 0.0);
        let end = intermediate(JFK, LHR, 1.0);
        assert!(distance(start, JFK) < 1e-3);
        assert!(distance(end, LHR) < 1e-3);

        let mid = intermediate(JFK, LHR, 0.5);
        assert!((distance(JFK, mid) - distance(mid, LHR)).abs() < 1.0);
    }

    #[test]
    fn intermediate_handles_coincident_points() {
        let p = intermediate(JFK, JFK, 0.3);
        assert!(p.lat.is_finite() && p.lon.is_finite());
        assert!(distance(p, JFK) < 1e-6);
    }

    #[test]
    fn path_includes_both_endpoints() {
        let path = great_circle_path(JFK, LHR, 1);
        assert_eq!(path.len(), 2);
        let path = great_circle_path(JFK, LHR, 16);
        assert_eq!(path.len(), 16);
        assert!(distance(path[15], LHR) < 1e-3);
    }

    #[test]
    fn heading_helpers_wrap() {
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(720.0), 0.0);
        assert_eq!(heading_difference(350.0, 10.0), 20.0);
        assert_eq!(heading_difference(10.0, 350.0), -20.0);
        assert_eq!(heading_difference(0.0, 180.0), 180.0);
    }
}
