//! Geographic primitives used by map cameras.
//!
//! Coordinates are WGS84 degrees. Bearings are degrees clockwise from north,
//! normalized into `[0, 360)`.

/// A `(longitude, latitude)` pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Clamps latitude to the poles and wraps longitude into `[-180, 180)`.
    pub fn normalized(self) -> Self {
        Self {
            lon: wrap_longitude(self.lon),
            lat: self.lat.clamp(-90.0, 90.0),
        }
    }

    /// Linear interpolation that crosses the antimeridian along the short way.
    pub fn lerp(self, other: LngLat, t: f64) -> Self {
        let mut dlon = other.lon - self.lon;
        if dlon > 180.0 {
            dlon -= 360.0;
        } else if dlon < -180.0 {
            dlon += 360.0;
        }
        Self {
            lon: self.lon + dlon * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
        .normalized()
    }
}

pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Normalizes a bearing into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_bearing(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if b >= 360.0 { 0.0 } else { b }
}

/// Signed delta in `(-180, 180]` that turns `from` into `to` along the shorter arc.
pub fn shortest_bearing_delta(from: f64, to: f64) -> f64 {
    let d = normalize_bearing(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::{LngLat, normalize_bearing, shortest_bearing_delta, wrap_longitude};
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn bearing_wraps_both_directions() {
        assert_close(normalize_bearing(360.0), 0.0, 1e-12);
        assert_close(normalize_bearing(370.5), 10.5, 1e-12);
        assert_close(normalize_bearing(-90.0), 270.0, 1e-12);
        assert_eq!(normalize_bearing(f64::NAN), 0.0);
    }

    #[test]
    fn shortest_delta_prefers_short_arc() {
        assert_close(shortest_bearing_delta(350.0, 10.0), 20.0, 1e-9);
        assert_close(shortest_bearing_delta(10.0, 350.0), -20.0, 1e-9);
        assert_close(shortest_bearing_delta(0.0, 180.0), 180.0, 1e-9);
    }

    #[test]
    fn lerp_crosses_antimeridian() {
        let a = LngLat::new(170.0, 0.0);
        let b = LngLat::new(-170.0, 10.0);
        let mid = a.lerp(b, 0.5);
        assert_close(mid.lon.abs(), 180.0, 1e-9);
        assert_close(mid.lat, 5.0, 1e-9);
    }

    #[test]
    fn longitude_wraps() {
        assert_close(wrap_longitude(190.0), -170.0, 1e-9);
        assert_close(wrap_longitude(-3.7038), -3.7038, 1e-12);
    }

    proptest! {
        #[test]
        fn normalized_bearing_is_in_range(deg in -1.0e6f64..1.0e6) {
            let b = normalize_bearing(deg);
            prop_assert!((0.0..360.0).contains(&b));
        }
    }
}
