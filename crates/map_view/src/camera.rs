use foundation::geo::{LngLat, normalize_bearing};

/// Snapshot of the external map camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub center: LngLat,
    pub zoom: f64,
    /// Degrees clockwise from north, always in `[0, 360)`.
    pub bearing: f64,
}

impl CameraView {
    pub fn new(center: LngLat, zoom: f64, bearing: f64) -> Self {
        Self {
            center: center.normalized(),
            zoom: if zoom.is_finite() { zoom.max(0.0) } else { 0.0 },
            bearing: normalize_bearing(bearing),
        }
    }

    pub fn with_bearing(self, bearing: f64) -> Self {
        Self {
            bearing: normalize_bearing(bearing),
            ..self
        }
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self::new(LngLat::new(0.0, 0.0), 0.0, 0.0)
    }
}
