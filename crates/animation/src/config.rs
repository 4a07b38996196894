use foundation::geo::LngLat;

/// Timing and framing of the generation animation. All fields have documented
/// defaults that are exercised by tests below.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Length of the fly-out to the global view, in milliseconds.
    pub zoom_out_ms: u64,
    /// Length of the fly-back to the saved view, in milliseconds.
    pub return_ms: u64,
    /// Bearing added on every rotation tick, in degrees.
    pub rotation_step_deg: f64,
    /// Center of the global view (slightly north of the equator).
    pub global_center: LngLat,
    /// Zoom of the global view; low enough to show the whole globe.
    pub global_zoom: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            zoom_out_ms: 3000,
            return_ms: 3000,
            rotation_step_deg: 0.2,
            global_center: LngLat::new(0.0, 20.0),
            global_zoom: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnimationConfig;

    #[test]
    fn defaults() {
        let c = AnimationConfig::default();
        assert_eq!(c.zoom_out_ms, 3000);
        assert_eq!(c.return_ms, 3000);
        assert_eq!(c.rotation_step_deg, 0.2);
        assert_eq!((c.global_center.lon, c.global_center.lat), (0.0, 20.0));
        assert_eq!(c.global_zoom, 1.5);
    }
}
