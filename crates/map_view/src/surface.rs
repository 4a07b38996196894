use crate::camera::CameraView;

/// The map-rendering capability the animation controller drives.
///
/// Implementations own the actual camera and marker set. `set_camera` is a
/// command, not a query: with a non-zero duration the camera moves there over
/// time and settles after `duration_ms`; with zero it jumps and cancels any
/// flight in progress.
pub trait MapSurface {
    fn camera(&self) -> CameraView;

    fn set_camera(&mut self, view: CameraView, duration_ms: u64);

    fn set_markers_visible(&mut self, visible: bool);

    /// Advances any in-flight camera motion by one frame.
    fn update(&mut self, _dt_ms: u64) {}
}

impl<M: MapSurface + ?Sized> MapSurface for Box<M> {
    fn camera(&self) -> CameraView {
        (**self).camera()
    }

    fn set_camera(&mut self, view: CameraView, duration_ms: u64) {
        (**self).set_camera(view, duration_ms)
    }

    fn set_markers_visible(&mut self, visible: bool) {
        (**self).set_markers_visible(visible)
    }

    fn update(&mut self, dt_ms: u64) {
        (**self).update(dt_ms)
    }
}
