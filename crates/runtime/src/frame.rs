use foundation::time::Time;

/// Deterministic frame metadata.
///
/// This is the timebase for the animation loop. Frames advance by a fixed
/// number of milliseconds so a recorded run replays exactly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed frame length in milliseconds.
    pub dt_ms: u64,
    /// Timeline time at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_ms: u64) -> Self {
        Self {
            index,
            dt_ms,
            time: Time(index.saturating_mul(dt_ms)),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_ms)
    }
}
