/// Engine time in whole milliseconds since the session timeline started.
///
/// Integer milliseconds keep timer arithmetic exact, so a timer due at
/// `3000` fires on the same frame on every run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn from_ms(ms: u64) -> Self {
        Time(ms)
    }

    pub fn as_ms(&self) -> u64 {
        self.0
    }

    pub fn after(self, delay_ms: u64) -> Self {
        Time(self.0.saturating_add(delay_ms))
    }

    /// Milliseconds elapsed from `earlier` to `self`, or 0 if `earlier` is later.
    pub fn since(self, earlier: Time) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
