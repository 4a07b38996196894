/// Generational handle: `(index, generation)`.
///
/// The index names a reusable slot; the generation is bumped every time the
/// slot is recycled, so a handle that outlived its slot compares unequal to
/// the handle of the slot's next occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }

    /// The handle the same slot hands out after being recycled.
    pub fn next_generation(self) -> Self {
        Handle(self.0, self.1.wrapping_add(1))
    }
}
