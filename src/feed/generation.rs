/// Monotonic request generation for one view.
///
/// A request records the generation current when it started; its response
/// may only be written while that generation is still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    /// Invalidates every request started so far and returns the new value.
    pub fn bump(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    pub fn current(self) -> u64 {
        self.0
    }

    pub fn is_current(self, started_at: u64) -> bool {
        self.0 == started_at
    }
}
