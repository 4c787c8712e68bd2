#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// Animation time in milliseconds.
///
/// Timestamps, durations, and offsets all use this unit.
pub type Millis = i64;

/// Start time meaning "start when the first frame is requested".
pub const START_ON_FIRST_FRAME: Millis = -1;

/// Start time of a cancelled animation.
pub const CANCELED: Millis = Millis::MIN;

/// A monotonic millisecond clock.
///
/// All animations driven together should read the same clock, so that their start times are
/// comparable.
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    origin: Instant,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created.
    pub fn now(&self) -> Millis {
        self.at(Instant::now())
    }

    /// Milliseconds between the clock's creation and `instant`, 0 if `instant` is earlier.
    pub fn at(&self, instant: Instant) -> Millis {
        let elapsed = instant.saturating_duration_since(self.origin);
        Millis::try_from(elapsed.as_millis()).unwrap_or(Millis::MAX)
    }
}
