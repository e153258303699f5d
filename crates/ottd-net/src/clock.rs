//! Time abstraction decoupling session logic from wall-clock time, so the
//! same [`Session`](crate::Session) code drives both a real Tokio runtime
//! and a deterministic `turmoil` simulation.

use std::{ops::Sub, time::Duration};

/// A source of monotonic time.
///
/// Mirrors the subset of a fuller environment abstraction this crate
/// actually needs: sessions only ever ask "what time is it", never for
/// randomness or sleep (those stay with the driver, not the state machine).
pub trait Clock: Clone + Send + Sync + 'static {
    /// The instant type this clock produces. Production clocks use
    /// [`std::time::Instant`]; simulation clocks use virtual time.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// The current time. Must never go backwards within one execution.
    fn now(&self) -> Self::Instant;
}

/// A [`Clock`] backed by the system's monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }
}
