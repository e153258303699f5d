//! The simulation's [`Clock`]: virtual time driven by `turmoil`/Tokio's
//! paused clock rather than the wall clock, so watchdog timing is
//! deterministic under a fixed seed.

use ottd_net::Clock;

/// A [`Clock`] backed by Tokio's (possibly paused) time source.
///
/// Under a real executor this is wall-clock time. Under `turmoil`, Tokio's
/// clock is the thing `turmoil` itself advances deterministically, so this
/// type needs no simulation-specific state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock;

impl Clock for SimClock {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }
}
