//! Write-flow control: tracks whether the transport has signaled backpressure,
//! and the 5-second watchdog that notices a stalled write is actually a dead
//! connection the transport hasn't reported yet.

use std::{ops::Sub, time::Duration};

/// How often a paused gate should be polled for a transport that silently
/// finished closing while writes were paused.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Tracks whether outbound writes are currently paused by transport
/// backpressure, and watches for a transport that closed while paused
/// without telling us.
#[derive(Debug, Clone, Copy)]
pub struct WriteGate<I> {
    paused_at: Option<I>,
}

impl<I> Default for WriteGate<I> {
    fn default() -> Self {
        Self { paused_at: None }
    }
}

impl<I> WriteGate<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// A gate that starts writable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether writes are currently allowed.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.paused_at.is_none()
    }

    /// The transport signaled backpressure; pause writes.
    pub fn pause(&mut self, now: I) {
        self.paused_at = Some(now);
    }

    /// The transport signaled it drained its buffer; resume writes.
    pub fn resume(&mut self) {
        self.paused_at = None;
    }

    /// Poll the gate while paused.
    ///
    /// If the transport reports it is closing and at least
    /// [`POLL_INTERVAL`] has elapsed since the pause began, resumes writes
    /// so the next write attempt discovers the closed transport — mirroring
    /// the source's rationale: a stalled peer can drop the connection
    /// without the write side ever being told.
    ///
    /// Returns whether this call resumed the gate.
    pub fn tick(&mut self, now: I, transport_closing: bool) -> bool {
        let Some(paused_at) = self.paused_at else { return false };
        if transport_closing && now - paused_at >= POLL_INTERVAL {
            tracing::warn!("forcing write-gate open after a closing transport stayed silent through the watchdog poll");
            self.resume();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn starts_writable() {
        let gate = WriteGate::<Instant>::new();
        assert!(gate.is_writable());
    }

    #[test]
    fn pause_blocks_writes_until_resumed() {
        let mut gate = WriteGate::<Instant>::new();
        let t0 = Instant::now();
        gate.pause(t0);
        assert!(!gate.is_writable());
        gate.resume();
        assert!(gate.is_writable());
    }

    #[test]
    fn tick_ignores_non_closing_transport() {
        let mut gate = WriteGate::<Instant>::new();
        let t0 = Instant::now();
        gate.pause(t0);
        let resumed = gate.tick(t0 + Duration::from_secs(30), false);
        assert!(!resumed);
        assert!(!gate.is_writable());
    }

    #[test]
    fn tick_resumes_after_poll_interval_when_closing() {
        let mut gate = WriteGate::<Instant>::new();
        let t0 = Instant::now();
        gate.pause(t0);
        assert!(!gate.tick(t0 + Duration::from_secs(4), true));
        assert!(gate.tick(t0 + Duration::from_secs(5), true));
        assert!(gate.is_writable());
    }
}
