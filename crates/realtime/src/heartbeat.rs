//! Heartbeat probe bookkeeping.

use std::time::Duration;

/// Tracks the probe currently awaiting its echo.
///
/// The connection task owns the clock and the socket; this type only matches
/// pongs to probes. At most one probe is outstanding: a new probe is begun
/// only after the previous send settled, and `begin_probe` supersedes any
/// probe whose pong never arrived.
#[derive(Debug)]
pub struct HeartbeatTimer {
    interval: Duration,
    outstanding: Option<u64>,
}

impl HeartbeatTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            outstanding: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn has_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Mark a probe carrying `now_ms` as outstanding and return its sample.
    pub fn begin_probe(&mut self, now_ms: u64) -> u64 {
        self.outstanding = Some(now_ms);
        now_ms
    }

    /// Match an echoed sample against the outstanding probe.
    ///
    /// Returns the round trip for a matching echo; stale or unsolicited
    /// echoes yield `None` and leave the outstanding probe untouched.
    pub fn record_pong(&mut self, echoed: u64, now_ms: u64) -> Option<Duration> {
        match self.outstanding {
            Some(sample) if sample == echoed => {
                self.outstanding = None;
                Some(Duration::from_millis(now_ms.saturating_sub(sample)))
            }
            _ => None,
        }
    }

    /// Forget the outstanding probe. Called when the socket goes away so a
    /// pong from a dead connection cannot count against a future one.
    pub fn disarm(&mut self) {
        self.outstanding = None;
    }
}
