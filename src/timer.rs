//! Single-shot timer abstraction.
//!
//! The engine needs exactly one timer: a per-chunk ACK timeout that
//! fires once after a configured delay unless restarted or cancelled
//! first. It is abstracted behind a trait, per the design note
//! requiring the engine to be testable against a virtual clock rather
//! than wall-clock time.
//!
//! The engine drives this trait synchronously: it arms/disarms the
//! timer with [`Timer::start`]/[`Timer::stop`], and a driver (the
//! facade in production, the test harness in `#[cfg(test)]`) calls
//! [`Timer::poll_expired`] from its event loop to detect and consume a
//! firing. A facade that wants true "on_fire" callback delivery wires
//! its own OS timer/thread to call that poll at the right moment; the
//! engine itself never blocks waiting on it.

use std::time::Duration;

/// A single-shot timer, restartable and cancellable.
///
/// Implementations are not required to be thread-safe; the engine
/// drives its timer from the same single-threaded event loop that
/// services the serial port (§5).
pub trait Timer {
    /// (Re)starts the timer so it fires after `duration`. Calling this
    /// while already running discards the previous deadline.
    fn start(&mut self, duration: Duration);

    /// Cancels any pending firing. A no-op if not running.
    fn stop(&mut self);

    /// Returns true if the timer is currently armed.
    fn is_running(&self) -> bool;

    /// If armed and its deadline has passed, disarms the timer and
    /// returns true (the firing is consumed). Otherwise returns false.
    fn poll_expired(&mut self) -> bool;
}

/// A timer driven by an explicit, manually-advanced clock.
///
/// This is the timer implementation used by this crate's own tests
/// (and recommended to any facade's test suite): time only passes when
/// [`ManualTimer::advance`] is called, so retransmission and timeout
/// behavior can be asserted deterministically without sleeping.
#[derive(Debug, Default)]
pub struct ManualTimer {
    deadline: Option<Duration>,
    now: Duration,
}

impl ManualTimer {
    /// Creates a timer with its clock at zero and nothing armed.
    pub fn new() -> Self {
        Self {
            deadline: None,
            now: Duration::ZERO,
        }
    }

    /// Advances the virtual clock by `by`.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Timer for ManualTimer {
    fn start(&mut self, duration: Duration) {
        self.deadline = Some(self.now + duration);
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    fn poll_expired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A timer backed by the operating system's monotonic clock.
///
/// Suitable for a real facade driving the engine from, e.g., a poll
/// loop tick or a dedicated timer thread that calls [`Timer::poll_expired`].
#[derive(Debug, Default)]
pub struct SystemTimer {
    deadline: Option<std::time::Instant>,
}

impl SystemTimer {
    /// Creates a timer with nothing armed.
    pub fn new() -> Self {
        Self { deadline: None }
    }
}

impl Timer for SystemTimer {
    fn start(&mut self, duration: Duration) {
        self.deadline = Some(std::time::Instant::now() + duration);
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    fn poll_expired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if std::time::Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
