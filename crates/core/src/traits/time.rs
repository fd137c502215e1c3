//! Time abstraction for the scheduler and the estimators.
//!
//! The scheduler, the Kalman predictor and the PID corrector all read a
//! monotonic clock. `TimeSource` hides where that clock comes from so the
//! same code runs against the Embassy time driver on the vehicle and against
//! `MockTime` on the host.

use core::cell::Cell;

/// Monotonic clock used by the scheduler and the estimators.
///
/// # Example
///
/// ```
/// use flockpilot_core::traits::{MockTime, TimeSource};
///
/// fn due<T: TimeSource>(time: &T, deadline_us: u64) -> bool {
///     time.now_us() >= deadline_us
/// }
///
/// let time = MockTime::new();
/// assert!(!due(&time, 4_000));
/// time.advance(4_000);
/// assert!(due(&time, 4_000));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Microseconds since system start.
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `reference_us`, saturating at zero.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Host-side clock that only moves when told to.
///
/// Share it by reference (`&MockTime` is itself a `TimeSource`) when a test
/// needs to advance time from inside a running task, e.g. to inject
/// execution jitter.
///
/// ```
/// use flockpilot_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance(1_500);
/// assert_eq!(time.now_us(), 1_500);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used from single-threaded host tests. The
// Send + Sync bounds on TimeSource exist for embedded time drivers.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Clock starting at `us`.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Move forward by `us`.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Move forward by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1_000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1_000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_starts_at_zero() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(4_000_000);
        assert_eq!(time.now_ms(), 4_000);
    }

    #[test]
    fn mock_time_advance_ms() {
        let time = MockTime::new();
        time.advance_ms(500);
        assert_eq!(time.now_us(), 500_000);
    }

    #[test]
    fn elapsed_since_saturates() {
        let time = MockTime::with_initial(1_000);
        assert_eq!(time.elapsed_since(400), 600);
        assert_eq!(time.elapsed_since(5_000), 0);
    }

    #[test]
    fn reference_shares_the_clock() {
        let time = MockTime::new();
        let shared = &time;
        time.advance(250);
        assert_eq!(shared.now_us(), 250);
        assert_eq!(shared.elapsed_since(50), 200);
    }
}
