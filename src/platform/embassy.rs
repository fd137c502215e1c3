//! Embassy glue for embedded targets
//!
//! Only compiled with the `embedded` feature.

use flockpilot_core::traits::TimeSource;

/// Embassy-based time source using the Embassy time driver.
///
/// This implementation uses `embassy_time::Instant` for high-resolution
/// timing on embedded targets with Embassy async runtime.
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
