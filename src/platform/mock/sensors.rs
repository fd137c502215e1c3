//! Mock sensor drivers for testing
//!
//! A mock sensor returns scripted results in sequence, then its default
//! sample. A forced fault overrides both.

use flockpilot_core::sensors::{
    BarometerSample, BatterySample, GpsSample, ImuSample, SensorDriver, SensorError,
};
use heapless::Deque;

/// Maximum number of scripted results
pub const MOCK_SCRIPT_LEN: usize = 16;

/// Scripted sensor driver
#[derive(Debug, Clone)]
pub struct MockSensor<T: Copy> {
    /// Results to return before falling back to the default
    script: Deque<Result<T, SensorError>, MOCK_SCRIPT_LEN>,

    /// Sample returned when the script is empty
    default_sample: T,

    /// Forced failure (for testing error handling)
    fault: Option<SensorError>,

    /// Number of `update` calls
    reads: u32,
}

pub type MockImu = MockSensor<ImuSample>;
pub type MockGps = MockSensor<GpsSample>;
pub type MockBarometer = MockSensor<BarometerSample>;
pub type MockBattery = MockSensor<BatterySample>;

impl<T: Copy> MockSensor<T> {
    /// Sensor that always returns `default_sample`
    pub fn new(default_sample: T) -> Self {
        Self {
            script: Deque::new(),
            default_sample,
            fault: None,
            reads: 0,
        }
    }

    /// Sensor returning `script` first (truncated to [`MOCK_SCRIPT_LEN`])
    pub fn with_script(default_sample: T, script: &[Result<T, SensorError>]) -> Self {
        let mut sensor = Self::new(default_sample);
        for result in script.iter().take(MOCK_SCRIPT_LEN) {
            let _ = sensor.script.push_back(*result);
        }
        sensor
    }

    /// Set the sample returned when the script is empty
    pub fn set_default(&mut self, sample: T) {
        self.default_sample = sample;
    }

    /// Append a scripted result
    pub fn push(&mut self, result: Result<T, SensorError>) -> Result<(), Result<T, SensorError>> {
        self.script.push_back(result)
    }

    /// Force every read to fail with `fault` (`None` restores normal reads)
    pub fn set_fault(&mut self, fault: Option<SensorError>) {
        self.fault = fault;
    }

    /// Number of reads so far
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl<T: Copy + Default> Default for MockSensor<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy> SensorDriver for MockSensor<T> {
    type Sample = T;

    fn update(&mut self) -> Result<T, SensorError> {
        self.reads += 1;
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        self.script.pop_front().unwrap_or(Ok(self.default_sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_default() {
        let full = BatterySample { voltage: 12.6 };
        let mut battery = MockBattery::with_script(
            full,
            &[Ok(BatterySample { voltage: 11.0 }), Err(SensorError::BusFault)],
        );

        assert_eq!(battery.update(), Ok(BatterySample { voltage: 11.0 }));
        assert_eq!(battery.update(), Err(SensorError::BusFault));
        assert_eq!(battery.update(), Ok(full));
        assert_eq!(battery.update(), Ok(full));
        assert_eq!(battery.reads(), 4);
    }

    #[test]
    fn test_forced_fault() {
        let mut baro = MockBarometer::default();
        baro.set_fault(Some(SensorError::Timeout));
        assert_eq!(baro.update(), Err(SensorError::Timeout));

        baro.set_fault(None);
        assert!(baro.update().is_ok());
    }

    #[test]
    fn test_script_is_bounded() {
        let script = [Ok(BatterySample { voltage: 1.0 }); MOCK_SCRIPT_LEN + 4];
        let mut battery = MockBattery::with_script(BatterySample::default(), &script);
        assert!(battery.push(Ok(BatterySample::default())).is_err());
        for _ in 0..MOCK_SCRIPT_LEN {
            assert_eq!(battery.update(), Ok(BatterySample { voltage: 1.0 }));
        }
        assert_eq!(battery.update(), Ok(BatterySample::default()));
    }
}
