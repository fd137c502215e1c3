//! Mock Platform implementation for testing

use crate::platform::traits::{Peripherals, Platform};

use super::{
    MockActuators, MockBarometer, MockBattery, MockGps, MockImu, MockLed, MockSimulation,
    MockStabiliser,
};

/// Mock Platform implementation
///
/// Provides mock peripheral implementations for hardware-free testing.
///
/// # Example
///
/// ```
/// use flockpilot::platform::mock::MockPlatform;
///
/// let peripherals = MockPlatform::peripherals();
/// assert_eq!(peripherals.actuators.writes(), 0);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MockPlatform;

impl MockPlatform {
    /// Healthy mock drivers with default samples
    pub fn peripherals() -> Peripherals<MockPlatform> {
        Peripherals {
            imu: MockImu::default(),
            gps: MockGps::default(),
            barometer: MockBarometer::default(),
            battery: MockBattery::default(),
            stabiliser: MockStabiliser::new(),
            actuators: MockActuators::new(),
            led: MockLed::new(),
        }
    }
}

impl Platform for MockPlatform {
    type Imu = MockImu;
    type Gps = MockGps;
    type Barometer = MockBarometer;
    type Battery = MockBattery;
    type Stabiliser = MockStabiliser;
    type Actuators = MockActuators;
    type Led = MockLed;
    type Simulation = MockSimulation;
}
