//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform capabilities
//! that can be used for host testing without actual hardware. It is always
//! compiled so integration tests and host tools can use it too.
//!
//! # Example
//!
//! ```
//! use flockpilot::platform::mock::{MockImu, MockPlatform};
//! use flockpilot::flockpilot_core::sensors::{SensorDriver, SensorError};
//!
//! let mut peripherals = MockPlatform::peripherals();
//! assert!(peripherals.imu.update().is_ok());
//!
//! peripherals.imu.set_fault(Some(SensorError::Timeout));
//! assert_eq!(peripherals.imu.update(), Err(SensorError::Timeout));
//! ```

mod actuator;
mod led;
mod platform;
mod sensors;
mod simulation;

pub use actuator::{MockActuators, MockStabiliser};
pub use led::MockLed;
pub use platform::MockPlatform;
pub use sensors::{
    MockBarometer, MockBattery, MockGps, MockImu, MockSensor, MOCK_SCRIPT_LEN,
};
pub use simulation::MockSimulation;
