//! Platform abstraction traits
//!
//! Sensor, actuator and simulation capabilities live in `flockpilot_core`;
//! this module bundles them per board and adds the status LED.

pub mod led;
pub mod platform;

pub use led::StatusLed;
pub use platform::{Peripherals, Platform};
