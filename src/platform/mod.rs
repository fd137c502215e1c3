//! Platform abstraction layer
//!
//! The vehicle tasks only see the capability traits of this module. A
//! board support crate implements [`Platform`] for its drivers; the mock
//! platform implements it for host tests.

pub mod traits;

#[cfg(feature = "embedded")]
pub mod embassy;

pub mod mock;

// Re-export commonly used types
pub use traits::{Peripherals, Platform, StatusLed};
