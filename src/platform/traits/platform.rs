//! Root platform trait
//!
//! This module defines the root Platform trait that names the concrete
//! driver type behind each capability the vehicle tasks use.

use flockpilot_core::actuator::ActuatorOutput;
use flockpilot_core::mode::Stabiliser;
use flockpilot_core::sensors::{
    BarometerSample, BatterySample, GpsSample, ImuSample, SensorDriver, Simulation,
};

use super::StatusLed;

/// Root platform trait
///
/// Platform implementations provide concrete types for each capability via
/// associated types, enabling zero-cost abstractions through compile-time
/// dispatch.
///
/// # Example
///
/// ```ignore
/// pub struct Rp2350Platform;
///
/// impl Platform for Rp2350Platform {
///     type Imu = Mpu9250<I2c0>;
///     type Gps = UbloxGps<Uart1>;
///     // ... other associated types
/// }
/// ```
pub trait Platform {
    /// Inertial measurement unit
    type Imu: SensorDriver<Sample = ImuSample>;

    /// GPS receiver
    type Gps: SensorDriver<Sample = GpsSample>;

    /// Barometer
    type Barometer: SensorDriver<Sample = BarometerSample>;

    /// Battery voltage monitor (ADC)
    type Battery: SensorDriver<Sample = BatterySample>;

    /// Attitude/rate control cascade
    type Stabiliser: Stabiliser;

    /// Servo outputs
    type Actuators: ActuatorOutput;

    /// Status LED
    type Led: StatusLed;

    /// Vehicle model used in hardware-in-the-loop mode
    type Simulation: Simulation + ActuatorOutput;
}

/// Driver instances of one platform, handed over to the task table
///
/// Each field is moved into exactly one task. In particular `actuators`
/// ends up inside the stabilisation task and nowhere else.
pub struct Peripherals<P: Platform> {
    pub imu: P::Imu,
    pub gps: P::Gps,
    pub barometer: P::Barometer,
    pub battery: P::Battery,
    pub stabiliser: P::Stabiliser,
    pub actuators: P::Actuators,
    pub led: P::Led,
}
