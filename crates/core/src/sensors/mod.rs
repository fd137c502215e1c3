//! Sensor samples and the driver/simulation capabilities
//!
//! Drivers are polled from scheduler tasks. A failed read returns a
//! [`SensorError`]; the caller keeps the last good sample and counts the
//! fault. With HIL enabled the same tasks read from a [`Simulation`]
//! instead of the hardware.

use core::fmt;

use nalgebra::Vector3;

/// Inertial measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Angular rate (rad/s)
    pub gyro: Vector3<f32>,
    /// Specific force (m/s²)
    pub accel: Vector3<f32>,
    /// Magnetic field (normalized)
    pub mag: Vector3<f32>,
}

impl Default for ImuSample {
    fn default() -> Self {
        Self {
            gyro: Vector3::zeros(),
            accel: Vector3::new(0.0, 0.0, -9.81),
            mag: Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Position fix in the local NED frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsSample {
    /// Position (m)
    pub position: Vector3<f32>,
    /// Velocity (m/s)
    pub velocity: Vector3<f32>,
    /// Number of satellites used
    pub satellites: u8,
    /// A 3D fix is available
    pub fix: bool,
}

impl Default for GpsSample {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            satellites: 0,
            fix: false,
        }
    }
}

/// Barometer reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarometerSample {
    /// Static pressure (Pa)
    pub pressure_pa: f32,
    /// Sensor temperature (°C)
    pub temperature_c: f32,
    /// Pressure altitude (m)
    pub altitude_m: f32,
    /// Vertical speed (m/s, positive up)
    pub vario_vz: f32,
}

/// Battery reading from the analog monitor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatterySample {
    /// Pack voltage (V), 0.0 before the first conversion
    pub voltage: f32,
}

/// Sensor read failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Bus transaction failed
    BusFault,
    /// Device did not answer in time
    Timeout,
    /// Value outside the physically possible range
    Implausible,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::BusFault => write!(f, "sensor bus fault"),
            SensorError::Timeout => write!(f, "sensor timeout"),
            SensorError::Implausible => write!(f, "implausible sensor value"),
        }
    }
}

/// A polled sensor
pub trait SensorDriver {
    type Sample: Copy;

    /// Read one sample.
    fn update(&mut self) -> Result<Self::Sample, SensorError>;
}

/// Which simulated sensor to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Imu,
    Gps,
    Barometer,
}

/// A simulated sample, tagged by sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedSample {
    Imu(ImuSample),
    Gps(GpsSample),
    Barometer(BarometerSample),
}

/// Hardware-in-the-loop vehicle model
///
/// Substitutes the hardware reads while HIL is on; also receives the servo
/// command through [`ActuatorOutput`](crate::actuator::ActuatorOutput).
pub trait Simulation {
    fn simulate_imu(&mut self) -> ImuSample;
    fn simulate_gps(&mut self) -> GpsSample;
    fn simulate_barometer(&mut self) -> BarometerSample;

    /// Simulated sample of `kind`.
    fn simulate(&mut self, kind: SensorKind) -> SimulatedSample {
        match kind {
            SensorKind::Imu => SimulatedSample::Imu(self.simulate_imu()),
            SensorKind::Gps => SimulatedSample::Gps(self.simulate_gps()),
            SensorKind::Barometer => SimulatedSample::Barometer(self.simulate_barometer()),
        }
    }
}

/// Keeps the last good sample of one sensor and counts faults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorChannel<T: Copy> {
    last_good: Option<T>,
    faults: u32,
    last_error: Option<SensorError>,
}

impl<T: Copy> Default for SensorChannel<T> {
    fn default() -> Self {
        Self {
            last_good: None,
            faults: 0,
            last_error: None,
        }
    }
}

impl<T: Copy> SensorChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read. Errors leave the last good sample in place.
    pub fn record(&mut self, result: Result<T, SensorError>) -> Result<T, SensorError> {
        match result {
            Ok(sample) => {
                self.last_good = Some(sample);
                self.last_error = None;
            }
            Err(e) => {
                self.faults = self.faults.saturating_add(1);
                self.last_error = Some(e);
            }
        }
        result
    }

    /// Last good sample, `None` before the first success
    pub fn last_good(&self) -> Option<&T> {
        self.last_good.as_ref()
    }

    /// Number of failed reads
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Error of the latest read, cleared by the next success
    pub fn last_error(&self) -> Option<SensorError> {
        self.last_error
    }
}
