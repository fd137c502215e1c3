//! Mock vehicle model for hardware-in-the-loop tests
//!
//! Returns fixed samples and records the servo commands it receives.

use flockpilot_core::actuator::{ActuatorOutput, ServoCommand};
use flockpilot_core::sensors::{BarometerSample, GpsSample, ImuSample, Simulation};

/// Fixed-output simulation sink
#[derive(Debug, Default)]
pub struct MockSimulation {
    /// Sample returned by `simulate_imu`
    pub imu: ImuSample,
    /// Sample returned by `simulate_gps`
    pub gps: GpsSample,
    /// Sample returned by `simulate_barometer`
    pub barometer: BarometerSample,
    sensor_reads: u32,
    writes: u32,
    last: Option<ServoCommand>,
}

impl MockSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of simulated sensor reads
    pub fn sensor_reads(&self) -> u32 {
        self.sensor_reads
    }

    /// Number of servo commands received
    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn last(&self) -> Option<&ServoCommand> {
        self.last.as_ref()
    }
}

impl Simulation for MockSimulation {
    fn simulate_imu(&mut self) -> ImuSample {
        self.sensor_reads += 1;
        self.imu
    }

    fn simulate_gps(&mut self) -> GpsSample {
        self.sensor_reads += 1;
        self.gps
    }

    fn simulate_barometer(&mut self) -> BarometerSample {
        self.sensor_reads += 1;
        self.barometer
    }
}

impl ActuatorOutput for MockSimulation {
    fn write(&mut self, command: &ServoCommand) {
        self.writes += 1;
        self.last = Some(*command);
    }
}
