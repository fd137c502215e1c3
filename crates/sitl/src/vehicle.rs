//! Lightweight point-mass vehicle model.
//!
//! Built-in kinematics with no external simulator, suitable for CI and HIL
//! runs on the host. Servo channels 0..2 are read as a velocity demand in the
//! local NED frame and channel 3 as a yaw-rate demand. The vehicle reaches
//! the demand through a first-order lag. Sensors are synthesized from the
//! state with configurable Gaussian noise and a deterministic seed.

use flockpilot_core::actuator::{ActuatorOutput, ServoCommand};
use flockpilot_core::sensors::{BarometerSample, GpsSample, ImuSample, Simulation};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimulatorError;

const GRAVITY_MSS: f32 = 9.81;
const SEA_LEVEL_PA: f32 = 101_325.0;

/// Configuration for the lightweight model.
#[derive(Debug, Clone)]
pub struct LightweightConfig {
    /// Speed at full servo deflection (m/s)
    pub max_speed: f32,
    /// Yaw rate at full deflection of channel 3 (rad/s)
    pub max_yaw_rate: f32,
    /// Velocity response time constant (s)
    pub velocity_time_constant: f32,
    /// GPS position noise standard deviation (m)
    pub gps_noise_m: f32,
    /// GPS update rate (Hz)
    pub gps_rate_hz: u32,
    /// Accelerometer noise standard deviation (m/s²)
    pub accel_noise_mss: f32,
    /// Gyroscope noise standard deviation (rad/s)
    pub gyro_noise_rads: f32,
    /// Barometer noise standard deviation (Pa)
    pub baro_noise_pa: f32,
    /// Air temperature reported by the barometer (°C)
    pub temperature_c: f32,
    /// RNG seed for deterministic runs. None = random.
    pub seed: Option<u64>,
    /// Simulation step size in microseconds.
    pub step_size_us: u64,
}

impl Default for LightweightConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_yaw_rate: 1.0,
            velocity_time_constant: 0.3,
            gps_noise_m: 0.5,
            gps_rate_hz: 10,
            accel_noise_mss: 0.1,
            gyro_noise_rads: 0.01,
            baro_noise_pa: 2.0,
            temperature_c: 20.0,
            seed: None,
            step_size_us: 4_000, // 250 Hz, one stabilisation tick
        }
    }
}

impl LightweightConfig {
    /// Noise-free configuration with a fixed seed.
    pub fn deterministic(seed: u64) -> Self {
        Self {
            gps_noise_m: 0.0,
            accel_noise_mss: 0.0,
            gyro_noise_rads: 0.0,
            baro_noise_pa: 0.0,
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.step_size_us == 0 {
            return Err(SimulatorError::InvalidStep(self.step_size_us));
        }
        if self.max_speed.is_nan() || self.max_speed <= 0.0 {
            return Err(SimulatorError::InvalidConfig("max_speed must be positive"));
        }
        if self.velocity_time_constant < 0.0 {
            return Err(SimulatorError::InvalidConfig(
                "velocity_time_constant must not be negative",
            ));
        }
        let noise = [
            self.gps_noise_m,
            self.accel_noise_mss,
            self.gyro_noise_rads,
            self.baro_noise_pa,
        ];
        if noise.iter().any(|n| n.is_nan() || *n < 0.0) {
            return Err(SimulatorError::InvalidConfig("noise must not be negative"));
        }
        Ok(())
    }

    fn dt(&self) -> f32 {
        self.step_size_us as f32 / 1_000_000.0
    }
}

#[derive(Debug, Clone)]
struct ModelState {
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    prev_velocity: Vector3<f32>,
    /// Heading in radians from north, clockwise
    yaw: f32,
    yaw_rate: f32,
    velocity_demand: Vector3<f32>,
    yaw_rate_demand: f32,
}

impl ModelState {
    fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            prev_velocity: Vector3::zeros(),
            yaw: 0.0,
            yaw_rate: 0.0,
            velocity_demand: Vector3::zeros(),
            yaw_rate_demand: 0.0,
        }
    }
}

/// Point-mass vehicle driven by servo commands.
pub struct LightweightVehicle {
    config: LightweightConfig,
    state: ModelState,
    rng: StdRng,
    last_fix: Option<GpsSample>,
    sim_time_us: u64,
    step_count: u64,
    commands: u64,
}

impl LightweightVehicle {
    pub fn new(config: LightweightConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let rng = seeded(config.seed);
        Ok(Self {
            config,
            state: ModelState::at(Vector3::zeros()),
            rng,
            last_fix: None,
            sim_time_us: 0,
            step_count: 0,
            commands: 0,
        })
    }

    /// Restart at `position`, at rest, with the RNG reseeded.
    pub fn reset(&mut self, position: Vector3<f32>) {
        self.state = ModelState::at(position);
        self.rng = seeded(self.config.seed);
        self.last_fix = None;
        self.sim_time_us = 0;
        self.step_count = 0;
        self.commands = 0;
    }

    /// Advance the model by one configured step.
    pub fn step(&mut self) {
        let dt = self.config.dt();
        let tau = self.config.velocity_time_constant;
        let alpha = dt / (tau + dt);

        let s = &mut self.state;
        s.prev_velocity = s.velocity;
        s.velocity += (s.velocity_demand - s.velocity) * alpha;
        s.position += s.velocity * dt;
        s.yaw_rate += (s.yaw_rate_demand - s.yaw_rate) * alpha;
        s.yaw = normalize_angle(s.yaw + s.yaw_rate * dt);

        self.sim_time_us += self.config.step_size_us;
        self.step_count += 1;
    }

    /// Advance by whole steps covering `duration_us`.
    pub fn step_for(&mut self, duration_us: u64) {
        let steps = duration_us / self.config.step_size_us;
        for _ in 0..steps {
            self.step();
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.state.position
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.state.velocity
    }

    pub fn yaw(&self) -> f32 {
        self.state.yaw
    }

    pub fn sim_time_us(&self) -> u64 {
        self.sim_time_us
    }

    /// Number of servo commands received
    pub fn commands(&self) -> u64 {
        self.commands
    }

    pub fn config(&self) -> &LightweightConfig {
        &self.config
    }

    /// Generate Gaussian noise using Box-Muller transform.
    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen::<f32>().max(f32::EPSILON);
        let u2: f32 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        z * stddev
    }

    fn noise_vector(&mut self, stddev: f32) -> Vector3<f32> {
        Vector3::new(
            self.gaussian_noise(stddev),
            self.gaussian_noise(stddev),
            self.gaussian_noise(stddev),
        )
    }

    fn gps_due(&self) -> bool {
        if self.config.gps_rate_hz == 0 {
            return false;
        }
        let step_us = self.config.step_size_us * u64::from(self.config.gps_rate_hz);
        let steps_per_fix = 1_000_000 / step_us;
        self.step_count.is_multiple_of(steps_per_fix.max(1))
    }
}

impl Simulation for LightweightVehicle {
    fn simulate_imu(&mut self) -> ImuSample {
        let dt = self.config.dt();
        let accel = (self.state.velocity - self.state.prev_velocity) / dt
            + Vector3::new(0.0, 0.0, -GRAVITY_MSS)
            + self.noise_vector(self.config.accel_noise_mss);
        let gyro = Vector3::new(0.0, 0.0, self.state.yaw_rate)
            + self.noise_vector(self.config.gyro_noise_rads);
        // Horizontal field towards magnetic north, seen from the body frame
        let yaw = self.state.yaw;
        let mag = Vector3::new(yaw.cos(), -yaw.sin(), 0.0);

        ImuSample { gyro, accel, mag }
    }

    /// Rate-limited fix; between updates the previous fix is repeated.
    fn simulate_gps(&mut self) -> GpsSample {
        if let (false, Some(fix)) = (self.gps_due(), self.last_fix) {
            return fix;
        }
        let noise = self.noise_vector(self.config.gps_noise_m);
        let fix = GpsSample {
            position: self.state.position + noise,
            velocity: self.state.velocity,
            satellites: 12,
            fix: true,
        };
        self.last_fix = Some(fix);
        fix
    }

    fn simulate_barometer(&mut self) -> BarometerSample {
        // NED: altitude is up
        let altitude_m = -self.state.position.z;
        let noise = self.gaussian_noise(self.config.baro_noise_pa);
        let pressure_pa = isa_pressure(altitude_m) + noise;
        BarometerSample {
            pressure_pa,
            temperature_c: self.config.temperature_c,
            altitude_m,
            vario_vz: -self.state.velocity.z,
        }
    }
}

impl ActuatorOutput for LightweightVehicle {
    fn write(&mut self, command: &ServoCommand) {
        let c = command.sanitized().channels;
        let max_speed = self.config.max_speed;
        self.state.velocity_demand = Vector3::new(c[0], c[1], c[2]) * max_speed;
        self.state.yaw_rate_demand = c[3] * self.config.max_yaw_rate;
        self.commands += 1;
    }
}

impl std::fmt::Debug for LightweightVehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightweightVehicle")
            .field("position", &self.state.position)
            .field("velocity", &self.state.velocity)
            .field("sim_time_us", &self.sim_time_us)
            .finish()
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// International standard atmosphere, troposphere only.
fn isa_pressure(altitude_m: f32) -> f32 {
    SEA_LEVEL_PA * (1.0 - 2.255_77e-5 * altitude_m).powf(5.255_88)
}

/// Normalize angle to [-pi, pi].
fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * std::f32::consts::PI);
    if a > std::f32::consts::PI {
        a -= 2.0 * std::f32::consts::PI;
    } else if a < -std::f32::consts::PI {
        a += 2.0 * std::f32::consts::PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> LightweightVehicle {
        LightweightVehicle::new(LightweightConfig::deterministic(42)).unwrap()
    }

    #[test]
    fn test_rejects_zero_step() {
        let config = LightweightConfig {
            step_size_us: 0,
            ..LightweightConfig::deterministic(1)
        };
        assert!(matches!(
            LightweightVehicle::new(config),
            Err(SimulatorError::InvalidStep(0))
        ));
    }

    #[test]
    fn test_rejects_negative_noise() {
        let config = LightweightConfig {
            gps_noise_m: -1.0,
            ..LightweightConfig::deterministic(1)
        };
        assert!(matches!(
            LightweightVehicle::new(config),
            Err(SimulatorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_velocity_converges_to_demand() {
        let mut v = vehicle();
        v.write(&ServoCommand::new([0.5, 0.0, 0.0, 0.0]));
        // 3 s, ten time constants
        v.step_for(3_000_000);

        assert!((v.velocity().x - 2.5).abs() < 0.01);
        assert!(v.velocity().y.abs() < 1.0e-6);
        assert!(v.position().x > 0.0);
    }

    #[test]
    fn test_gps_is_rate_limited() {
        let mut v = vehicle();
        v.write(&ServoCommand::new([1.0, 0.0, 0.0, 0.0]));

        let first = v.simulate_gps();
        v.step();
        // 10 Hz at 4 ms steps: a new fix every 25 steps
        assert_eq!(v.simulate_gps(), first);
        for _ in 0..24 {
            v.step();
        }
        assert!(v.simulate_gps().position.x > first.position.x);
    }

    #[test]
    fn test_barometer_tracks_altitude() {
        let mut v = vehicle();
        let ground = v.simulate_barometer();
        assert!((ground.pressure_pa - SEA_LEVEL_PA).abs() < 0.5);

        v.reset(Vector3::new(0.0, 0.0, -100.0));
        let high = v.simulate_barometer();
        assert!((high.altitude_m - 100.0).abs() < 1.0e-4);
        // About 12 Pa per metre near sea level
        assert!((ground.pressure_pa - high.pressure_pa - 1_200.0).abs() < 20.0);
    }

    #[test]
    fn test_normalize_angle() {
        let tau = 2.0 * std::f32::consts::PI;
        assert!((normalize_angle(tau + 0.5) - 0.5).abs() < 1e-5);
        assert!((normalize_angle(-4.0) - (tau - 4.0)).abs() < 1e-5);
        assert_eq!(normalize_angle(1.0), 1.0);
    }
}
