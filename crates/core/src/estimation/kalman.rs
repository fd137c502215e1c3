//! Constant-velocity Kalman predictor
//!
//! State `x = [px, py, vx, vy]` on the horizontal plane. Altitude is never
//! filtered: the waypoint takes the neighbour's reported altitude directly.
//!
//! The filter is created lazily from the first neighbour message it sees and
//! then, on every call:
//!
//! 1. predicts forward by the clock delta since the previous call (skipped
//!    when that delta is not positive),
//! 2. corrects with the neighbour's position and velocity, but only when the
//!    neighbour timestamp differs from the last one consumed.

use nalgebra::{Matrix4, Vector3, Vector4};

use super::{NeighborState, TargetEstimate, TargetEstimator};

/// Filter tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanConfig {
    /// Bound on the neighbour's acceleration (m/s²), scales process noise
    pub max_acc: f32,
    /// Standard deviation of a position measurement (m)
    pub position_noise: f32,
    /// Standard deviation of a velocity measurement (m/s)
    pub velocity_noise: f32,
    /// Initial variance on every state component
    pub initial_variance: f32,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            max_acc: 10.0,
            position_noise: 1.0,
            velocity_noise: 0.5,
            initial_variance: 1.0,
        }
    }
}

/// Filter state, created on the first call.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanState {
    /// State estimate `[px, py, vx, vy]`
    pub estimate: Vector4<f32>,
    /// State covariance
    pub covariance: Matrix4<f32>,
    /// Process noise for the last prediction step
    pub process_noise: Matrix4<f32>,
    /// Measurement model (identity: position and velocity are measured)
    pub design: Matrix4<f32>,
    /// Clock (ms) of the last prediction
    pub last_update_ms: u32,
    /// Neighbour timestamp of the last measurement consumed
    pub last_measurement_ms: u32,
}

/// Kalman target estimator
#[derive(Debug, Clone)]
pub struct KalmanPredictor {
    config: KalmanConfig,
    state: Option<KalmanState>,
    corrections: u32,
}

impl KalmanPredictor {
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            config,
            state: None,
            corrections: 0,
        }
    }

    /// Filter state, `None` before the first call.
    pub fn state(&self) -> Option<&KalmanState> {
        self.state.as_ref()
    }

    /// Number of measurement updates applied so far.
    pub fn corrections(&self) -> u32 {
        self.corrections
    }

    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }

    fn measurement(neighbor: &NeighborState) -> Vector4<f32> {
        Vector4::new(
            neighbor.position.x,
            neighbor.position.y,
            neighbor.velocity.x,
            neighbor.velocity.y,
        )
    }

    fn initial_state(&self, neighbor: &NeighborState) -> KalmanState {
        KalmanState {
            estimate: Self::measurement(neighbor),
            covariance: Matrix4::identity() * self.config.initial_variance,
            process_noise: Matrix4::zeros(),
            design: Matrix4::identity(),
            last_update_ms: neighbor.time_received_ms,
            last_measurement_ms: neighbor.time_received_ms,
        }
    }

    fn measurement_noise(&self) -> Matrix4<f32> {
        let p = self.config.position_noise * self.config.position_noise;
        let v = self.config.velocity_noise * self.config.velocity_noise;
        Matrix4::from_diagonal(&Vector4::new(p, p, v, v))
    }
}

impl TargetEstimator for KalmanPredictor {
    fn estimate(
        &mut self,
        neighbor: &NeighborState,
        own_position: &Vector3<f32>,
        now_ms: u32,
    ) -> TargetEstimate {
        if self.state.is_none() {
            self.state = Some(self.initial_state(neighbor));
        }
        let r = self.measurement_noise();
        let max_acc = self.config.max_acc;

        let mut corrected = false;
        let distance_to_target = match self.state.as_mut() {
            Some(state) => {
                // Signed so that a clock going backwards reads as dt <= 0
                let dt = now_ms.wrapping_sub(state.last_update_ms) as i32 as f32 / 1_000.0;
                state.last_update_ms = now_ms;
                if dt > 0.0 {
                    state.process_noise = process_noise(max_acc, dt);
                    predict(state, dt);
                }

                let dx = state.estimate[0] - own_position.x;
                let dy = state.estimate[1] - own_position.y;
                let dz = neighbor.position.z - own_position.z;
                let distance = libm::sqrtf(dx * dx + dy * dy + dz * dz);

                if neighbor.time_received_ms != state.last_measurement_ms {
                    state.last_measurement_ms = neighbor.time_received_ms;
                    corrected = correct(state, &Self::measurement(neighbor), &r);
                }
                distance
            }
            None => 0.0,
        };
        if corrected {
            self.corrections = self.corrections.saturating_add(1);
        }

        let (px, py) = self
            .state
            .as_ref()
            .map(|s| (s.estimate[0], s.estimate[1]))
            .unwrap_or((neighbor.position.x, neighbor.position.y));

        TargetEstimate {
            waypoint: Vector3::new(px, py, neighbor.position.z),
            distance_to_target,
        }
    }

    fn reset(&mut self) {
        self.state = None;
        self.corrections = 0;
    }
}

/// Transition matrix for a constant-velocity model.
fn transition(dt: f32) -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, dt, 0.0, //
        0.0, 1.0, 0.0, dt, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Discrete white-noise acceleration model scaled by `max_acc²`.
fn process_noise(max_acc: f32, dt: f32) -> Matrix4<f32> {
    let q = max_acc * max_acc;
    let dt2 = dt * dt;
    let dt3 = dt2 * dt / 2.0;
    let dt4 = dt2 * dt2 / 4.0;
    Matrix4::new(
        dt4, 0.0, dt3, 0.0, //
        0.0, dt4, 0.0, dt3, //
        dt3, 0.0, dt2, 0.0, //
        0.0, dt3, 0.0, dt2,
    ) * q
}

fn predict(state: &mut KalmanState, dt: f32) {
    let f = transition(dt);
    state.estimate = f * state.estimate;
    state.covariance = f * state.covariance * f.transpose() + state.process_noise;
}

/// Measurement update. Returns false when the innovation covariance is
/// singular, leaving the prediction untouched.
fn correct(state: &mut KalmanState, z: &Vector4<f32>, r: &Matrix4<f32>) -> bool {
    let h = state.design;
    let innovation = z - h * state.estimate;
    let s = h * state.covariance * h.transpose() + r;
    let s_inv = match s.try_inverse() {
        Some(inv) => inv,
        None => return false,
    };
    let gain = state.covariance * h.transpose() * s_inv;
    state.estimate += gain * innovation;
    state.covariance = (Matrix4::identity() - gain * h) * state.covariance;
    true
}
