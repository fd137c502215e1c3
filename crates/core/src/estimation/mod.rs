//! Target estimation for neighbour following
//!
//! Two interchangeable strategies turn the last received neighbour state into
//! a waypoint for the current time:
//!
//! - [`DeadReckoning`]: `position + velocity * elapsed`
//! - [`KalmanPredictor`]: 4-state constant-velocity filter on the horizontal
//!   plane, corrected only when a new neighbour message arrives
//!
//! [`TargetPredictor`] wraps both behind one type so the navigation task can
//! hold either without allocation.

pub mod dead_reckoning;
pub mod kalman;

use nalgebra::Vector3;

pub use dead_reckoning::DeadReckoning;
pub use kalman::{KalmanConfig, KalmanPredictor, KalmanState};

/// Last known state of the followed neighbour, in the local NED frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborState {
    /// Position in metres
    pub position: Vector3<f32>,
    /// Velocity in m/s
    pub velocity: Vector3<f32>,
    /// Local clock (ms) when the message carrying this state arrived
    pub time_received_ms: u32,
}

impl NeighborState {
    pub fn new(position: Vector3<f32>, velocity: Vector3<f32>, time_received_ms: u32) -> Self {
        Self {
            position,
            velocity,
            time_received_ms,
        }
    }
}

impl Default for NeighborState {
    fn default() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros(), 0)
    }
}

/// Output of a target estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEstimate {
    /// Estimated target position at the current time
    pub waypoint: Vector3<f32>,
    /// Distance between own position and the neighbour, in metres
    pub distance_to_target: f32,
}

/// Strategy producing a target position from a neighbour state.
pub trait TargetEstimator {
    /// Estimate the target position at `now_ms`.
    fn estimate(
        &mut self,
        neighbor: &NeighborState,
        own_position: &Vector3<f32>,
        now_ms: u32,
    ) -> TargetEstimate;

    /// Drop any internal state.
    fn reset(&mut self);
}

/// Selectable estimation strategy (`TRK_ESTIMATOR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    DeadReckoning = 0,
    Kalman = 1,
}

impl EstimatorKind {
    /// Parameter encoding; unknown values fall back to dead reckoning.
    pub fn from_param(value: i32) -> Self {
        match value {
            1 => EstimatorKind::Kalman,
            _ => EstimatorKind::DeadReckoning,
        }
    }
}

/// Either estimator, chosen at configuration time
#[derive(Debug, Clone)]
pub enum TargetPredictor {
    DeadReckoning(DeadReckoning),
    Kalman(KalmanPredictor),
}

impl TargetPredictor {
    /// Build the strategy selected by `kind`.
    pub fn new(kind: EstimatorKind, kalman: KalmanConfig) -> Self {
        match kind {
            EstimatorKind::DeadReckoning => TargetPredictor::DeadReckoning(DeadReckoning::new()),
            EstimatorKind::Kalman => TargetPredictor::Kalman(KalmanPredictor::new(kalman)),
        }
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            TargetPredictor::DeadReckoning(_) => EstimatorKind::DeadReckoning,
            TargetPredictor::Kalman(_) => EstimatorKind::Kalman,
        }
    }
}

impl TargetEstimator for TargetPredictor {
    fn estimate(
        &mut self,
        neighbor: &NeighborState,
        own_position: &Vector3<f32>,
        now_ms: u32,
    ) -> TargetEstimate {
        match self {
            TargetPredictor::DeadReckoning(e) => e.estimate(neighbor, own_position, now_ms),
            TargetPredictor::Kalman(e) => e.estimate(neighbor, own_position, now_ms),
        }
    }

    fn reset(&mut self) {
        match self {
            TargetPredictor::DeadReckoning(e) => e.reset(),
            TargetPredictor::Kalman(e) => e.reset(),
        }
    }
}

/// Milliseconds from `since_ms` to `now_ms` on a wrapping 32-bit clock.
///
/// A timestamp slightly in the future (clock skew between the message stamp
/// and the local clock) yields zero rather than a huge wrapped value.
pub fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    let delta = now_ms.wrapping_sub(since_ms);
    if (delta as i32) < 0 {
        0
    } else {
        delta
    }
}
