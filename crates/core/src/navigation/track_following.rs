//! Track following: estimate the neighbour's position, then trim it with PID
//!
//! The follower owns its estimator and one PID per horizontal axis. Each
//! update:
//!
//! 1. asks the estimator for the target position at the current time,
//! 2. optionally adds a PID correction on x and y, driven by the distance
//!    between the estimated target and our own position,
//! 3. copies the neighbour's reported altitude into the waypoint.

use nalgebra::Vector3;

use crate::control::{PidConfig, PidController};
use crate::estimation::{
    elapsed_ms, EstimatorKind, NeighborState, TargetEstimate, TargetEstimator, TargetPredictor,
};

/// Result of one track-following update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowOutput {
    /// Raw estimator output
    pub estimate: TargetEstimate,
    /// Waypoint handed to navigation (estimate plus trim)
    pub waypoint: Vector3<f32>,
    /// PID trim applied on x and y
    pub offset: [f32; 2],
}

impl FollowOutput {
    /// Distance to the followed neighbour, as reported by the estimator.
    pub fn distance_to_target(&self) -> f32 {
        self.estimate.distance_to_target
    }
}

/// Neighbour track follower
#[derive(Debug, Clone)]
pub struct TrackFollower {
    predictor: TargetPredictor,
    pid_x: PidController,
    pid_y: PidController,
    pid_trim: bool,
    last: Option<FollowOutput>,
}

impl TrackFollower {
    /// Follower with a given estimator and per-axis PID tuning.
    pub fn new(predictor: TargetPredictor, pid: PidConfig, pid_trim: bool) -> Self {
        Self {
            predictor,
            pid_x: PidController::new(pid),
            pid_y: PidController::new(pid),
            pid_trim,
            last: None,
        }
    }

    /// Compute the followed waypoint at `now_ms`.
    pub fn update(
        &mut self,
        neighbor: &NeighborState,
        own_position: &Vector3<f32>,
        now_ms: u32,
    ) -> FollowOutput {
        let estimate = self.predictor.estimate(neighbor, own_position, now_ms);
        let mut waypoint = estimate.waypoint;
        let mut offset = [0.0f32; 2];

        if self.pid_trim {
            offset[0] = self.pid_x.update(waypoint.x - own_position.x);
            offset[1] = self.pid_y.update(waypoint.y - own_position.y);
            waypoint.x += offset[0];
            waypoint.y += offset[1];
        }
        waypoint.z = neighbor.position.z;

        let output = FollowOutput {
            estimate,
            waypoint,
            offset,
        };
        self.last = Some(output);
        output
    }

    /// Last output, if any update ran.
    pub fn last_output(&self) -> Option<&FollowOutput> {
        self.last.as_ref()
    }

    /// Last reported distance, zero before the first update.
    pub fn distance_to_target(&self) -> f32 {
        self.last.map(|o| o.distance_to_target()).unwrap_or(0.0)
    }

    /// Active estimation strategy
    pub fn estimator_kind(&self) -> EstimatorKind {
        self.predictor.kind()
    }

    pub fn predictor(&self) -> &TargetPredictor {
        &self.predictor
    }

    pub fn pid_trim_enabled(&self) -> bool {
        self.pid_trim
    }

    /// Drop estimator and PID state.
    pub fn reset(&mut self) {
        self.predictor.reset();
        self.pid_x.reset();
        self.pid_y.reset();
        self.last = None;
    }
}

/// Time since the last neighbour message arrived.
pub fn elapsed_since_message_ms(neighbor: &NeighborState, now_ms: u32) -> u32 {
    elapsed_ms(now_ms, neighbor.time_received_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::KalmanConfig;

    fn scenario() -> NeighborState {
        NeighborState::new(
            Vector3::new(10.0, 0.0, 5.0),
            Vector3::new(1.0, 0.0, 0.0),
            1_000,
        )
    }

    fn linear(pid_trim: bool) -> TrackFollower {
        TrackFollower::new(
            TargetPredictor::new(EstimatorKind::DeadReckoning, KalmanConfig::default()),
            PidConfig::follow_default(),
            pid_trim,
        )
    }

    #[test]
    fn test_linear_without_trim() {
        let mut follower = linear(false);
        let out = follower.update(&scenario(), &Vector3::zeros(), 1_500);

        assert!((out.waypoint - Vector3::new(10.5, 0.0, 5.0)).norm() < 1.0e-5);
        assert!((out.distance_to_target() - 11.180_34).abs() < 1.0e-3);
        assert_eq!(out.offset, [0.0, 0.0]);
        assert_eq!(follower.distance_to_target(), out.distance_to_target());
    }

    #[test]
    fn test_trim_is_added_to_estimate() {
        let mut follower = linear(true);
        let out = follower.update(&scenario(), &Vector3::zeros(), 1_500);

        // x error 10.5 saturates nothing: P = 21, I = 0.5 * 5.25, D = 0.1 * 5.25
        let expected = 21.0 + 2.625 + 0.525;
        assert!((out.offset[0] - expected).abs() < 1.0e-3);
        assert_eq!(out.offset[1], 0.0);
        assert!((out.waypoint.x - (out.estimate.waypoint.x + out.offset[0])).abs() < 1.0e-5);
        assert_eq!(out.waypoint.z, 5.0);
    }

    #[test]
    fn test_altitude_comes_from_neighbor() {
        let mut follower = TrackFollower::new(
            TargetPredictor::new(EstimatorKind::Kalman, KalmanConfig::default()),
            PidConfig::follow_default(),
            true,
        );
        let mut neighbor = scenario();
        neighbor.velocity.z = 3.0;
        let out = follower.update(&neighbor, &Vector3::new(0.0, 0.0, 1.0), 2_000);
        assert_eq!(out.waypoint.z, 5.0);
    }

    #[test]
    fn test_reset_clears_last_output() {
        let mut follower = linear(true);
        follower.update(&scenario(), &Vector3::zeros(), 1_500);
        assert!(follower.last_output().is_some());

        follower.reset();
        assert!(follower.last_output().is_none());
        assert_eq!(follower.distance_to_target(), 0.0);

        // Same inputs after reset give the same first output
        let mut fresh = linear(true);
        let a = follower.update(&scenario(), &Vector3::zeros(), 1_500);
        let b = fresh.update(&scenario(), &Vector3::zeros(), 1_500);
        assert_eq!(a, b);
    }

    #[test]
    fn test_elapsed_since_message() {
        assert_eq!(elapsed_since_message_ms(&scenario(), 1_750), 750);
        assert_eq!(elapsed_since_message_ms(&scenario(), 900), 0);
    }
}
