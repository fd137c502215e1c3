//! Linear dead-reckoning estimator

use nalgebra::Vector3;

use super::{elapsed_ms, NeighborState, TargetEstimate, TargetEstimator};

/// Extrapolates the neighbour along its last reported velocity.
///
/// Stateless: every call recomputes from the stored neighbour message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadReckoning;

impl DeadReckoning {
    pub const fn new() -> Self {
        Self
    }
}

impl TargetEstimator for DeadReckoning {
    fn estimate(
        &mut self,
        neighbor: &NeighborState,
        own_position: &Vector3<f32>,
        now_ms: u32,
    ) -> TargetEstimate {
        let elapsed_s = elapsed_ms(now_ms, neighbor.time_received_ms) as f32 / 1_000.0;
        let waypoint = neighbor.position + neighbor.velocity * elapsed_s;

        // Distance uses the reported position, not the extrapolated one
        let distance_to_target = (neighbor.position - own_position).norm();

        TargetEstimate {
            waypoint,
            distance_to_target,
        }
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrapolates_along_velocity() {
        let neighbor = NeighborState::new(
            Vector3::new(10.0, 0.0, 5.0),
            Vector3::new(1.0, 0.0, 0.0),
            1_000,
        );
        let mut estimator = DeadReckoning::new();
        let out = estimator.estimate(&neighbor, &Vector3::zeros(), 1_500);

        assert!((out.waypoint - Vector3::new(10.5, 0.0, 5.0)).norm() < 1.0e-5);
        assert!((out.distance_to_target - 11.180_34).abs() < 1.0e-3);
    }

    #[test]
    fn test_all_axes_are_extrapolated() {
        let neighbor = NeighborState::new(
            Vector3::new(0.0, 0.0, -10.0),
            Vector3::new(2.0, -1.0, 0.5),
            0,
        );
        let out = DeadReckoning.estimate(&neighbor, &Vector3::zeros(), 2_000);
        assert!((out.waypoint - Vector3::new(4.0, -2.0, -9.0)).norm() < 1.0e-5);
    }

    #[test]
    fn test_zero_elapsed_returns_reported_position() {
        let neighbor = NeighborState::new(
            Vector3::new(3.0, 4.0, 0.0),
            Vector3::new(9.0, 9.0, 9.0),
            700,
        );
        let out = DeadReckoning.estimate(&neighbor, &Vector3::zeros(), 700);
        assert_eq!(out.waypoint, neighbor.position);
        assert!((out.distance_to_target - 5.0).abs() < 1.0e-5);
    }

    #[test]
    fn test_future_stamp_does_not_extrapolate() {
        let neighbor = NeighborState::new(
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            2_000,
        );
        let out = DeadReckoning.estimate(&neighbor, &Vector3::zeros(), 1_900);
        assert_eq!(out.waypoint, neighbor.position);
    }
}
