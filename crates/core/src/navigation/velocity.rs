//! Waypoint to velocity command
//!
//! Turns the followed waypoint into the horizontal/vertical velocity command
//! consumed by the dispatcher in auto and guided modes. Speed scales with
//! distance inside the approach zone and drops to zero inside the
//! acceptance radius.

use nalgebra::Vector3;

/// Velocity controller configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityNavConfig {
    /// Waypoint acceptance radius in metres
    pub wp_radius: f32,
    /// Distance at which the approach slowdown starts (metres)
    pub approach_dist: f32,
    /// Speed limit (m/s)
    pub max_speed: f32,
    /// Minimum speed while approaching (m/s)
    pub min_approach_speed: f32,
}

impl Default for VelocityNavConfig {
    fn default() -> Self {
        Self {
            wp_radius: 2.0,
            approach_dist: 10.0,
            max_speed: 5.0,
            min_approach_speed: 0.5,
        }
    }
}

/// Output of the velocity controller
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityCommand {
    /// Commanded velocity in the local frame (m/s)
    pub velocity: Vector3<f32>,
    /// Heading towards the waypoint (rad), `None` when on top of it
    pub heading: Option<f32>,
    /// Distance to the waypoint (metres)
    pub distance_m: f32,
    /// True inside the acceptance radius
    pub at_target: bool,
}

/// Proportional waypoint-to-velocity controller
#[derive(Clone, Debug, Default)]
pub struct VelocityController {
    config: VelocityNavConfig,
}

impl VelocityController {
    pub fn new(config: VelocityNavConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VelocityNavConfig {
        &self.config
    }

    fn speed_for(&self, distance: f32) -> f32 {
        let cfg = &self.config;
        if distance < cfg.wp_radius {
            0.0
        } else if distance < cfg.approach_dist {
            let ratio = (distance - cfg.wp_radius) / (cfg.approach_dist - cfg.wp_radius);
            cfg.min_approach_speed + ratio * (cfg.max_speed - cfg.min_approach_speed)
        } else {
            cfg.max_speed
        }
    }

    /// Velocity command from `position` towards `waypoint`.
    pub fn update(&self, position: &Vector3<f32>, waypoint: &Vector3<f32>) -> VelocityCommand {
        let delta = waypoint - position;
        let distance = delta.norm();
        let at_target = distance < self.config.wp_radius;

        if !distance.is_finite() || distance < f32::EPSILON {
            return VelocityCommand {
                velocity: Vector3::zeros(),
                heading: None,
                distance_m: if distance.is_finite() { distance } else { 0.0 },
                at_target: true,
            };
        }

        let speed = sanitize_output(self.speed_for(distance), 0.0, self.config.max_speed, 0.0);
        let velocity = delta * (speed / distance);
        let heading = libm::atan2f(delta.y, delta.x);

        VelocityCommand {
            velocity,
            heading: Some(heading),
            distance_m: distance,
            at_target,
        }
    }
}

/// Clamp and replace NaN/inf by `default`.
fn sanitize_output(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() || value.is_infinite() {
        default
    } else {
        value.max(min).min(max)
    }
}
