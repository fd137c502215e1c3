//! Track Following Parameter Definitions
//!
//! # Parameters
//!
//! - `TRK_ESTIMATOR` - Target estimator (0 dead reckoning, 1 Kalman)
//! - `TRK_MAX_ACC` - Neighbour acceleration bound for the Kalman model (m/s²)
//! - `TRK_POS_NOISE` - Position measurement noise (m)
//! - `TRK_VEL_NOISE` - Velocity measurement noise (m/s)
//! - `TRK_INIT_VAR` - Initial Kalman state variance
//! - `TRK_PID_TRIM` - Add the follow PID correction to the estimate
//! - `TRK_WP_RADIUS` - Waypoint acceptance radius (m)
//! - `TRK_APPR_DIST` - Distance where approach slowdown starts (m)
//! - `TRK_SPEED_MAX` - Speed limit (m/s)
//! - `TRK_SPEED_MIN` - Minimum approach speed (m/s)

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::estimation::{EstimatorKind, KalmanConfig};
use crate::navigation::VelocityNavConfig;

/// Track following parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackParams {
    pub estimator: EstimatorKind,
    pub kalman: KalmanConfig,
    pub pid_trim: bool,
    pub velocity: VelocityNavConfig,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            estimator: EstimatorKind::Kalman,
            kalman: KalmanConfig::default(),
            pid_trim: true,
            velocity: VelocityNavConfig::default(),
        }
    }
}

impl TrackParams {
    /// Register track parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let d = Self::default();
        store.register(
            "TRK_ESTIMATOR",
            ParamValue::Int(d.estimator as i32),
            ParamFlags::empty(),
        )?;
        store.register("TRK_MAX_ACC", ParamValue::Float(d.kalman.max_acc), ParamFlags::empty())?;
        store.register(
            "TRK_POS_NOISE",
            ParamValue::Float(d.kalman.position_noise),
            ParamFlags::empty(),
        )?;
        store.register(
            "TRK_VEL_NOISE",
            ParamValue::Float(d.kalman.velocity_noise),
            ParamFlags::empty(),
        )?;
        store.register(
            "TRK_INIT_VAR",
            ParamValue::Float(d.kalman.initial_variance),
            ParamFlags::empty(),
        )?;
        store.register("TRK_PID_TRIM", ParamValue::Bool(d.pid_trim), ParamFlags::empty())?;
        store.register(
            "TRK_WP_RADIUS",
            ParamValue::Float(d.velocity.wp_radius),
            ParamFlags::empty(),
        )?;
        store.register(
            "TRK_APPR_DIST",
            ParamValue::Float(d.velocity.approach_dist),
            ParamFlags::empty(),
        )?;
        store.register(
            "TRK_SPEED_MAX",
            ParamValue::Float(d.velocity.max_speed),
            ParamFlags::empty(),
        )?;
        store.register(
            "TRK_SPEED_MIN",
            ParamValue::Float(d.velocity.min_approach_speed),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load track parameters from parameter store
    ///
    /// Non-finite values fall back to their defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        let d = Self::default();
        let wp_radius = store.get_finite_f32("TRK_WP_RADIUS", d.velocity.wp_radius).max(0.0);
        // Keep the approach zone non-empty so speed scaling never divides by zero
        let approach_dist = store
            .get_finite_f32("TRK_APPR_DIST", d.velocity.approach_dist)
            .max(wp_radius + 0.1);
        let max_speed = store.get_finite_f32("TRK_SPEED_MAX", d.velocity.max_speed).max(0.0);

        Self {
            estimator: EstimatorKind::from_param(
                store.get_i32("TRK_ESTIMATOR", d.estimator as i32),
            ),
            kalman: KalmanConfig {
                max_acc: store.get_finite_f32("TRK_MAX_ACC", d.kalman.max_acc),
                position_noise: store.get_finite_f32("TRK_POS_NOISE", d.kalman.position_noise),
                velocity_noise: store.get_finite_f32("TRK_VEL_NOISE", d.kalman.velocity_noise),
                initial_variance: store.get_finite_f32("TRK_INIT_VAR", d.kalman.initial_variance),
            },
            pid_trim: store.get_bool("TRK_PID_TRIM", d.pid_trim),
            velocity: VelocityNavConfig {
                wp_radius,
                approach_dist,
                max_speed,
                min_approach_speed: store
                    .get_finite_f32("TRK_SPEED_MIN", d.velocity.min_approach_speed)
                    .clamp(0.0, max_speed),
            },
        }
    }
}
