//! Follow PID Parameter Definitions
//!
//! Tuning of the two horizontal PID correctors that trim the followed
//! waypoint. Both axes share the same gains.
//!
//! # Parameters
//!
//! - `FOLL_P` - Proportional gain
//! - `FOLL_OUT_MIN` / `FOLL_OUT_MAX` - Output clip (m)
//! - `FOLL_I_PRE` / `FOLL_I_POST` - Integrator pre/post gain
//! - `FOLL_I_CLIP` - Integrator accumulator clip
//! - `FOLL_I_LEAK` - Integrator leak per update (0-1)
//! - `FOLL_D_GAIN` - Differentiator gain
//! - `FOLL_D_LPF` - Differentiator low-pass factor (0-1)
//! - `FOLL_D_CLIP` - Differentiator clip
//! - `FOLL_SOFT_ZONE` - Soft dead-zone width on the error (m)

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::control::{DifferentiatorConfig, IntegratorConfig, PidConfig};

/// Follow PID parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowParams {
    pub pid: PidConfig,
}

impl Default for FollowParams {
    fn default() -> Self {
        Self {
            pid: PidConfig::follow_default(),
        }
    }
}

impl FollowParams {
    /// Register follow parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let d = PidConfig::follow_default();
        let entries = [
            ("FOLL_P", d.p_gain),
            ("FOLL_OUT_MIN", d.clip_min),
            ("FOLL_OUT_MAX", d.clip_max),
            ("FOLL_I_PRE", d.integrator.pregain),
            ("FOLL_I_POST", d.integrator.postgain),
            ("FOLL_I_CLIP", d.integrator.clip),
            ("FOLL_I_LEAK", d.integrator.leakiness),
            ("FOLL_D_GAIN", d.differentiator.gain),
            ("FOLL_D_LPF", d.differentiator.lpf),
            ("FOLL_D_CLIP", d.differentiator.clip),
            ("FOLL_SOFT_ZONE", d.soft_zone_width),
        ];
        for (name, value) in entries {
            store.register(name, ParamValue::Float(value), ParamFlags::empty())?;
        }
        Ok(())
    }

    /// Load follow parameters from parameter store
    ///
    /// Non-finite values fall back to their defaults. Leak and low-pass
    /// factors are clamped to [0, 1]; an inverted output clip is swapped.
    pub fn from_store(store: &ParameterStore) -> Self {
        let d = PidConfig::follow_default();
        let out_min = store.get_finite_f32("FOLL_OUT_MIN", d.clip_min);
        let out_max = store.get_finite_f32("FOLL_OUT_MAX", d.clip_max);
        let (clip_min, clip_max) = if out_min <= out_max {
            (out_min, out_max)
        } else {
            (out_max, out_min)
        };

        Self {
            pid: PidConfig {
                p_gain: store.get_finite_f32("FOLL_P", d.p_gain),
                clip_min,
                clip_max,
                integrator: IntegratorConfig {
                    pregain: store.get_finite_f32("FOLL_I_PRE", d.integrator.pregain),
                    postgain: store.get_finite_f32("FOLL_I_POST", d.integrator.postgain),
                    clip: store.get_finite_f32("FOLL_I_CLIP", d.integrator.clip),
                    leakiness: store
                        .get_finite_f32("FOLL_I_LEAK", d.integrator.leakiness)
                        .clamp(0.0, 1.0),
                },
                differentiator: DifferentiatorConfig {
                    gain: store.get_finite_f32("FOLL_D_GAIN", d.differentiator.gain),
                    lpf: store
                        .get_finite_f32("FOLL_D_LPF", d.differentiator.lpf)
                        .clamp(0.0, 1.0),
                    clip: store.get_finite_f32("FOLL_D_CLIP", d.differentiator.clip),
                },
                soft_zone_width: store
                    .get_finite_f32("FOLL_SOFT_ZONE", d.soft_zone_width)
                    .max(0.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PidController;

    #[test]
    fn test_defaults_round_trip_through_store() {
        let mut store = ParameterStore::new();
        FollowParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.len(), 11);
        assert_eq!(FollowParams::from_store(&store), FollowParams::default());
    }

    #[test]
    fn test_custom_values_and_sanitising() {
        let mut store = ParameterStore::new();
        FollowParams::register_defaults(&mut store).unwrap();
        store.set("FOLL_P", ParamValue::Float(1.0)).unwrap();
        store.set("FOLL_I_LEAK", ParamValue::Float(3.0)).unwrap();
        store.set("FOLL_OUT_MIN", ParamValue::Float(50.0)).unwrap();
        store.set("FOLL_OUT_MAX", ParamValue::Float(-50.0)).unwrap();

        let pid = FollowParams::from_store(&store).pid;
        assert_eq!(pid.p_gain, 1.0);
        assert_eq!(pid.integrator.leakiness, 1.0);
        assert_eq!(pid.clip_min, -50.0);
        assert_eq!(pid.clip_max, 50.0);
    }

    #[test]
    fn test_non_finite_values_fall_back_to_defaults() {
        let d = PidConfig::follow_default();
        let mut store = ParameterStore::new();
        FollowParams::register_defaults(&mut store).unwrap();
        store.set("FOLL_OUT_MAX", ParamValue::Float(f32::NAN)).unwrap();
        store.set("FOLL_OUT_MIN", ParamValue::Float(f32::NAN)).unwrap();
        store.set("FOLL_I_CLIP", ParamValue::Float(f32::NAN)).unwrap();
        store.set("FOLL_D_CLIP", ParamValue::Float(f32::INFINITY)).unwrap();
        store.set("FOLL_P", ParamValue::Float(f32::NEG_INFINITY)).unwrap();

        let pid = FollowParams::from_store(&store).pid;
        assert_eq!(pid.clip_min, d.clip_min);
        assert_eq!(pid.clip_max, d.clip_max);
        assert_eq!(pid.integrator.clip, d.integrator.clip);
        assert_eq!(pid.differentiator.clip, d.differentiator.clip);
        assert_eq!(pid.p_gain, d.p_gain);
    }

    #[test]
    fn test_nan_output_clip_does_not_panic_controller() {
        for name in ["FOLL_OUT_MAX", "FOLL_OUT_MIN", "FOLL_I_CLIP"] {
            let mut store = ParameterStore::new();
            FollowParams::register_defaults(&mut store).unwrap();
            store.set(name, ParamValue::Float(f32::NAN)).unwrap();

            let mut pid = PidController::new(FollowParams::from_store(&store).pid);
            let out = pid.update(1.0);
            assert!(out.is_finite(), "{name} produced {out}");
            assert!((out - 2.3).abs() < 1.0e-5);
        }
    }
}
