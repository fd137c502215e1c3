//! Failsafe Parameter Definitions
//!
//! # Parameters
//!
//! - `FS_BATT_LOW` - Low battery voltage (V), 0 disables
//! - `FS_BATT_CRIT` - Critical battery voltage (V), 0 disables
//! - `FS_BATT_ACT` - Critical behaviour on low battery
//!   (0 climb to safe altitude, 1 fly home, 2 land)
//! - `FS_SERVO` - Normalized value written to every servo in failsafe

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::actuator::{ServoCommand, FAILSAFE_VALUE};
use crate::mode::{BatteryFailsafeConfig, CriticalBehavior};

/// Failsafe parameters loaded from parameter store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailsafeParams {
    /// Low battery threshold (V)
    pub batt_low: f32,
    /// Critical battery threshold (V)
    pub batt_critical: f32,
    /// Behaviour once the battery is low
    pub low_behavior: CriticalBehavior,
    /// Servo value in failsafe
    pub servo_value: f32,
}

impl Default for FailsafeParams {
    fn default() -> Self {
        Self {
            batt_low: 10.5,
            batt_critical: 9.6,
            low_behavior: CriticalBehavior::FlyToHome,
            servo_value: FAILSAFE_VALUE,
        }
    }
}

impl FailsafeParams {
    /// Register failsafe parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let d = Self::default();
        store.register("FS_BATT_LOW", ParamValue::Float(d.batt_low), ParamFlags::empty())?;
        store.register(
            "FS_BATT_CRIT",
            ParamValue::Float(d.batt_critical),
            ParamFlags::empty(),
        )?;
        store.register("FS_BATT_ACT", ParamValue::Int(1), ParamFlags::empty())?;
        // Not tunable in flight
        store.register(
            "FS_SERVO",
            ParamValue::Float(d.servo_value),
            ParamFlags::READ_ONLY,
        )?;
        Ok(())
    }

    /// Load failsafe parameters, falling back to defaults for missing or non-finite entries
    pub fn from_store(store: &ParameterStore) -> Self {
        let d = Self::default();
        Self {
            batt_low: store.get_finite_f32("FS_BATT_LOW", d.batt_low),
            batt_critical: store.get_finite_f32("FS_BATT_CRIT", d.batt_critical),
            low_behavior: CriticalBehavior::from_param(store.get_i32("FS_BATT_ACT", 1)),
            servo_value: store.get_finite_f32("FS_SERVO", d.servo_value).clamp(-1.0, 1.0),
        }
    }

    /// Thresholds for the battery checker
    pub fn battery_config(&self) -> BatteryFailsafeConfig {
        BatteryFailsafeConfig {
            low_voltage: self.batt_low,
            critical_voltage: self.batt_critical,
        }
    }

    /// Command written when the dispatcher falls back to failsafe
    pub fn servo_command(&self) -> ServoCommand {
        ServoCommand::uniform(self.servo_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let mut store = ParameterStore::new();
        FailsafeParams::register_defaults(&mut store).unwrap();

        assert!(store.get("FS_BATT_LOW").is_some());
        assert!(store.get("FS_BATT_CRIT").is_some());
        assert!(store.get("FS_BATT_ACT").is_some());
        assert!(store.get("FS_SERVO").is_some());
    }

    #[test]
    fn test_from_store_defaults() {
        let mut store = ParameterStore::new();
        FailsafeParams::register_defaults(&mut store).unwrap();

        let params = FailsafeParams::from_store(&store);
        assert_eq!(params, FailsafeParams::default());
        assert_eq!(params.servo_command(), ServoCommand::failsafe());
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        FailsafeParams::register_defaults(&mut store).unwrap();
        store.set("FS_BATT_LOW", ParamValue::Float(11.1)).unwrap();
        store.set("FS_BATT_ACT", ParamValue::Int(2)).unwrap();

        let params = FailsafeParams::from_store(&store);
        assert!((params.batt_low - 11.1).abs() < f32::EPSILON);
        assert_eq!(params.low_behavior, CriticalBehavior::CriticalLand);
        let battery = params.battery_config();
        assert!((battery.critical_voltage - 9.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_failsafe_servo_is_read_only() {
        let mut store = ParameterStore::new();
        FailsafeParams::register_defaults(&mut store).unwrap();
        assert_eq!(
            store.set("FS_SERVO", ParamValue::Float(0.0)),
            Err(ParameterError::ReadOnly)
        );
    }

    #[test]
    fn test_from_empty_store() {
        let store = ParameterStore::new();
        assert_eq!(FailsafeParams::from_store(&store), FailsafeParams::default());
    }
}
