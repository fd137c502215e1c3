//! System state machine and battery failsafe
//!
//! The analog monitor feeds battery voltage into a
//! [`BatteryFailsafeChecker`] and latches the resulting level. The state
//! machine task turns the arm state and that level into the system state
//! and the critical behaviour read by the dispatcher.
//!
//! Pure logic, fully testable on host.

use super::flags::VehicleMode;

/// System state reported to the ground station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MavState {
    Boot,
    /// Disarmed and healthy
    Standby,
    /// Armed and healthy
    Active,
    /// Degraded: the critical behaviour is in effect
    Critical,
    /// Land as soon as possible
    Emergency,
}

impl MavState {
    pub fn is_critical(self) -> bool {
        matches!(self, MavState::Critical | MavState::Emergency)
    }

    /// Name for logging and telemetry
    pub const fn as_str(self) -> &'static str {
        match self {
            MavState::Boot => "boot",
            MavState::Standby => "standby",
            MavState::Active => "active",
            MavState::Critical => "critical",
            MavState::Emergency => "emergency",
        }
    }
}

/// What navigation does while the system is critical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalBehavior {
    ClimbToSafeAlt,
    FlyToHome,
    CriticalLand,
}

impl CriticalBehavior {
    /// Parameter encoding; unknown values fall back to fly-to-home.
    pub fn from_param(value: i32) -> Self {
        match value {
            0 => CriticalBehavior::ClimbToSafeAlt,
            2 => CriticalBehavior::CriticalLand,
            _ => CriticalBehavior::FlyToHome,
        }
    }
}

/// Battery failsafe severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BatteryFailsafeLevel {
    /// Low voltage (sustained threshold breach)
    Low,
    /// Critical voltage (immediate)
    Critical,
}

/// Thresholds for the battery failsafe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryFailsafeConfig {
    /// Low voltage threshold (V), 0.0 = disabled
    pub low_voltage: f32,
    /// Critical voltage threshold (V), 0.0 = disabled
    pub critical_voltage: f32,
}

/// Consecutive samples below the LOW threshold needed to trigger (10 s at 10 Hz)
pub const LOW_HYSTERESIS_COUNT: u32 = 100;

/// Stateful battery failsafe checker with hysteresis
#[derive(Debug, Clone)]
pub struct BatteryFailsafeChecker {
    config: BatteryFailsafeConfig,
    low_count: u32,
    low_triggered: bool,
    critical_triggered: bool,
}

impl BatteryFailsafeChecker {
    pub fn new(config: BatteryFailsafeConfig) -> Self {
        Self {
            config,
            low_count: 0,
            low_triggered: false,
            critical_triggered: false,
        }
    }

    /// Check voltage against the thresholds.
    ///
    /// Returns `Some(level)` on the first trigger of each level. Levels are
    /// sticky until [`reset`](Self::reset).
    ///
    /// Skips checks when disarmed (clearing the hysteresis counter), when
    /// `voltage` is 0.0 (no reading yet), or when a threshold is 0.0.
    pub fn check(&mut self, voltage: f32, is_armed: bool) -> Option<BatteryFailsafeLevel> {
        if !is_armed {
            self.low_count = 0;
            return None;
        }
        if voltage == 0.0 {
            return None;
        }

        // Critical first, no hysteresis
        if !self.critical_triggered
            && self.config.critical_voltage > 0.0
            && voltage < self.config.critical_voltage
        {
            self.critical_triggered = true;
            return Some(BatteryFailsafeLevel::Critical);
        }

        if !self.low_triggered && self.config.low_voltage > 0.0 {
            if voltage < self.config.low_voltage {
                self.low_count += 1;
                if self.low_count >= LOW_HYSTERESIS_COUNT {
                    self.low_triggered = true;
                    return Some(BatteryFailsafeLevel::Low);
                }
            } else {
                self.low_count = 0;
            }
        }

        None
    }

    /// Highest level triggered so far.
    pub fn level(&self) -> Option<BatteryFailsafeLevel> {
        if self.critical_triggered {
            Some(BatteryFailsafeLevel::Critical)
        } else if self.low_triggered {
            Some(BatteryFailsafeLevel::Low)
        } else {
            None
        }
    }

    /// Clear all failsafe state.
    pub fn reset(&mut self) {
        self.low_count = 0;
        self.low_triggered = false;
        self.critical_triggered = false;
    }
}

/// Output of one state machine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub state: MavState,
    pub critical_behavior: CriticalBehavior,
    /// True when `state` differs from the previous step
    pub changed: bool,
}

/// System state machine
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: MavState,
    low_behavior: CriticalBehavior,
}

impl StateMachine {
    /// `low_behavior` is applied when the battery reaches the LOW level.
    pub fn new(low_behavior: CriticalBehavior) -> Self {
        Self {
            state: MavState::Boot,
            low_behavior,
        }
    }

    pub fn state(&self) -> MavState {
        self.state
    }

    /// Advance from the current mode and the latched battery level.
    pub fn update(
        &mut self,
        mode: VehicleMode,
        battery: Option<BatteryFailsafeLevel>,
    ) -> StateUpdate {
        let (state, critical_behavior) = match (mode.is_armed(), battery) {
            (_, Some(BatteryFailsafeLevel::Critical)) => {
                (MavState::Emergency, CriticalBehavior::CriticalLand)
            }
            (true, Some(BatteryFailsafeLevel::Low)) => (MavState::Critical, self.low_behavior),
            (true, None) => (MavState::Active, self.low_behavior),
            (false, _) => (MavState::Standby, self.low_behavior),
        };
        let changed = state != self.state;
        self.state = state;
        StateUpdate {
            state,
            critical_behavior,
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BatteryFailsafeConfig {
        BatteryFailsafeConfig {
            low_voltage: 10.5,
            critical_voltage: 9.6,
        }
    }

    #[test]
    fn test_normal_voltage_no_trigger() {
        let mut checker = BatteryFailsafeChecker::new(config());
        for _ in 0..200 {
            assert_eq!(checker.check(12.0, true), None);
        }
        assert_eq!(checker.level(), None);
    }

    #[test]
    fn test_critical_triggers_immediately_and_sticks() {
        let mut checker = BatteryFailsafeChecker::new(config());
        assert_eq!(
            checker.check(9.0, true),
            Some(BatteryFailsafeLevel::Critical)
        );
        for _ in 0..10 {
            assert_eq!(checker.check(9.0, true), None);
        }
        assert_eq!(checker.level(), Some(BatteryFailsafeLevel::Critical));
    }

    #[test]
    fn test_low_requires_hysteresis() {
        let mut checker = BatteryFailsafeChecker::new(config());
        for _ in 0..(LOW_HYSTERESIS_COUNT - 1) {
            assert_eq!(checker.check(10.0, true), None);
        }
        assert_eq!(checker.check(10.0, true), Some(BatteryFailsafeLevel::Low));
        assert_eq!(checker.level(), Some(BatteryFailsafeLevel::Low));
    }

    #[test]
    fn test_recovery_resets_hysteresis() {
        let mut checker = BatteryFailsafeChecker::new(config());
        for _ in 0..50 {
            checker.check(10.0, true);
        }
        assert_eq!(checker.check(12.0, true), None);
        for _ in 0..(LOW_HYSTERESIS_COUNT - 1) {
            assert_eq!(checker.check(10.0, true), None);
        }
        assert_eq!(checker.check(10.0, true), Some(BatteryFailsafeLevel::Low));
    }

    #[test]
    fn test_disarmed_and_unread_are_ignored() {
        let mut checker = BatteryFailsafeChecker::new(config());
        for _ in 0..200 {
            assert_eq!(checker.check(5.0, false), None);
            assert_eq!(checker.check(0.0, true), None);
        }
    }

    #[test]
    fn test_zero_threshold_disabled() {
        let mut checker = BatteryFailsafeChecker::new(BatteryFailsafeConfig {
            low_voltage: 0.0,
            critical_voltage: 0.0,
        });
        for _ in 0..200 {
            assert_eq!(checker.check(1.0, true), None);
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut checker = BatteryFailsafeChecker::new(config());
        assert!(checker.check(9.0, true).is_some());
        checker.reset();
        assert_eq!(checker.level(), None);
        assert_eq!(
            checker.check(9.0, true),
            Some(BatteryFailsafeLevel::Critical)
        );
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut sm = StateMachine::new(CriticalBehavior::FlyToHome);
        assert_eq!(sm.state(), MavState::Boot);

        let update = sm.update(VehicleMode::empty(), None);
        assert_eq!(update.state, MavState::Standby);
        assert!(update.changed);

        let update = sm.update(VehicleMode::ARMED, None);
        assert_eq!(update.state, MavState::Active);

        let update = sm.update(VehicleMode::ARMED, None);
        assert!(!update.changed);

        let update = sm.update(VehicleMode::ARMED, Some(BatteryFailsafeLevel::Low));
        assert_eq!(update.state, MavState::Critical);
        assert_eq!(update.critical_behavior, CriticalBehavior::FlyToHome);
        assert!(update.state.is_critical());

        let update = sm.update(VehicleMode::ARMED, Some(BatteryFailsafeLevel::Critical));
        assert_eq!(update.state, MavState::Emergency);
        assert_eq!(update.critical_behavior, CriticalBehavior::CriticalLand);
    }

    #[test]
    fn test_critical_behavior_from_param() {
        assert_eq!(
            CriticalBehavior::from_param(0),
            CriticalBehavior::ClimbToSafeAlt
        );
        assert_eq!(CriticalBehavior::from_param(1), CriticalBehavior::FlyToHome);
        assert_eq!(
            CriticalBehavior::from_param(2),
            CriticalBehavior::CriticalLand
        );
        assert_eq!(CriticalBehavior::from_param(99), CriticalBehavior::FlyToHome);
    }
}
