//! Vehicle mode flags and control-branch resolution

use bitflags::bitflags;

bitflags! {
    /// Independent vehicle mode flags
    ///
    /// Several control flags may be set at once; [`VehicleMode::control_branch`]
    /// resolves them with a fixed precedence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VehicleMode: u8 {
        /// Motors may spin
        const ARMED = 0b0000_0001;
        /// Autonomous navigation
        const AUTO = 0b0000_0010;
        /// Externally guided navigation
        const GUIDED = 0b0000_0100;
        /// Velocity control from the pilot
        const STABILISE = 0b0000_1000;
        /// Attitude control from the pilot
        const MANUAL = 0b0001_0000;
        /// Custom behaviour (coordinated yaw in auto)
        const CUSTOM = 0b0010_0000;
        /// Hardware-in-the-loop: sensors and actuators are simulated
        const HIL = 0b0100_0000;
    }
}

/// Control strategy selected for one stabilisation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlBranch {
    Auto,
    Guided,
    Stabilise,
    Manual,
    /// Disarmed, or armed with no control flag set
    Failsafe,
}

impl ControlBranch {
    /// Name for logging and telemetry
    pub const fn as_str(self) -> &'static str {
        match self {
            ControlBranch::Auto => "auto",
            ControlBranch::Guided => "guided",
            ControlBranch::Stabilise => "stabilise",
            ControlBranch::Manual => "manual",
            ControlBranch::Failsafe => "failsafe",
        }
    }
}

/// Control flags in precedence order, highest first
pub const BRANCH_PRECEDENCE: [(VehicleMode, ControlBranch); 4] = [
    (VehicleMode::AUTO, ControlBranch::Auto),
    (VehicleMode::GUIDED, ControlBranch::Guided),
    (VehicleMode::STABILISE, ControlBranch::Stabilise),
    (VehicleMode::MANUAL, ControlBranch::Manual),
];

impl VehicleMode {
    pub fn is_armed(self) -> bool {
        self.contains(VehicleMode::ARMED)
    }

    pub fn is_hil(self) -> bool {
        self.contains(VehicleMode::HIL)
    }

    /// The single branch that runs this tick.
    pub fn control_branch(self) -> ControlBranch {
        if !self.is_armed() {
            return ControlBranch::Failsafe;
        }
        BRANCH_PRECEDENCE
            .iter()
            .find(|(flag, _)| self.contains(*flag))
            .map(|(_, branch)| *branch)
            .unwrap_or(ControlBranch::Failsafe)
    }
}
