//! Controls command handed to the stabilisation cascade

/// What the command vector means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Axes are velocities in the local frame (m/s)
    VelocityCommand,
    /// Axes are roll, pitch, yaw targets
    AttitudeCommand,
}

/// How the heading/yaw field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YawMode {
    /// Nose follows the direction of travel
    Coordinated,
    /// `heading` is an absolute heading (rad)
    Absolute,
    /// `heading` is a yaw rate relative to the current heading
    Relative,
}

/// One control setpoint, produced fresh every stabilisation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsCommand {
    pub control_mode: ControlMode,
    pub yaw_mode: YawMode,
    /// Axis-indexed command vector (x, y, z or roll, pitch, yaw)
    pub axes: [f32; 3],
    /// Collective thrust, -1.0 to +1.0
    pub thrust: f32,
    /// Heading or yaw rate, per `yaw_mode`
    pub heading: f32,
}

impl ControlsCommand {
    /// Level attitude, zero thrust, no yaw.
    pub const fn neutral() -> Self {
        Self {
            control_mode: ControlMode::AttitudeCommand,
            yaw_mode: YawMode::Relative,
            axes: [0.0; 3],
            thrust: -1.0,
            heading: 0.0,
        }
    }

    /// Velocity setpoint.
    pub const fn velocity(axes: [f32; 3], heading: f32, yaw_mode: YawMode) -> Self {
        Self {
            control_mode: ControlMode::VelocityCommand,
            yaw_mode,
            axes,
            thrust: 0.0,
            heading,
        }
    }
}

impl Default for ControlsCommand {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Stick input from the RC remote or the ground-station joystick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PilotInput {
    /// Velocity request (m/s), used in stabilise mode
    pub velocity: [f32; 3],
    /// Roll, pitch, yaw request, used in manual mode
    pub attitude: [f32; 3],
    /// Collective thrust, -1.0 to +1.0
    pub thrust: f32,
    /// Yaw rate request
    pub yaw_rate: f32,
}

impl PilotInput {
    /// Velocity command with relative yaw.
    pub fn velocity_command(&self) -> ControlsCommand {
        ControlsCommand {
            control_mode: ControlMode::VelocityCommand,
            yaw_mode: YawMode::Relative,
            axes: self.velocity,
            thrust: self.thrust,
            heading: self.yaw_rate,
        }
    }

    /// Attitude command with relative yaw.
    pub fn attitude_command(&self) -> ControlsCommand {
        ControlsCommand {
            control_mode: ControlMode::AttitudeCommand,
            yaw_mode: YawMode::Relative,
            axes: self.attitude,
            thrust: self.thrust,
            heading: self.yaw_rate,
        }
    }
}
