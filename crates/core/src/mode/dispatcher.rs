//! Flight-mode dispatcher
//!
//! Runs once per stabilisation tick. From a snapshot of the vehicle mode,
//! navigation status and pilot input it:
//!
//! 1. selects exactly one control branch (auto > guided > stabilise > manual,
//!    failsafe otherwise),
//! 2. fills a fresh [`ControlsCommand`],
//! 3. runs the stabilisation cascade when the branch's airborne gate allows
//!    it and the attitude input is fresh, or keeps the previous servo
//!    command otherwise,
//! 4. writes the servo command once, as its last step, to the simulation
//!    sink when HIL is set and to the hardware otherwise.
//!
//! **CRITICAL**: step 4 is the only place servo values reach an output.

use super::controls::{ControlMode, ControlsCommand, PilotInput, YawMode};
use super::flags::{ControlBranch, VehicleMode};
use super::state_machine::{CriticalBehavior, MavState};
use crate::actuator::{ActuatorOutput, ServoCommand};

/// The attitude/rate cascade turning a setpoint into servo values
pub trait Stabiliser {
    fn stabilise(&mut self, controls: &ControlsCommand) -> ServoCommand;
}

impl<S: Stabiliser + ?Sized> Stabiliser for &mut S {
    fn stabilise(&mut self, controls: &ControlsCommand) -> ServoCommand {
        (**self).stabilise(controls)
    }
}

/// Navigation output and plan flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationStatus {
    /// Setpoint produced by navigation
    pub controls: ControlsCommand,
    /// A waypoint plan is loaded and running
    pub plan_active: bool,
    /// Navigation halted (position hold)
    pub stop_nav: bool,
    pub auto_takeoff: bool,
    pub auto_landing: bool,
    pub critical_behavior: CriticalBehavior,
}

impl Default for NavigationStatus {
    fn default() -> Self {
        Self {
            controls: ControlsCommand::neutral(),
            plan_active: false,
            stop_nav: false,
            auto_takeoff: false,
            auto_landing: false,
            critical_behavior: CriticalBehavior::FlyToHome,
        }
    }
}

/// Everything the dispatcher reads, captured before any branch runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchSnapshot {
    pub mode: VehicleMode,
    pub mav_state: MavState,
    pub in_the_air: bool,
    pub navigation: NavigationStatus,
    /// RC remote is connected and sending
    pub remote_active: bool,
    pub remote: PilotInput,
    pub joystick: PilotInput,
    /// The attitude input of this tick is fresh. When false the cascade is
    /// skipped and the last good command is written again.
    pub attitude_valid: bool,
}

impl Default for DispatchSnapshot {
    fn default() -> Self {
        Self {
            mode: VehicleMode::empty(),
            mav_state: MavState::Boot,
            in_the_air: false,
            navigation: NavigationStatus::default(),
            remote_active: false,
            remote: PilotInput::default(),
            joystick: PilotInput::default(),
            attitude_valid: true,
        }
    }
}

/// Where the servo command went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationTarget {
    Hardware,
    Simulation,
}

/// Result of one dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOutcome {
    pub branch: ControlBranch,
    pub controls: ControlsCommand,
    /// Command written this tick
    pub servos: ServoCommand,
    /// The stabilisation cascade ran
    pub stabilised: bool,
    pub target: ActuationTarget,
}

/// Branch selection and controls, before stabilisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDecision {
    pub branch: ControlBranch,
    pub controls: ControlsCommand,
    /// Whether the cascade should run this tick (failsafe: false)
    pub stabilise: bool,
}

/// Pure branch selection.
pub fn decide(snapshot: &DispatchSnapshot) -> ControlDecision {
    let nav = &snapshot.navigation;
    let airborne_gate = snapshot.in_the_air || nav.auto_takeoff;
    let critical_fly_home = snapshot.mav_state == MavState::Critical
        && nav.critical_behavior == CriticalBehavior::FlyToHome;

    let branch = snapshot.mode.control_branch();
    let (controls, stabilise) = match branch {
        ControlBranch::Auto => {
            let following_plan =
                nav.plan_active && !nav.stop_nav && !nav.auto_takeoff && !nav.auto_landing;
            let coordinated = snapshot.mode.contains(VehicleMode::CUSTOM)
                || following_plan
                || critical_fly_home;
            (nav_velocity(nav, coordinated), airborne_gate)
        }
        ControlBranch::Guided => (nav_velocity(nav, critical_fly_home), airborne_gate),
        ControlBranch::Stabilise => {
            let input = pilot(snapshot);
            (input.velocity_command(), airborne_gate)
        }
        ControlBranch::Manual => {
            let input = pilot(snapshot);
            (input.attitude_command(), true)
        }
        ControlBranch::Failsafe => (ControlsCommand::neutral(), false),
    };

    ControlDecision {
        branch,
        controls,
        stabilise,
    }
}

fn nav_velocity(nav: &NavigationStatus, coordinated: bool) -> ControlsCommand {
    ControlsCommand {
        control_mode: ControlMode::VelocityCommand,
        yaw_mode: if coordinated {
            YawMode::Coordinated
        } else {
            YawMode::Absolute
        },
        ..nav.controls
    }
}

fn pilot(snapshot: &DispatchSnapshot) -> &PilotInput {
    if snapshot.remote_active {
        &snapshot.remote
    } else {
        &snapshot.joystick
    }
}

/// Owns the last servo command between ticks
#[derive(Debug, Clone)]
pub struct FlightModeDispatcher {
    failsafe: ServoCommand,
    last_servos: ServoCommand,
    last_branch: Option<ControlBranch>,
}

impl FlightModeDispatcher {
    pub fn new(failsafe: ServoCommand) -> Self {
        Self {
            failsafe,
            last_servos: failsafe,
            last_branch: None,
        }
    }

    /// Command written on the previous tick (failsafe before the first).
    pub fn last_servos(&self) -> &ServoCommand {
        &self.last_servos
    }

    /// Branch of the previous tick.
    pub fn last_branch(&self) -> Option<ControlBranch> {
        self.last_branch
    }

    /// Run one dispatch and perform the single actuator write.
    pub fn run<S, H, M>(
        &mut self,
        snapshot: &DispatchSnapshot,
        stabiliser: &mut S,
        hardware: &mut H,
        simulation: &mut M,
    ) -> DispatchOutcome
    where
        S: Stabiliser + ?Sized,
        H: ActuatorOutput + ?Sized,
        M: ActuatorOutput + ?Sized,
    {
        let decision = decide(snapshot);
        let stabilised = decision.branch != ControlBranch::Failsafe
            && decision.stabilise
            && snapshot.attitude_valid;

        let servos = match decision.branch {
            ControlBranch::Failsafe => self.failsafe,
            _ if stabilised => stabiliser.stabilise(&decision.controls).sanitized(),
            _ => self.last_servos,
        };
        self.last_servos = servos;
        self.last_branch = Some(decision.branch);

        let target = if snapshot.mode.is_hil() {
            simulation.write(&servos);
            ActuationTarget::Simulation
        } else {
            hardware.write(&servos);
            ActuationTarget::Hardware
        };

        DispatchOutcome {
            branch: decision.branch,
            controls: decision.controls,
            servos,
            stabilised,
            target,
        }
    }
}

impl Default for FlightModeDispatcher {
    fn default() -> Self {
        Self::new(ServoCommand::failsafe())
    }
}
