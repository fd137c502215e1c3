//! Flight modes, control dispatch and the system state machine
//!
//! - [`flags`]: `VehicleMode` bit flags and branch precedence
//! - [`controls`]: The controls command and pilot input
//! - [`dispatcher`]: Per-tick branch selection and the single actuator write
//! - [`state_machine`]: System state and battery failsafe

pub mod controls;
pub mod dispatcher;
pub mod flags;
pub mod state_machine;

pub use controls::{ControlMode, ControlsCommand, PilotInput, YawMode};
pub use dispatcher::{
    decide, ActuationTarget, ControlDecision, DispatchOutcome, DispatchSnapshot,
    FlightModeDispatcher, NavigationStatus, Stabiliser,
};
pub use flags::{ControlBranch, VehicleMode, BRANCH_PRECEDENCE};
pub use state_machine::{
    BatteryFailsafeChecker, BatteryFailsafeConfig, BatteryFailsafeLevel, CriticalBehavior,
    MavState, StateMachine, StateUpdate,
};
