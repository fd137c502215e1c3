//! Mock servo outputs and stabilisation cascade

use flockpilot_core::actuator::{ActuatorOutput, ServoCommand};
use flockpilot_core::mode::{ControlsCommand, Stabiliser};

/// Mock servo outputs
///
/// Records every write for test verification.
#[derive(Debug, Default)]
pub struct MockActuators {
    writes: u32,
    last: Option<ServoCommand>,
}

impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes so far
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Last written command
    pub fn last(&self) -> Option<&ServoCommand> {
        self.last.as_ref()
    }
}

impl ActuatorOutput for MockActuators {
    fn write(&mut self, command: &ServoCommand) {
        self.writes += 1;
        self.last = Some(*command);
    }
}

/// Pass-through cascade: servo channels are the command axes and thrust.
#[derive(Debug, Default)]
pub struct MockStabiliser {
    calls: u32,
    last_controls: Option<ControlsCommand>,
}

impl MockStabiliser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Setpoint of the last call
    pub fn last_controls(&self) -> Option<&ControlsCommand> {
        self.last_controls.as_ref()
    }
}

impl Stabiliser for MockStabiliser {
    fn stabilise(&mut self, controls: &ControlsCommand) -> ServoCommand {
        self.calls += 1;
        self.last_controls = Some(*controls);
        ServoCommand::new([
            controls.axes[0],
            controls.axes[1],
            controls.axes[2],
            controls.thrust,
        ])
    }
}
