//! Shared vehicle state
//!
//! One owned aggregate, lent by `&mut` to one task at a time. Each field has
//! a single writing task:
//!
//! | field | writer |
//! |---|---|
//! | `imu`, `last_dispatch` | stabilisation |
//! | `barometer` | barometer |
//! | `gps` | gps |
//! | `navigation.controls`, `navigation.stop_nav`, `follow`, `distance_to_target` | navigation |
//! | `mav_state`, `navigation.critical_behavior` | state machine |
//! | `battery`, `battery_failsafe` | analog monitor |
//! | `telemetry` | telemetry, track broadcast, heartbeat (push only) |
//! | `mode`, `in_the_air`, pilot input, `neighbor` | external (link / RC) |

use flockpilot_core::estimation::NeighborState;
use flockpilot_core::mode::{
    BatteryFailsafeLevel, DispatchOutcome, DispatchSnapshot, MavState, NavigationStatus,
    PilotInput, VehicleMode,
};
use flockpilot_core::navigation::FollowOutput;
use flockpilot_core::sensors::{
    BarometerSample, BatterySample, GpsSample, ImuSample, SensorChannel,
};
use flockpilot_core::telemetry::TelemetryQueue;
use nalgebra::Vector3;

/// Everything the tasks share
#[derive(Debug)]
pub struct VehicleState {
    pub mode: VehicleMode,
    pub mav_state: MavState,
    pub in_the_air: bool,
    pub navigation: NavigationStatus,
    pub remote_active: bool,
    pub remote: PilotInput,
    pub joystick: PilotInput,

    pub imu: SensorChannel<ImuSample>,
    pub gps: SensorChannel<GpsSample>,
    pub barometer: SensorChannel<BarometerSample>,
    pub battery: SensorChannel<BatterySample>,
    /// Latched battery failsafe level
    pub battery_failsafe: Option<BatteryFailsafeLevel>,

    /// Last state received from the followed neighbour
    pub neighbor: Option<NeighborState>,
    pub follow: Option<FollowOutput>,
    /// Distance to the followed neighbour (m)
    pub distance_to_target: f32,
    /// Time since the last neighbour message (ms)
    pub neighbor_age_ms: Option<u32>,

    pub last_dispatch: Option<DispatchOutcome>,
    pub telemetry: TelemetryQueue,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleState {
    pub fn new() -> Self {
        Self {
            mode: VehicleMode::empty(),
            mav_state: MavState::Boot,
            in_the_air: false,
            navigation: NavigationStatus::default(),
            remote_active: false,
            remote: PilotInput::default(),
            joystick: PilotInput::default(),
            imu: SensorChannel::new(),
            gps: SensorChannel::new(),
            barometer: SensorChannel::new(),
            battery: SensorChannel::new(),
            battery_failsafe: None,
            neighbor: None,
            follow: None,
            distance_to_target: 0.0,
            neighbor_age_ms: None,
            last_dispatch: None,
            telemetry: TelemetryQueue::new(),
        }
    }

    /// Capture the dispatcher inputs.
    pub fn snapshot(&self, attitude_valid: bool) -> DispatchSnapshot {
        DispatchSnapshot {
            mode: self.mode,
            mav_state: self.mav_state,
            in_the_air: self.in_the_air,
            navigation: self.navigation,
            remote_active: self.remote_active,
            remote: self.remote,
            joystick: self.joystick,
            attitude_valid,
        }
    }

    /// Own position from the last GPS fix
    pub fn own_position(&self) -> Option<Vector3<f32>> {
        self.gps
            .last_good()
            .filter(|g| g.fix)
            .map(|g| g.position)
    }

    /// Own velocity from the last GPS fix
    pub fn own_velocity(&self) -> Option<Vector3<f32>> {
        self.gps
            .last_good()
            .filter(|g| g.fix)
            .map(|g| g.velocity)
    }

    /// Message-receipt path: store the neighbour's latest state.
    pub fn receive_neighbor(&mut self, neighbor: NeighborState) {
        self.neighbor = Some(neighbor);
    }
}

/// Context passed to every task: the shared state and the HIL model
pub struct VehicleContext<M> {
    pub state: VehicleState,
    /// Vehicle model read and driven instead of the hardware in HIL mode
    pub simulation: M,
}

impl<M> VehicleContext<M> {
    pub fn new(simulation: M) -> Self {
        Self {
            state: VehicleState::new(),
            simulation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_position_requires_fix() {
        let mut state = VehicleState::new();
        assert!(state.own_position().is_none());

        let _ = state.gps.record(Ok(GpsSample {
            position: Vector3::new(1.0, 2.0, 3.0),
            ..Default::default()
        }));
        assert!(state.own_position().is_none());

        let _ = state.gps.record(Ok(GpsSample {
            position: Vector3::new(1.0, 2.0, 3.0),
            velocity: Vector3::new(0.5, 0.0, 0.0),
            satellites: 9,
            fix: true,
        }));
        assert_eq!(state.own_position(), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(state.own_velocity(), Some(Vector3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_snapshot_copies_inputs() {
        let mut state = VehicleState::new();
        state.mode = VehicleMode::ARMED | VehicleMode::AUTO;
        state.in_the_air = true;
        state.remote_active = true;

        let snapshot = state.snapshot(false);
        assert_eq!(snapshot.mode, state.mode);
        assert!(snapshot.in_the_air);
        assert!(snapshot.remote_active);
        assert!(!snapshot.attitude_valid);
    }
}
