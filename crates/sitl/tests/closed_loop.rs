//! Closed-loop follow flight against the lightweight model with HIL enabled

use flockpilot_core::actuator::{ActuatorOutput, ServoCommand};
use flockpilot_core::control::PidConfig;
use flockpilot_core::estimation::{EstimatorKind, KalmanConfig, TargetPredictor};
use flockpilot_core::mode::{
    ActuationTarget, ControlsCommand, DispatchSnapshot, FlightModeDispatcher, NavigationStatus,
    Stabiliser, VehicleMode, YawMode,
};
use flockpilot_core::navigation::{TrackFollower, VelocityController, VelocityNavConfig};
use flockpilot_core::sensors::Simulation;
use flockpilot_sitl::{LightweightConfig, LightweightVehicle, ScriptedNeighbor};
use nalgebra::Vector3;

const TICK_US: u64 = 4_000;

/// Velocity pass-through: axes scaled to the model's full deflection
struct VelocityStabiliser {
    max_speed: f32,
}

impl Stabiliser for VelocityStabiliser {
    fn stabilise(&mut self, controls: &ControlsCommand) -> ServoCommand {
        let a = controls.axes;
        let s = self.max_speed;
        ServoCommand::new([a[0] / s, a[1] / s, a[2] / s, 0.0])
    }
}

#[derive(Default)]
struct HardwareSink {
    writes: u32,
}

impl ActuatorOutput for HardwareSink {
    fn write(&mut self, _command: &ServoCommand) {
        self.writes += 1;
    }
}

fn fly(estimator: EstimatorKind, seconds: u32) -> (LightweightVehicle, ScriptedNeighbor, u32) {
    let config = LightweightConfig::deterministic(7);
    let max_speed = config.max_speed;
    let mut vehicle = LightweightVehicle::new(config).unwrap();
    let mut leader = ScriptedNeighbor::new(
        Vector3::new(20.0, 0.0, -5.0),
        Vector3::new(1.0, 0.0, 0.0),
        0,
        100,
    )
    .unwrap();

    let mut follower = TrackFollower::new(
        TargetPredictor::new(estimator, KalmanConfig::default()),
        PidConfig::default(),
        false,
    );
    let velocity = VelocityController::new(VelocityNavConfig::default());
    let mut dispatcher = FlightModeDispatcher::default();
    let mut stabiliser = VelocityStabiliser { max_speed };
    let mut hardware = HardwareSink::default();

    let mut navigation = NavigationStatus::default();
    let mut last_message = None;
    let ticks = seconds as u64 * 1_000_000 / TICK_US;
    for tick in 0..ticks {
        let now_ms = (tick * TICK_US / 1_000) as u32;
        if let Some(message) = leader.poll(now_ms) {
            last_message = Some(message);
        }

        // Navigation at 100 Hz
        if tick % 5 == 0 {
            if let Some(neighbor) = last_message {
                let own = vehicle.simulate_gps().position;
                let follow = follower.update(&neighbor, &own, now_ms);
                let cmd = velocity.update(&own, &follow.waypoint);
                navigation.controls = ControlsCommand::velocity(
                    [cmd.velocity.x, cmd.velocity.y, cmd.velocity.z],
                    cmd.heading.unwrap_or(0.0),
                    YawMode::Absolute,
                );
            }
        }

        let snapshot = DispatchSnapshot {
            mode: VehicleMode::ARMED | VehicleMode::AUTO | VehicleMode::HIL,
            in_the_air: true,
            navigation,
            ..Default::default()
        };
        let outcome = dispatcher.run(&snapshot, &mut stabiliser, &mut hardware, &mut vehicle);
        assert_eq!(outcome.target, ActuationTarget::Simulation);
        vehicle.step();
    }

    (vehicle, leader, hardware.writes)
}

#[test]
fn test_dead_reckoning_follower_closes_on_leader() {
    let (vehicle, leader, hardware_writes) = fly(EstimatorKind::DeadReckoning, 30);

    let gap = leader.position_at(30_000) - vehicle.position();
    assert!(gap.norm() < 4.0, "gap {}", gap.norm());
    assert!((vehicle.velocity().x - 1.0).abs() < 0.3);
    assert_eq!(hardware_writes, 0);
    assert_eq!(vehicle.commands(), 7_500);
}

#[test]
fn test_kalman_follower_closes_on_leader() {
    let (vehicle, leader, _) = fly(EstimatorKind::Kalman, 30);

    let gap = leader.position_at(30_000) - vehicle.position();
    assert!(gap.norm() < 4.0, "gap {}", gap.norm());
    assert!((vehicle.position().z + 5.0).abs() < 1.0);
}
