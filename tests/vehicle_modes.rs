//! Mode-dependent routing and failsafe behaviour of the running vehicle

use flockpilot::platform::mock::{MockPlatform, MockSimulation};
use flockpilot::vehicle::table::STABILISATION;
use flockpilot::vehicle::{Autopilot, AutopilotConfig};
use flockpilot_core::actuator::ServoCommand;
use flockpilot_core::mode::{
    ActuationTarget, BatteryFailsafeLevel, ControlBranch, CriticalBehavior, MavState,
    VehicleMode,
};
use flockpilot_core::sensors::{BatterySample, SensorError};
use flockpilot_core::traits::MockTime;

fn run_ticks(ap: &mut Autopilot<MockPlatform, &MockTime>, time: &MockTime, ticks: u32) {
    for _ in 0..ticks {
        ap.run_pending();
        time.advance(4_000);
    }
}

fn autopilot_with(
    time: &MockTime,
    peripherals: flockpilot::platform::Peripherals<MockPlatform>,
) -> Autopilot<MockPlatform, &MockTime> {
    Autopilot::new(
        peripherals,
        MockSimulation::new(),
        &AutopilotConfig::default(),
        time,
    )
    .unwrap()
}

#[test]
fn test_hil_routes_sensors_and_actuation_to_simulation() {
    let time = MockTime::new();
    let mut ap = autopilot_with(&time, MockPlatform::peripherals());
    ap.state_mut().mode = VehicleMode::ARMED | VehicleMode::MANUAL | VehicleMode::HIL;

    run_ticks(&mut ap, &time, 25);

    assert_eq!(ap.simulation().writes(), 25);
    assert!(ap.simulation().sensor_reads() >= 25);
    let outcome = ap.state().last_dispatch.unwrap();
    assert_eq!(outcome.target, ActuationTarget::Simulation);
    assert_eq!(outcome.branch, ControlBranch::Manual);

    let stab = ap
        .task(STABILISATION)
        .and_then(|t| t.as_stabilisation())
        .unwrap();
    assert_eq!(stab.actuators().writes(), 0);
}

#[test]
fn test_leaving_hil_switches_back_to_hardware() {
    let time = MockTime::new();
    let mut ap = autopilot_with(&time, MockPlatform::peripherals());
    ap.state_mut().mode = VehicleMode::ARMED | VehicleMode::MANUAL | VehicleMode::HIL;
    run_ticks(&mut ap, &time, 5);

    ap.state_mut().mode.remove(VehicleMode::HIL);
    run_ticks(&mut ap, &time, 5);

    let stab = ap
        .task(STABILISATION)
        .and_then(|t| t.as_stabilisation())
        .unwrap();
    assert_eq!(ap.simulation().writes(), 5);
    assert_eq!(stab.actuators().writes(), 5);
}

#[test]
fn test_critical_battery_escalates_to_emergency() {
    let time = MockTime::new();
    let mut peripherals = MockPlatform::peripherals();
    peripherals.battery.set_default(BatterySample { voltage: 9.0 });
    let mut ap = autopilot_with(&time, peripherals);
    ap.state_mut().mode = VehicleMode::ARMED | VehicleMode::MANUAL;

    // First pass: state machine runs before the analog monitor
    run_ticks(&mut ap, &time, 1);
    assert_eq!(ap.state().mav_state, MavState::Active);
    assert_eq!(
        ap.state().battery_failsafe,
        Some(BatteryFailsafeLevel::Critical)
    );

    // Next state machine run at 200 ms
    run_ticks(&mut ap, &time, 50);
    assert_eq!(ap.state().mav_state, MavState::Emergency);
    assert_eq!(
        ap.state().navigation.critical_behavior,
        CriticalBehavior::CriticalLand
    );
}

#[test]
fn test_disarming_forces_failsafe_output() {
    let time = MockTime::new();
    let mut ap = autopilot_with(&time, MockPlatform::peripherals());
    ap.state_mut().mode = VehicleMode::ARMED | VehicleMode::MANUAL;
    run_ticks(&mut ap, &time, 5);
    assert!(ap.state().last_dispatch.unwrap().stabilised);

    ap.state_mut().mode.remove(VehicleMode::ARMED);
    run_ticks(&mut ap, &time, 1);

    let outcome = ap.state().last_dispatch.unwrap();
    assert_eq!(outcome.branch, ControlBranch::Failsafe);
    assert_eq!(outcome.servos, ServoCommand::failsafe());
    assert!(!outcome.stabilised);
}

#[test]
fn test_imu_fault_holds_the_last_command() {
    let time = MockTime::new();
    let mut ap = autopilot_with(&time, MockPlatform::peripherals());
    ap.state_mut().mode = VehicleMode::ARMED | VehicleMode::MANUAL;
    ap.state_mut().joystick.thrust = 0.4;
    run_ticks(&mut ap, &time, 3);
    let held = ap.state().last_dispatch.unwrap().servos;

    ap.state_mut().joystick.thrust = 0.9;
    if let Some(stab) = ap
        .task_mut(STABILISATION)
        .and_then(|t| t.as_stabilisation_mut())
    {
        stab.imu_mut().set_fault(Some(SensorError::Timeout));
    }
    run_ticks(&mut ap, &time, 3);

    let outcome = ap.state().last_dispatch.unwrap();
    assert!(!outcome.stabilised);
    assert_eq!(outcome.servos, held);
    assert_eq!(ap.task_stats(STABILISATION).unwrap().failures, 3);

    let stab = ap
        .task(STABILISATION)
        .and_then(|t| t.as_stabilisation())
        .unwrap();
    assert_eq!(stab.actuators().writes(), 6);
}
