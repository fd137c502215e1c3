//! Scheduler behaviour of the full vehicle task table

use flockpilot::platform::mock::{MockPlatform, MockSimulation};
use flockpilot::vehicle::table::{BAROMETER, GPS, NAVIGATION, STABILISATION, TELEMETRY};
use flockpilot::vehicle::{Autopilot, AutopilotConfig};
use flockpilot_core::traits::MockTime;

fn autopilot(time: &MockTime) -> Autopilot<MockPlatform, &MockTime> {
    Autopilot::new(
        MockPlatform::peripherals(),
        MockSimulation::new(),
        &AutopilotConfig::default(),
        time,
    )
    .unwrap()
}

#[test]
fn test_first_pass_runs_in_priority_order() {
    let time = MockTime::new();
    let mut ap = autopilot(&time);

    let mut order = Vec::new();
    while let Some(run) = ap.tick() {
        order.push(run.id);
    }
    assert_eq!(order, vec![0, 2, 3, 4, 5, 6, 7, 10, 11, 12]);
}

#[test]
fn test_absolute_deadlines_do_not_drift_under_jitter() {
    let time = MockTime::new();
    let mut ap = autopilot(&time);
    ap.run_pending();

    // Irregular wake-ups, always at or past the next stabilisation deadline
    let jitter = [0u64, 700, 1_300, 250, 3_100, 0, 1_900];
    for k in 1..200u64 {
        time.set(k * 4_000 + jitter[(k % 7) as usize]);
        ap.run_pending();

        let stab = ap.scheduler().next_due_us(STABILISATION).unwrap();
        assert_eq!(stab % 4_000, 0);
        let nav = ap.scheduler().next_due_us(NAVIGATION).unwrap();
        assert_eq!(nav % 10_000, 0);
        let gps = ap.scheduler().next_due_us(GPS).unwrap();
        assert_eq!(gps % 100_000, 0);
    }
    assert_eq!(ap.task_stats(STABILISATION).unwrap().execution_count, 200);
}

#[test]
fn test_relative_task_reschedules_from_start_time() {
    let time = MockTime::new();
    let mut ap = autopilot(&time);
    ap.run_pending();
    assert_eq!(ap.scheduler().next_due_us(BAROMETER), Some(15_000));

    // Late start: the next run is one period after the actual start
    time.set(17_500);
    ap.run_pending();
    assert_eq!(ap.scheduler().next_due_us(BAROMETER), Some(32_500));
}

#[test]
fn test_late_absolute_task_catches_up() {
    let time = MockTime::new();
    let mut ap = autopilot(&time);
    ap.run_pending();

    time.set(20_000);
    ap.run_pending();

    // Deadlines 4, 8, 12, 16 and 20 ms all ran
    assert_eq!(ap.task_stats(STABILISATION).unwrap().execution_count, 6);
    assert_eq!(ap.task_stats(TELEMETRY).unwrap().execution_count, 6);
    assert_eq!(ap.scheduler().next_due_us(STABILISATION), Some(24_000));
}

#[test]
fn test_nothing_runs_before_the_next_deadline() {
    let time = MockTime::new();
    let mut ap = autopilot(&time);
    ap.run_pending();

    time.set(3_999);
    assert!(ap.tick().is_none());
    time.set(4_000);
    assert_eq!(ap.tick().map(|r| r.id), Some(STABILISATION));
}
