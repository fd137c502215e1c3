//! Vehicle task table
//!
//! Built once at startup, then frozen:
//!
//! | id | task | period | kind | priority |
//! |---|---|---|---|---|
//! | 0 | stabilisation | 4 ms | absolute | Highest |
//! | 2 | barometer | 15 ms | relative | High |
//! | 3 | gps | 100 ms | absolute | High |
//! | 4 | navigation | 10 ms | absolute | High |
//! | 5 | state machine | 200 ms | absolute | Normal |
//! | 6 | telemetry | 4 ms | absolute | Normal |
//! | 7 | analog monitor | 100 ms | absolute | Low |
//! | 10 | status LED | 500 ms | absolute | Lowest |
//! | 11 | own-track broadcast | 1 s | absolute | Lowest |
//! | 12 | neighbour heartbeat | 1 s | absolute | Lowest |

use flockpilot_core::mode::{BatteryFailsafeChecker, FlightModeDispatcher, StateMachine};
use flockpilot_core::scheduler::{
    Priority, ScheduleKind, SchedulerError, TaskId, TaskMetadata, TaskTable,
};

use super::autopilot::AutopilotConfig;
use super::tasks::{
    AnalogMonitorTask, BarometerTask, GpsTask, NavigationTask, StabilisationTask,
    StateMachineTask, StatusLedTask, TaskKind, TelemetryTask,
};
use crate::platform::{Peripherals, Platform};

pub const STABILISATION: TaskId = 0;
pub const BAROMETER: TaskId = 2;
pub const GPS: TaskId = 3;
pub const NAVIGATION: TaskId = 4;
pub const STATE_MACHINE: TaskId = 5;
pub const TELEMETRY: TaskId = 6;
pub const ANALOG_MONITOR: TaskId = 7;
pub const STATUS_LED: TaskId = 10;
pub const TRACK_BROADCAST: TaskId = 11;
pub const HEARTBEAT: TaskId = 12;

use Priority::*;
use ScheduleKind::*;

/// Task metadata, in registration order
pub const TASK_METADATA: [TaskMetadata; 10] = [
    TaskMetadata::new("stabilisation", STABILISATION, 4_000, PeriodicAbsolute, Highest),
    TaskMetadata::new("barometer", BAROMETER, 15_000, PeriodicRelative, High),
    TaskMetadata::new("gps", GPS, 100_000, PeriodicAbsolute, High),
    TaskMetadata::new("navigation", NAVIGATION, 10_000, PeriodicAbsolute, High),
    TaskMetadata::new("state_machine", STATE_MACHINE, 200_000, PeriodicAbsolute, Normal),
    TaskMetadata::new("telemetry", TELEMETRY, 4_000, PeriodicAbsolute, Normal),
    TaskMetadata::new("analog", ANALOG_MONITOR, 100_000, PeriodicAbsolute, Low),
    TaskMetadata::new("status_led", STATUS_LED, 500_000, PeriodicAbsolute, Lowest),
    TaskMetadata::new("track_tx", TRACK_BROADCAST, 1_000_000, PeriodicAbsolute, Lowest),
    TaskMetadata::new("heartbeat", HEARTBEAT, 1_000_000, PeriodicAbsolute, Lowest),
];

/// Build and freeze the vehicle task table.
///
/// Each peripheral is moved into the one task that uses it.
pub fn build_task_table<P: Platform>(
    peripherals: Peripherals<P>,
    config: &AutopilotConfig,
) -> Result<TaskTable<TaskKind<P>>, SchedulerError> {
    let Peripherals {
        imu,
        gps,
        barometer,
        battery,
        stabiliser,
        actuators,
        led,
    } = peripherals;

    let [stab, baro, gps_meta, nav, state, telem, analog, status, track, heartbeat] =
        TASK_METADATA;

    let mut table = TaskTable::new();
    table.register(
        stab,
        TaskKind::Stabilisation(StabilisationTask::new(
            imu,
            stabiliser,
            actuators,
            FlightModeDispatcher::new(config.failsafe.servo_command()),
        )),
    )?;
    table.register(baro, TaskKind::Barometer(BarometerTask::new(barometer)))?;
    table.register(gps_meta, TaskKind::Gps(GpsTask::new(gps)))?;
    table.register(
        nav,
        TaskKind::Navigation(NavigationTask::with_config(
            config.track.estimator,
            config.track.kalman,
            config.follow.pid,
            config.track.pid_trim,
            config.track.velocity,
        )),
    )?;
    table.register(
        state,
        TaskKind::StateMachine(StateMachineTask::new(StateMachine::new(
            config.failsafe.low_behavior,
        ))),
    )?;
    table.register(telem, TaskKind::Telemetry(TelemetryTask::new()))?;
    table.register(
        analog,
        TaskKind::AnalogMonitor(AnalogMonitorTask::new(
            battery,
            BatteryFailsafeChecker::new(config.failsafe.battery_config()),
        )),
    )?;
    table.register(status, TaskKind::StatusLed(StatusLedTask::new(led)))?;
    table.register(track, TaskKind::TrackBroadcast)?;
    table.register(heartbeat, TaskKind::Heartbeat)?;

    table.finalize()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;

    #[test]
    fn test_table_is_priority_ordered() {
        let table =
            build_task_table(MockPlatform::peripherals(), &AutopilotConfig::default()).unwrap();
        assert!(table.is_frozen());

        let ids: heapless::Vec<TaskId, 16> = table.iter().map(|e| e.metadata.id).collect();
        assert_eq!(ids.as_slice(), &[0, 2, 3, 4, 5, 6, 7, 10, 11, 12]);

        let priorities: heapless::Vec<u8, 16> =
            table.iter().map(|e| e.metadata.priority.ordinal()).collect();
        assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_stabilisation_is_the_only_writer() {
        use flockpilot_core::scheduler::TaskDescriptor;

        let table =
            build_task_table(MockPlatform::peripherals(), &AutopilotConfig::default()).unwrap();
        let writers: heapless::Vec<TaskId, 16> = table
            .iter()
            .filter(|e| e.task.writes_actuators())
            .map(|e| e.metadata.id)
            .collect();
        assert_eq!(writers.as_slice(), &[STABILISATION]);
    }

    #[test]
    fn test_metadata_rates() {
        assert_eq!(TASK_METADATA[0].rate_hz(), 250);
        assert_eq!(TASK_METADATA[1].schedule, PeriodicRelative);
        assert!(TASK_METADATA.iter().all(|m| m.budget_us == m.period_us));
    }
}
