//! Task bodies
//!
//! Every periodic job of the vehicle is one variant of [`TaskKind`]. Each
//! variant owns the drivers and algorithm state it needs; shared data goes
//! through the [`VehicleContext`] lent by the scheduler for the duration of
//! one run.
//!
//! ## Single writer
//!
//! The servo outputs are moved into [`StabilisationTask`] when the table is
//! built. No other task can reach them, and the task marks itself as the
//! actuation task so the table rejects any layout where it is not first.

use flockpilot_core::control::PidConfig;
use flockpilot_core::estimation::{EstimatorKind, KalmanConfig, TargetPredictor};
use flockpilot_core::mode::{
    BatteryFailsafeChecker, ControlsCommand, FlightModeDispatcher, StateMachine, YawMode,
};
use flockpilot_core::navigation::{
    elapsed_since_message_ms, TrackFollower, VelocityController, VelocityNavConfig,
};
use flockpilot_core::scheduler::{RunnableTask, TaskDescriptor, TaskStatus};
use flockpilot_core::sensors::{SensorDriver, SensorError, Simulation};
use flockpilot_core::telemetry::TelemetryMessage;

use super::state::VehicleContext;
use crate::platform::{Platform, StatusLed};
use crate::{log_debug, log_info, log_warn};

fn now_ms(now_us: u64) -> u32 {
    (now_us / 1_000) as u32
}

fn fault_name(error: SensorError) -> &'static str {
    match error {
        SensorError::BusFault => "bus fault",
        SensorError::Timeout => "timeout",
        SensorError::Implausible => "implausible value",
    }
}

/// IMU update, flight-mode dispatch and the single actuator write
pub struct StabilisationTask<P: Platform> {
    imu: P::Imu,
    stabiliser: P::Stabiliser,
    actuators: P::Actuators,
    dispatcher: FlightModeDispatcher,
}

impl<P: Platform> StabilisationTask<P> {
    pub fn new(
        imu: P::Imu,
        stabiliser: P::Stabiliser,
        actuators: P::Actuators,
        dispatcher: FlightModeDispatcher,
    ) -> Self {
        Self {
            imu,
            stabiliser,
            actuators,
            dispatcher,
        }
    }

    pub fn actuators(&self) -> &P::Actuators {
        &self.actuators
    }

    pub fn stabiliser(&self) -> &P::Stabiliser {
        &self.stabiliser
    }

    pub fn imu_mut(&mut self) -> &mut P::Imu {
        &mut self.imu
    }

    pub fn dispatcher(&self) -> &FlightModeDispatcher {
        &self.dispatcher
    }

    fn run(&mut self, ctx: &mut VehicleContext<P::Simulation>) -> TaskStatus {
        let state = &mut ctx.state;

        let read = if state.mode.is_hil() {
            Ok(ctx.simulation.simulate_imu())
        } else {
            self.imu.update()
        };
        let attitude_valid = match state.imu.record(read) {
            Ok(_) => true,
            Err(e) => {
                log_warn!(
                    "IMU read failed: {} ({} faults)",
                    fault_name(e),
                    state.imu.faults()
                );
                false
            }
        };

        let snapshot = state.snapshot(attitude_valid);
        let outcome = self.dispatcher.run(
            &snapshot,
            &mut self.stabiliser,
            &mut self.actuators,
            &mut ctx.simulation,
        );

        if state.last_dispatch.map(|d| d.branch) != Some(outcome.branch) {
            log_info!("Control branch: {}", outcome.branch.as_str());
        }
        state.last_dispatch = Some(outcome);

        if attitude_valid {
            TaskStatus::Success
        } else {
            TaskStatus::Failed
        }
    }
}

/// Barometer update
pub struct BarometerTask<P: Platform> {
    driver: P::Barometer,
}

impl<P: Platform> BarometerTask<P> {
    pub fn new(driver: P::Barometer) -> Self {
        Self { driver }
    }

    pub fn driver_mut(&mut self) -> &mut P::Barometer {
        &mut self.driver
    }

    fn run(&mut self, ctx: &mut VehicleContext<P::Simulation>) -> TaskStatus {
        let state = &mut ctx.state;
        let read = if state.mode.is_hil() {
            Ok(ctx.simulation.simulate_barometer())
        } else {
            self.driver.update()
        };
        match state.barometer.record(read) {
            Ok(_) => TaskStatus::Success,
            Err(e) => {
                log_warn!(
                    "Barometer read failed: {} ({} faults)",
                    fault_name(e),
                    state.barometer.faults()
                );
                TaskStatus::Failed
            }
        }
    }
}

/// GPS update
pub struct GpsTask<P: Platform> {
    driver: P::Gps,
}

impl<P: Platform> GpsTask<P> {
    pub fn new(driver: P::Gps) -> Self {
        Self { driver }
    }

    pub fn driver_mut(&mut self) -> &mut P::Gps {
        &mut self.driver
    }

    fn run(&mut self, ctx: &mut VehicleContext<P::Simulation>) -> TaskStatus {
        let state = &mut ctx.state;
        let read = if state.mode.is_hil() {
            Ok(ctx.simulation.simulate_gps())
        } else {
            self.driver.update()
        };
        match state.gps.record(read) {
            Ok(_) => TaskStatus::Success,
            Err(e) => {
                log_warn!(
                    "GPS read failed: {} ({} faults)",
                    fault_name(e),
                    state.gps.faults()
                );
                TaskStatus::Failed
            }
        }
    }
}

/// Track following: neighbour estimate, PID trim, velocity command
pub struct NavigationTask {
    follower: TrackFollower,
    velocity: VelocityController,
}

impl NavigationTask {
    pub fn new(follower: TrackFollower, velocity: VelocityController) -> Self {
        Self { follower, velocity }
    }

    /// Follower with the given estimator and tuning
    pub fn with_config(
        estimator: EstimatorKind,
        kalman: KalmanConfig,
        pid: PidConfig,
        pid_trim: bool,
        velocity: VelocityNavConfig,
    ) -> Self {
        Self::new(
            TrackFollower::new(TargetPredictor::new(estimator, kalman), pid, pid_trim),
            VelocityController::new(velocity),
        )
    }

    pub fn follower(&self) -> &TrackFollower {
        &self.follower
    }

    fn run<M>(&mut self, ctx: &mut VehicleContext<M>, now_us: u64) -> TaskStatus {
        let state = &mut ctx.state;
        let now = now_ms(now_us);

        let (Some(neighbor), Some(own)) = (state.neighbor, state.own_position()) else {
            // Nothing to follow: hold position, keep the last heading
            let heading = state.navigation.controls.heading;
            state.navigation.controls =
                ControlsCommand::velocity([0.0; 3], heading, YawMode::Absolute);
            state.navigation.stop_nav = true;
            // Drop the last follow result so it is not reported as current
            state.follow = None;
            state.distance_to_target = 0.0;
            state.neighbor_age_ms = None;
            return TaskStatus::Success;
        };

        let follow = self.follower.update(&neighbor, &own, now);
        let command = self.velocity.update(&own, &follow.waypoint);
        let heading = command
            .heading
            .unwrap_or(state.navigation.controls.heading);

        state.navigation.controls = ControlsCommand::velocity(
            [command.velocity.x, command.velocity.y, command.velocity.z],
            heading,
            YawMode::Absolute,
        );
        state.navigation.stop_nav = false;
        state.follow = Some(follow);
        state.distance_to_target = follow.distance_to_target();
        state.neighbor_age_ms = Some(elapsed_since_message_ms(&neighbor, now));

        log_debug!(
            "Follow: distance {} m, waypoint ({}, {}, {})",
            follow.distance_to_target(),
            follow.waypoint.x,
            follow.waypoint.y,
            follow.waypoint.z
        );
        TaskStatus::Success
    }
}

/// System state machine
pub struct StateMachineTask {
    machine: StateMachine,
}

impl StateMachineTask {
    pub fn new(machine: StateMachine) -> Self {
        Self { machine }
    }

    fn run<M>(&mut self, ctx: &mut VehicleContext<M>) -> TaskStatus {
        let state = &mut ctx.state;
        let update = self.machine.update(state.mode, state.battery_failsafe);
        state.mav_state = update.state;
        state.navigation.critical_behavior = update.critical_behavior;
        if update.changed {
            log_info!("System state: {}", update.state.as_str());
        }
        TaskStatus::Success
    }
}

/// Sub-rate of one telemetry record
#[derive(Debug, Clone, Copy)]
pub struct TelemetryStream {
    period_ms: u32,
    next_ms: Option<u32>,
}

impl TelemetryStream {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            next_ms: None,
        }
    }

    /// True once per period; the first call is always due.
    pub fn due(&mut self, now_ms: u32) -> bool {
        match self.next_ms {
            Some(next) if (now_ms.wrapping_sub(next) as i32) < 0 => false,
            _ => {
                self.next_ms = Some(now_ms.wrapping_add(self.period_ms));
                true
            }
        }
    }
}

/// Scaled pressure rate (ms)
pub const PRESSURE_STREAM_MS: u32 = 100;
/// Follow distance rate (ms)
pub const DISTANCE_STREAM_MS: u32 = 100;

/// Packs read-only state into the outbound queue
pub struct TelemetryTask {
    pressure: TelemetryStream,
    distance: TelemetryStream,
}

impl Default for TelemetryTask {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTask {
    pub const fn new() -> Self {
        Self {
            pressure: TelemetryStream::new(PRESSURE_STREAM_MS),
            distance: TelemetryStream::new(DISTANCE_STREAM_MS),
        }
    }

    fn run<M>(&mut self, ctx: &mut VehicleContext<M>, now_us: u64) -> TaskStatus {
        let state = &mut ctx.state;
        let now = now_ms(now_us);

        if self.pressure.due(now) {
            if let Some(sample) = state.barometer.last_good() {
                let record = TelemetryMessage::scaled_pressure(sample, now);
                state.telemetry.push(record);
            }
        }
        if self.distance.due(now) && state.follow.is_some() {
            let record = TelemetryMessage::dist_to_follow(state.distance_to_target, now);
            state.telemetry.push(record);
        }
        TaskStatus::Success
    }
}

/// Battery voltage monitor and failsafe latch
pub struct AnalogMonitorTask<P: Platform> {
    battery: P::Battery,
    checker: BatteryFailsafeChecker,
}

impl<P: Platform> AnalogMonitorTask<P> {
    pub fn new(battery: P::Battery, checker: BatteryFailsafeChecker) -> Self {
        Self { battery, checker }
    }

    pub fn battery_mut(&mut self) -> &mut P::Battery {
        &mut self.battery
    }

    fn run(&mut self, ctx: &mut VehicleContext<P::Simulation>) -> TaskStatus {
        let state = &mut ctx.state;
        let status = match state.battery.record(self.battery.update()) {
            Ok(sample) => {
                if let Some(level) = self.checker.check(sample.voltage, state.mode.is_armed()) {
                    log_warn!("Battery failsafe triggered at {} V", sample.voltage);
                    log_debug!("Battery failsafe level: {}", level as u8);
                }
                TaskStatus::Success
            }
            Err(e) => {
                log_warn!("Battery read failed: {}", fault_name(e));
                TaskStatus::Failed
            }
        };
        state.battery_failsafe = self.checker.level();
        status
    }
}

/// Status LED blink
pub struct StatusLedTask<P: Platform> {
    led: P::Led,
}

impl<P: Platform> StatusLedTask<P> {
    pub fn new(led: P::Led) -> Self {
        Self { led }
    }

    pub fn led(&self) -> &P::Led {
        &self.led
    }

    fn run(&mut self) -> TaskStatus {
        self.led.toggle();
        TaskStatus::Success
    }
}

fn broadcast_own_track<M>(ctx: &mut VehicleContext<M>, now_us: u64) -> TaskStatus {
    let state = &mut ctx.state;
    if let (Some(position), Some(velocity)) = (state.own_position(), state.own_velocity()) {
        state.telemetry.push(TelemetryMessage::NeighborTrack {
            time_boot_ms: now_ms(now_us),
            position,
            velocity,
        });
    }
    TaskStatus::Success
}

fn send_heartbeat<M>(ctx: &mut VehicleContext<M>) -> TaskStatus {
    let state = &mut ctx.state;
    let record = TelemetryMessage::Heartbeat {
        mode: state.mode,
        state: state.mav_state,
    };
    state.telemetry.push(record);
    TaskStatus::Success
}

/// One entry of the vehicle task table
pub enum TaskKind<P: Platform> {
    Stabilisation(StabilisationTask<P>),
    Barometer(BarometerTask<P>),
    Gps(GpsTask<P>),
    Navigation(NavigationTask),
    StateMachine(StateMachineTask),
    Telemetry(TelemetryTask),
    AnalogMonitor(AnalogMonitorTask<P>),
    StatusLed(StatusLedTask<P>),
    /// Own position and velocity for the neighbours
    TrackBroadcast,
    /// Liveness beacon for the neighbours
    Heartbeat,
}

impl<P: Platform> TaskKind<P> {
    pub fn as_stabilisation(&self) -> Option<&StabilisationTask<P>> {
        match self {
            TaskKind::Stabilisation(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_stabilisation_mut(&mut self) -> Option<&mut StabilisationTask<P>> {
        match self {
            TaskKind::Stabilisation(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_navigation(&self) -> Option<&NavigationTask> {
        match self {
            TaskKind::Navigation(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_status_led(&self) -> Option<&StatusLedTask<P>> {
        match self {
            TaskKind::StatusLed(task) => Some(task),
            _ => None,
        }
    }
}

impl<P: Platform> TaskDescriptor for TaskKind<P> {
    fn writes_actuators(&self) -> bool {
        matches!(self, TaskKind::Stabilisation(_))
    }
}

impl<P: Platform> RunnableTask<VehicleContext<P::Simulation>> for TaskKind<P> {
    fn run(&mut self, ctx: &mut VehicleContext<P::Simulation>, now_us: u64) -> TaskStatus {
        match self {
            TaskKind::Stabilisation(task) => task.run(ctx),
            TaskKind::Barometer(task) => task.run(ctx),
            TaskKind::Gps(task) => task.run(ctx),
            TaskKind::Navigation(task) => task.run(ctx, now_us),
            TaskKind::StateMachine(task) => task.run(ctx),
            TaskKind::Telemetry(task) => task.run(ctx, now_us),
            TaskKind::AnalogMonitor(task) => task.run(ctx),
            TaskKind::StatusLed(task) => task.run(),
            TaskKind::TrackBroadcast => broadcast_own_track(ctx, now_us),
            TaskKind::Heartbeat => send_heartbeat(ctx),
        }
    }
}
