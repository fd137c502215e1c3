//! Autopilot: the scheduler, its task table and the shared context

use flockpilot_core::parameters::{
    FailsafeParams, FollowParams, ParameterError, ParameterStore, TrackParams,
};
use flockpilot_core::scheduler::{
    Scheduler, SchedulerError, TaskId, TaskRun, TaskStats, TaskStatus,
};
use flockpilot_core::traits::TimeSource;

use super::state::{VehicleContext, VehicleState};
use super::table::build_task_table;
use super::tasks::TaskKind;
use crate::platform::{Peripherals, Platform};
use crate::{log_debug, log_info, log_warn};

/// Tunable configuration, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutopilotConfig {
    pub follow: FollowParams,
    pub track: TrackParams,
    pub failsafe: FailsafeParams,
}

impl AutopilotConfig {
    /// Load every group, falling back to defaults for missing entries
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            follow: FollowParams::from_store(store),
            track: TrackParams::from_store(store),
            failsafe: FailsafeParams::from_store(store),
        }
    }

    /// Store with every parameter registered at its default
    pub fn default_store() -> Result<ParameterStore, ParameterError> {
        let mut store = ParameterStore::new();
        flockpilot_core::parameters::register_all(&mut store)?;
        Ok(store)
    }
}

/// Running vehicle
pub struct Autopilot<P: Platform, T: TimeSource> {
    scheduler: Scheduler<TaskKind<P>, T>,
    context: VehicleContext<P::Simulation>,
}

impl<P: Platform, T: TimeSource> Autopilot<P, T> {
    /// Build the task table and take ownership of the drivers.
    pub fn new(
        peripherals: Peripherals<P>,
        simulation: P::Simulation,
        config: &AutopilotConfig,
        time: T,
    ) -> Result<Self, SchedulerError> {
        let table = build_task_table(peripherals, config)?;
        let scheduler = Scheduler::new(table, time)?;
        log_info!(
            "Autopilot started: {} tasks, estimator {}",
            scheduler.table().len(),
            config.track.estimator as u8
        );
        Ok(Self {
            scheduler,
            context: VehicleContext::new(simulation),
        })
    }

    /// Run the first due task, if any.
    pub fn tick(&mut self) -> Option<TaskRun> {
        let run = self.scheduler.run_update(&mut self.context)?;
        report(&run);
        Some(run)
    }

    /// Run every due task.
    pub fn run_pending(&mut self) -> usize {
        self.scheduler.run_pending(&mut self.context, report)
    }

    pub fn state(&self) -> &VehicleState {
        &self.context.state
    }

    /// Shared state, for the link and RC input paths
    pub fn state_mut(&mut self) -> &mut VehicleState {
        &mut self.context.state
    }

    pub fn simulation(&self) -> &P::Simulation {
        &self.context.simulation
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskKind<P>> {
        self.scheduler.task(id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut TaskKind<P>> {
        self.scheduler.task_mut(id)
    }

    pub fn task_stats(&self, id: TaskId) -> Option<&TaskStats> {
        self.scheduler.task_stats(id)
    }

    pub fn scheduler(&self) -> &Scheduler<TaskKind<P>, T> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<TaskKind<P>, T> {
        &mut self.scheduler
    }
}

#[cfg(feature = "embedded")]
impl<P: Platform> Autopilot<P, crate::platform::embassy::EmbassyTime> {
    /// Run the schedule forever, sleeping until the next deadline.
    pub async fn run_forever(&mut self) -> ! {
        use embassy_time::{Duration, Timer};

        let mut last_load_sample_us = 0u64;
        loop {
            self.run_pending();

            let now_us = embassy_time::Instant::now().as_micros();
            if now_us.saturating_sub(last_load_sample_us) >= 1_000_000 {
                let load = self.scheduler.sample_cpu_load();
                log_debug!("CPU load {}%", load);
                last_load_sample_us = now_us;
            }

            match self.scheduler.time_until_next_due() {
                Some(0) => {}
                Some(wait_us) => Timer::after(Duration::from_micros(wait_us)).await,
                None => Timer::after(Duration::from_millis(100)).await,
            }
        }
    }
}

fn report(run: &TaskRun) {
    if run.overrun {
        log_warn!(
            "Task {} ({}) overran: {} us",
            run.name,
            run.id,
            run.execution_us
        );
    }
    if run.status == TaskStatus::Failed {
        log_debug!("Task {} failed", run.name);
    }
}
