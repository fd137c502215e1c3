//! Cooperative priority scheduler
//!
//! Non-preemptive: each call to [`Scheduler::run_update`] runs at most one
//! due task to completion. Among due tasks the first one in table order wins,
//! which is the lowest priority ordinal with registration order breaking ties.
//! A task that overruns its period delays everything behind it; it is counted,
//! never interrupted.

use heapless::Vec;

use super::error::SchedulerError;
use super::table::{RunnableTask, TaskDescriptor, TaskTable, MAX_TASKS};
use super::types::{RunMode, ScheduleKind, SchedulerStats, TaskId, TaskStats, TaskStatus};
use crate::traits::TimeSource;

/// Upper bound on tasks executed by one `run_pending` call.
///
/// Keeps a badly stalled absolute task from monopolising a single pass while
/// it catches up; the remaining runs happen on the next call.
pub const MAX_RUNS_PER_PASS: usize = 4 * MAX_TASKS;

#[derive(Debug, Clone, Copy, Default)]
struct TaskSlot {
    next_due_us: u64,
    last_start_us: Option<u64>,
    suspended: bool,
    stats: TaskStats,
}

/// Report of one executed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRun {
    /// Task identifier
    pub id: TaskId,
    /// Task name
    pub name: &'static str,
    /// Deadline the run was scheduled for
    pub scheduled_us: u64,
    /// Actual start time
    pub started_us: u64,
    /// Execution time
    pub execution_us: u64,
    /// Status returned by the task body
    pub status: TaskStatus,
    /// Execution exceeded the task period
    pub overrun: bool,
}

impl TaskRun {
    /// Lateness of the start relative to the deadline.
    pub fn lateness_us(&self) -> u64 {
        self.started_us.saturating_sub(self.scheduled_us)
    }
}

/// Runs the tasks of a frozen [`TaskTable`] against a shared context.
pub struct Scheduler<K, T: TimeSource> {
    table: TaskTable<K>,
    slots: Vec<TaskSlot, MAX_TASKS>,
    time: T,
    stats: SchedulerStats,
    busy_us: u64,
    window_start_us: u64,
}

impl<K: TaskDescriptor, T: TimeSource> Scheduler<K, T> {
    /// Take ownership of a finalized table. Every task is due immediately.
    pub fn new(table: TaskTable<K>, time: T) -> Result<Self, SchedulerError> {
        if !table.is_frozen() {
            return Err(SchedulerError::NotFinalized);
        }
        let now = time.now_us();
        let mut slots = Vec::new();
        for _ in 0..table.len() {
            slots
                .push(TaskSlot {
                    next_due_us: now,
                    ..TaskSlot::default()
                })
                .map_err(|_| SchedulerError::TableFull)?;
        }
        Ok(Self {
            table,
            slots,
            time,
            stats: SchedulerStats::default(),
            busy_us: 0,
            window_start_us: now,
        })
    }

    /// Run the first due task, if any.
    pub fn run_update<C>(&mut self, ctx: &mut C) -> Option<TaskRun>
    where
        K: RunnableTask<C>,
    {
        let now = self.time.now_us();
        let index = self.next_due_index(now)?;
        let entry = self.table.get_mut(index)?;
        let slot = self.slots.get_mut(index)?;
        let meta = entry.metadata;

        let scheduled_us = slot.next_due_us;
        let started_us = now;
        let status = entry.task.run(ctx, started_us);
        let finished_us = self.time.now_us();
        let execution_us = finished_us.saturating_sub(started_us);

        let period_us = u64::from(meta.period_us);
        let measured_period = slot
            .last_start_us
            .map(|last| started_us.saturating_sub(last))
            .unwrap_or(period_us);
        slot.last_start_us = Some(started_us);

        match meta.run_mode {
            RunMode::Once => slot.suspended = true,
            RunMode::Regular => {
                slot.next_due_us = match meta.schedule {
                    ScheduleKind::PeriodicAbsolute => scheduled_us + period_us,
                    ScheduleKind::PeriodicRelative => finished_us + period_us,
                };
            }
        }

        slot.stats.update(
            saturate_u32(execution_us),
            saturate_u32(measured_period),
            meta.period_us,
            meta.budget_us,
        );
        if status == TaskStatus::Failed {
            slot.stats.record_failure();
        }

        self.busy_us = self.busy_us.saturating_add(execution_us);
        self.stats.total_runs = self.stats.total_runs.saturating_add(1);
        let overrun = execution_us > period_us;
        if overrun {
            self.stats.total_overruns = self.stats.total_overruns.saturating_add(1);
        }
        if execution_us > u64::from(meta.budget_us) {
            self.stats.total_deadline_misses = self.stats.total_deadline_misses.saturating_add(1);
        }

        Some(TaskRun {
            id: meta.id,
            name: meta.name,
            scheduled_us,
            started_us,
            execution_us,
            status,
            overrun,
        })
    }

    /// Run due tasks until none is due, calling `on_run` after each.
    ///
    /// Returns the number of tasks run (at most [`MAX_RUNS_PER_PASS`]).
    pub fn run_pending<C, F>(&mut self, ctx: &mut C, mut on_run: F) -> usize
    where
        K: RunnableTask<C>,
        F: FnMut(&TaskRun),
    {
        let mut runs = 0;
        while runs < MAX_RUNS_PER_PASS {
            match self.run_update(ctx) {
                Some(run) => {
                    on_run(&run);
                    runs += 1;
                }
                None => break,
            }
        }
        runs
    }

    /// Time until the earliest deadline, zero when something is already due.
    ///
    /// `None` when every task is suspended.
    pub fn time_until_next_due(&self) -> Option<u64> {
        let now = self.time.now_us();
        self.slots
            .iter()
            .filter(|s| !s.suspended)
            .map(|s| s.next_due_us.saturating_sub(now))
            .min()
    }

    /// Next deadline of the task with `id`.
    pub fn next_due_us(&self, id: TaskId) -> Option<u64> {
        let index = self.table.find(id)?;
        self.slots.get(index).map(|s| s.next_due_us)
    }

    /// Statistics of the task with `id`.
    pub fn task_stats(&self, id: TaskId) -> Option<&TaskStats> {
        let index = self.table.find(id)?;
        self.slots.get(index).map(|s| &s.stats)
    }

    /// True while the task is eligible to run.
    pub fn is_active(&self, id: TaskId) -> bool {
        self.table
            .find(id)
            .and_then(|i| self.slots.get(i))
            .map(|s| !s.suspended)
            .unwrap_or(false)
    }

    /// Stop scheduling a task until `resume`.
    pub fn suspend(&mut self, id: TaskId) -> bool {
        match self.table.find(id).and_then(|i| self.slots.get_mut(i)) {
            Some(slot) => {
                slot.suspended = true;
                true
            }
            None => false,
        }
    }

    /// Make a suspended task due immediately.
    pub fn resume(&mut self, id: TaskId) -> bool {
        let now = self.time.now_us();
        match self.table.find(id).and_then(|i| self.slots.get_mut(i)) {
            Some(slot) => {
                slot.suspended = false;
                slot.next_due_us = now;
                true
            }
            None => false,
        }
    }

    /// Task body with `id`.
    pub fn task(&self, id: TaskId) -> Option<&K> {
        let index = self.table.find(id)?;
        self.table.get(index).map(|e| &e.task)
    }

    /// Mutable task body with `id`.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut K> {
        let index = self.table.find(id)?;
        self.table.get_mut(index).map(|e| &mut e.task)
    }

    /// The frozen table.
    pub fn table(&self) -> &TaskTable<K> {
        &self.table
    }

    /// Clock driving the scheduler.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Global statistics.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Close the current CPU load window and start a new one.
    pub fn sample_cpu_load(&mut self) -> u8 {
        let now = self.time.now_us();
        let window = now.saturating_sub(self.window_start_us);
        self.stats.update_cpu_load(self.busy_us, window);
        self.stats
            .update_from_tasks(self.slots.iter().map(|s| &s.stats));
        self.busy_us = 0;
        self.window_start_us = now;
        self.stats.cpu_load_percent
    }

    fn next_due_index(&self, now: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.suspended && s.next_due_us <= now)
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
