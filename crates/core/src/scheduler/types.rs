//! Core types for the cooperative task scheduler
//!
//! - Task metadata (period, priority, schedule kind) fixed at table build
//! - Task statistics (runtime monitoring, overrun detection)
//! - Scheduler statistics (global metrics)

/// Stable numeric task identifier, used for logging and lookups.
pub type TaskId = u16;

/// Task priority level.
///
/// Lower ordinal runs first when several tasks are due at the same tick.
/// The stabilisation task is always `Highest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Highest = 0,
    High = 1,
    Normal = 2,
    Low = 3,
    Lowest = 4,
}

impl Priority {
    /// Ordinal used for ordering (0 = scheduled first).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Name for logging and telemetry.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Highest => "highest",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Lowest => "lowest",
        }
    }
}

/// How the next deadline of a periodic task is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// `next = last scheduled deadline + period`. Never drifts; a task that
    /// fell behind is run back-to-back until it has caught up.
    PeriodicAbsolute,
    /// `next = last completion + period`. Drifts under overrun but keeps a
    /// guaranteed minimum spacing between runs.
    PeriodicRelative,
}

/// Whether a task keeps running after its first execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Rescheduled after every run.
    Regular,
    /// Runs once, then stays suspended.
    Once,
}

/// Outcome reported by a task body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Success,
    Failed,
}

/// Static description of a scheduled task.
///
/// Built once when the task table is assembled; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,

    /// Stable identifier (unique within a table)
    pub id: TaskId,

    /// Period in microseconds
    pub period_us: u32,

    /// Deadline computation rule
    pub schedule: ScheduleKind,

    /// Scheduling priority
    pub priority: Priority,

    /// Regular or one-shot
    pub run_mode: RunMode,

    /// Execution time budget in microseconds
    ///
    /// Exceeding it counts as a deadline miss. Defaults to the period.
    pub budget_us: u32,
}

impl TaskMetadata {
    /// Regular task whose budget equals its period.
    pub const fn new(
        name: &'static str,
        id: TaskId,
        period_us: u32,
        schedule: ScheduleKind,
        priority: Priority,
    ) -> Self {
        Self {
            name,
            id,
            period_us,
            schedule,
            priority,
            run_mode: RunMode::Regular,
            budget_us: period_us,
        }
    }

    /// Override the execution budget.
    pub const fn with_budget(mut self, budget_us: u32) -> Self {
        self.budget_us = budget_us;
        self
    }

    /// Override the run mode.
    pub const fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    /// Nominal rate in Hz (0 for a zero period).
    #[inline]
    pub const fn rate_hz(&self) -> u32 {
        if self.period_us == 0 {
            0
        } else {
            1_000_000 / self.period_us
        }
    }

    /// Check if execution time is within budget
    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }

    /// Check if period deviation is within 5% of the nominal period
    #[inline]
    pub fn is_period_acceptable(&self, actual_period_us: u32) -> bool {
        let target = self.period_us;
        let tolerance = target / 20;
        let lower = target.saturating_sub(tolerance);
        let upper = target.saturating_add(tolerance);
        actual_period_us >= lower && actual_period_us <= upper
    }
}

/// Runtime statistics for a single task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Last execution time in microseconds
    pub last_execution_us: u32,

    /// Average execution time in microseconds (EMA, alpha = 0.1)
    pub avg_execution_us: u32,

    /// Maximum execution time observed in microseconds
    pub max_execution_us: u32,

    /// Number of runs whose execution time exceeded the budget
    pub deadline_misses: u32,

    /// Number of runs whose execution time exceeded the period
    pub overruns: u32,

    /// Number of runs that reported `TaskStatus::Failed`
    pub failures: u32,

    /// Last measured period in microseconds (start-to-start)
    pub last_period_us: u32,

    /// Average jitter in microseconds (EMA of deviation from the period)
    pub avg_jitter_us: u32,

    /// Total number of executions
    pub execution_count: u64,
}

impl TaskStats {
    /// Record one execution.
    ///
    /// # Arguments
    ///
    /// * `execution_us` - Duration of the task execution in microseconds
    /// * `period_us` - Time since the previous start in microseconds
    /// * `target_period_us` - Nominal period
    /// * `budget_us` - Maximum allowed execution time
    pub fn update(
        &mut self,
        execution_us: u32,
        period_us: u32,
        target_period_us: u32,
        budget_us: u32,
    ) {
        self.last_execution_us = execution_us;
        self.last_period_us = period_us;
        self.execution_count = self.execution_count.saturating_add(1);

        // Fixed-point EMA: avg_new = (value + 9 * avg_old) / 10
        if self.avg_execution_us == 0 {
            self.avg_execution_us = execution_us;
        } else {
            self.avg_execution_us =
                ((execution_us as u64 + 9 * self.avg_execution_us as u64) / 10) as u32;
        }

        if execution_us > self.max_execution_us {
            self.max_execution_us = execution_us;
        }

        if execution_us > budget_us {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }

        if execution_us > target_period_us {
            self.overruns = self.overruns.saturating_add(1);
        }

        let jitter = period_us.abs_diff(target_period_us);
        if self.avg_jitter_us == 0 {
            self.avg_jitter_us = jitter;
        } else {
            self.avg_jitter_us = ((jitter as u64 + 9 * self.avg_jitter_us as u64) / 10) as u32;
        }
    }

    /// Count a failed run.
    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Global scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// CPU load as percentage (0-100)
    pub cpu_load_percent: u8,

    /// Total deadline misses across all tasks
    pub total_deadline_misses: u32,

    /// Total overruns across all tasks
    pub total_overruns: u32,

    /// Total task executions
    pub total_runs: u64,
}

impl SchedulerStats {
    /// Update CPU load from busy time over a measurement window.
    pub fn update_cpu_load(&mut self, total_execution_us: u64, window_us: u64) {
        if window_us > 0 {
            let load = (total_execution_us * 100) / window_us;
            self.cpu_load_percent = load.min(100) as u8;
        }
    }

    /// Re-aggregate the per-task counters.
    pub fn update_from_tasks<'a>(&mut self, tasks: impl Iterator<Item = &'a TaskStats>) {
        let mut misses = 0u32;
        let mut overruns = 0u32;
        for stats in tasks {
            misses = misses.saturating_add(stats.deadline_misses);
            overruns = overruns.saturating_add(stats.overruns);
        }
        self.total_deadline_misses = misses;
        self.total_overruns = overruns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stabilisation() -> TaskMetadata {
        TaskMetadata::new(
            "stabilisation",
            0,
            4_000,
            ScheduleKind::PeriodicAbsolute,
            Priority::Highest,
        )
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Highest < Priority::High);
        assert!(Priority::High < Priority::Normal);
        assert!(Priority::Low < Priority::Lowest);
        assert_eq!(Priority::Highest.ordinal(), 0);
        assert_eq!(Priority::Lowest.ordinal(), 4);
    }

    #[test]
    fn test_metadata_defaults() {
        let task = stabilisation();
        assert_eq!(task.run_mode, RunMode::Regular);
        assert_eq!(task.budget_us, 4_000);
        assert_eq!(task.rate_hz(), 250);
    }

    #[test]
    fn test_metadata_builders() {
        let task = stabilisation()
            .with_budget(3_000)
            .with_run_mode(RunMode::Once);
        assert_eq!(task.budget_us, 3_000);
        assert_eq!(task.run_mode, RunMode::Once);
        assert!(task.is_within_budget(3_000));
        assert!(!task.is_within_budget(3_001));
    }

    #[test]
    fn test_period_tolerance() {
        let task = stabilisation(); // 5% of 4000us = 200us
        assert!(task.is_period_acceptable(4_000));
        assert!(task.is_period_acceptable(3_800));
        assert!(task.is_period_acceptable(4_200));
        assert!(!task.is_period_acceptable(3_700));
        assert!(!task.is_period_acceptable(4_300));
    }

    #[test]
    fn test_zero_period_rate() {
        let task = TaskMetadata::new(
            "broken",
            1,
            0,
            ScheduleKind::PeriodicRelative,
            Priority::Low,
        );
        assert_eq!(task.rate_hz(), 0);
    }

    #[test]
    fn test_task_stats_update() {
        let mut stats = TaskStats::default();

        stats.update(1_500, 4_000, 4_000, 2_000);
        assert_eq!(stats.avg_execution_us, 1_500);
        assert_eq!(stats.deadline_misses, 0);
        assert_eq!(stats.overruns, 0);
        assert_eq!(stats.execution_count, 1);

        stats.update(1_600, 4_000, 4_000, 2_000);
        assert_eq!(stats.avg_execution_us, (1_600 + 9 * 1_500) / 10);
        assert_eq!(stats.max_execution_us, 1_600);

        // Over budget but within the period
        stats.update(2_500, 4_000, 4_000, 2_000);
        assert_eq!(stats.deadline_misses, 1);
        assert_eq!(stats.overruns, 0);

        // Longer than the period
        stats.update(5_000, 4_000, 4_000, 2_000);
        assert_eq!(stats.deadline_misses, 2);
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.execution_count, 4);
    }

    #[test]
    fn test_task_stats_jitter() {
        let mut stats = TaskStats::default();
        stats.update(100, 4_000, 4_000, 4_000);
        assert_eq!(stats.avg_jitter_us, 0);

        stats.update(100, 4_100, 4_000, 4_000);
        assert_eq!(stats.avg_jitter_us, 100);

        stats.update(100, 3_950, 4_000, 4_000);
        assert_eq!(stats.avg_jitter_us, (50 + 9 * 100) / 10);
    }

    #[test]
    fn test_task_stats_failures_and_reset() {
        let mut stats = TaskStats::default();
        stats.record_failure();
        stats.update(10, 100, 100, 100);
        assert_eq!(stats.failures, 1);
        stats.reset();
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn test_scheduler_stats_cpu_load() {
        let mut stats = SchedulerStats::default();
        stats.update_cpu_load(500, 1_000);
        assert_eq!(stats.cpu_load_percent, 50);
        stats.update_cpu_load(1_200, 1_000);
        assert_eq!(stats.cpu_load_percent, 100);
        stats.update_cpu_load(10, 0);
        assert_eq!(stats.cpu_load_percent, 100);
    }

    #[test]
    fn test_scheduler_stats_aggregation() {
        let tasks = [
            TaskStats {
                deadline_misses: 5,
                overruns: 1,
                ..Default::default()
            },
            TaskStats {
                deadline_misses: 3,
                overruns: 2,
                ..Default::default()
            },
        ];
        let mut stats = SchedulerStats::default();
        stats.update_from_tasks(tasks.iter());
        assert_eq!(stats.total_deadline_misses, 8);
        assert_eq!(stats.total_overruns, 3);
    }
}
