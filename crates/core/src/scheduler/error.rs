//! Scheduler error types

use core::fmt;

use super::types::TaskId;

/// Errors raised while building or using a task table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Table already holds `MAX_TASKS` entries
    TableFull,
    /// Registration attempted after `finalize()`
    TableFrozen,
    /// Scheduler built from a table that was never finalized
    NotFinalized,
    /// Task registered with a zero period
    ZeroPeriod {
        /// Offending task
        id: TaskId,
    },
    /// Two tasks share an identifier
    DuplicateId {
        /// Duplicated identifier
        id: TaskId,
    },
    /// No task owns the actuator write
    MissingActuationTask,
    /// More than one task claims the actuator write
    MultipleActuationTasks,
    /// The actuation task is not the first, highest-priority entry
    ActuationTaskNotFirst {
        /// Task that sorted ahead of the actuation task
        id: TaskId,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::TableFull => write!(f, "task table full"),
            SchedulerError::TableFrozen => write!(f, "task table is frozen"),
            SchedulerError::NotFinalized => write!(f, "task table not finalized"),
            SchedulerError::ZeroPeriod { id } => write!(f, "task {} has a zero period", id),
            SchedulerError::DuplicateId { id } => write!(f, "duplicate task id {}", id),
            SchedulerError::MissingActuationTask => {
                write!(f, "no task owns the actuator output")
            }
            SchedulerError::MultipleActuationTasks => {
                write!(f, "more than one task writes the actuators")
            }
            SchedulerError::ActuationTaskNotFirst { id } => write!(
                f,
                "task {} sorts ahead of the actuation task; it must be alone at highest priority",
                id
            ),
        }
    }
}
