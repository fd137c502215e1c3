//! Fixed-capacity task table
//!
//! Tasks are registered once at startup, then `finalize()` sorts them by
//! (priority, registration order) and freezes the table. Exactly one entry
//! may drive the actuators; it must sort first at `Priority::Highest`.

use heapless::Vec;

use super::error::SchedulerError;
use super::types::{Priority, TaskId, TaskMetadata, TaskStatus};

/// Maximum number of tasks in a table
pub const MAX_TASKS: usize = 16;

/// Static role of a task, independent of the context it runs against.
pub trait TaskDescriptor {
    /// True for the single task allowed to write the actuators.
    fn writes_actuators(&self) -> bool {
        false
    }
}

/// A task body that runs against a shared context `C`.
///
/// Implementations must return promptly: the scheduler is cooperative and a
/// task that never returns stalls every other task.
pub trait RunnableTask<C>: TaskDescriptor {
    /// Execute one iteration.
    fn run(&mut self, ctx: &mut C, now_us: u64) -> TaskStatus;
}

/// One registered task.
#[derive(Debug)]
pub struct TaskEntry<K> {
    /// Static description
    pub metadata: TaskMetadata,
    /// Task body with its captured state
    pub task: K,
    registration: u16,
}

impl<K> TaskEntry<K> {
    /// Position at registration time.
    pub fn registration_index(&self) -> u16 {
        self.registration
    }
}

/// Ordered set of tasks owned by the scheduler.
#[derive(Debug)]
pub struct TaskTable<K> {
    entries: Vec<TaskEntry<K>, MAX_TASKS>,
    frozen: bool,
}

impl<K> Default for TaskTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TaskTable<K> {
    /// Empty, unfrozen table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            frozen: false,
        }
    }

    /// Add a task. Only allowed before `finalize()`.
    pub fn register(&mut self, metadata: TaskMetadata, task: K) -> Result<(), SchedulerError> {
        if self.frozen {
            return Err(SchedulerError::TableFrozen);
        }
        if metadata.period_us == 0 {
            return Err(SchedulerError::ZeroPeriod { id: metadata.id });
        }
        if self.find(metadata.id).is_some() {
            return Err(SchedulerError::DuplicateId { id: metadata.id });
        }

        let registration = self.entries.len() as u16;
        self.entries
            .push(TaskEntry {
                metadata,
                task,
                registration,
            })
            .map_err(|_| SchedulerError::TableFull)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no task has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once `finalize()` succeeded
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Index of the task with `id`
    pub fn find(&self, id: TaskId) -> Option<usize> {
        self.entries.iter().position(|e| e.metadata.id == id)
    }

    /// Entry at `index` (table order)
    pub fn get(&self, index: usize) -> Option<&TaskEntry<K>> {
        self.entries.get(index)
    }

    /// Mutable entry at `index` (table order)
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TaskEntry<K>> {
        self.entries.get_mut(index)
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &TaskEntry<K>> {
        self.entries.iter()
    }
}

impl<K: TaskDescriptor> TaskTable<K> {
    /// Sort by (priority, registration order) and freeze.
    ///
    /// Fails, leaving the table unfrozen, when the actuation task is missing,
    /// duplicated, or not first at `Priority::Highest`.
    pub fn finalize(&mut self) -> Result<(), SchedulerError> {
        if self.frozen {
            return Err(SchedulerError::TableFrozen);
        }

        // Registration index is unique, so an unstable sort is deterministic.
        self.entries
            .sort_unstable_by_key(|e| (e.metadata.priority, e.registration));

        let writers = self
            .entries
            .iter()
            .filter(|e| e.task.writes_actuators())
            .count();
        match writers {
            0 => return Err(SchedulerError::MissingActuationTask),
            1 => {}
            _ => return Err(SchedulerError::MultipleActuationTasks),
        }

        if let Some(first) = self.entries.first() {
            if !first.task.writes_actuators() || first.metadata.priority != Priority::Highest {
                return Err(SchedulerError::ActuationTaskNotFirst {
                    id: first.metadata.id,
                });
            }
        }
        if let Some(second) = self.entries.get(1) {
            if second.metadata.priority == Priority::Highest {
                return Err(SchedulerError::ActuationTaskNotFirst {
                    id: second.metadata.id,
                });
            }
        }

        self.frozen = true;
        Ok(())
    }
}
