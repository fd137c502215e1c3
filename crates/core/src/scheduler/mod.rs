//! Cooperative priority task scheduler
//!
//! Platform independent: the scheduler reads time through
//! [`TimeSource`](crate::traits::TimeSource) and hands a `&mut` context to
//! one task at a time. The root crate decides what the context and the task
//! bodies are, and how the loop waits between deadlines.
//!
//! # Components
//!
//! - [`types`]: Task metadata, priorities, per-task and global statistics
//! - [`table`]: Fixed-capacity task table, frozen by `finalize()`
//! - [`runner`]: The run loop (`run_update`, `run_pending`)
//! - [`error`]: Table construction errors
//!
//! # Example
//!
//! ```rust
//! use flockpilot_core::scheduler::{
//!     Priority, RunnableTask, ScheduleKind, Scheduler, TaskDescriptor, TaskMetadata,
//!     TaskStatus, TaskTable,
//! };
//! use flockpilot_core::traits::MockTime;
//!
//! struct Stabilise;
//! impl TaskDescriptor for Stabilise {
//!     fn writes_actuators(&self) -> bool {
//!         true
//!     }
//! }
//! impl RunnableTask<u32> for Stabilise {
//!     fn run(&mut self, ticks: &mut u32, _now_us: u64) -> TaskStatus {
//!         *ticks += 1;
//!         TaskStatus::Success
//!     }
//! }
//!
//! let mut table = TaskTable::new();
//! let meta = TaskMetadata::new(
//!     "stabilisation",
//!     0,
//!     4_000,
//!     ScheduleKind::PeriodicAbsolute,
//!     Priority::Highest,
//! );
//! table.register(meta, Stabilise).unwrap();
//! table.finalize().unwrap();
//!
//! let time = MockTime::new();
//! let mut scheduler = Scheduler::new(table, &time).unwrap();
//! let mut ticks = 0u32;
//! scheduler.run_update(&mut ticks);
//! assert_eq!(ticks, 1);
//! assert_eq!(scheduler.time_until_next_due(), Some(4_000));
//! ```

pub mod error;
pub mod runner;
pub mod table;
pub mod types;

pub use error::SchedulerError;
pub use runner::{Scheduler, TaskRun, MAX_RUNS_PER_PASS};
pub use table::{RunnableTask, TaskDescriptor, TaskEntry, TaskTable, MAX_TASKS};
pub use types::*;
