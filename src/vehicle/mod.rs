//! Vehicle logic: shared state, task bodies, task table and the autopilot

pub mod autopilot;
pub mod state;
pub mod table;
pub mod tasks;

pub use autopilot::{Autopilot, AutopilotConfig};
pub use state::{VehicleContext, VehicleState};
pub use table::build_task_table;
pub use tasks::TaskKind;
