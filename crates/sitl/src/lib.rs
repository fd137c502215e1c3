//! Software-in-the-loop support for flockpilot
//!
//! [`LightweightVehicle`] is a point-mass model driven by servo commands. It
//! implements the core `Simulation` and `ActuatorOutput` capabilities, so the
//! autopilot can fly it with HIL enabled and no hardware attached.
//! [`ScriptedNeighbor`] replays a constant-velocity neighbour track.

pub mod error;
pub mod neighbor;
pub mod vehicle;

pub use error::SimulatorError;
pub use neighbor::ScriptedNeighbor;
pub use vehicle::{LightweightConfig, LightweightVehicle};
