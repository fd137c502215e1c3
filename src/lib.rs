#![cfg_attr(not(test), no_std)]

//! flockpilot - Cooperative autopilot with neighbour track following
//!
//! This crate wires the pure logic of [`flockpilot_core`] into a running
//! vehicle: the task table, the shared vehicle context, the platform
//! capabilities and the logging macros.

// Platform abstraction: sensors, actuators, simulation, status LED
pub mod platform;

// Core infrastructure (logging)
pub mod core;

// Vehicle context, task bodies and the autopilot loop
pub mod vehicle;

pub use flockpilot_core;
