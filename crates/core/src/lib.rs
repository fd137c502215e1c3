//! flockpilot_core - Pure no_std logic for the flockpilot autopilot
//!
//! This crate contains platform-agnostic algorithms and types that can be
//! tested on host without any feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies, no allocation
//! - **Trait abstractions**: Time, sensors, actuators and simulation are
//!   injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Time source abstraction
//! - [`scheduler`]: Cooperative priority task scheduler
//! - [`control`]: PID corrector
//! - [`estimation`]: Dead-reckoning and Kalman target estimators
//! - [`navigation`]: Track following and waypoint velocity control
//! - [`mode`]: Mode flags, control dispatch, state machine
//! - [`actuator`]: Servo command and actuator output capability
//! - [`sensors`]: Sensor samples, driver and simulation capabilities
//! - [`telemetry`]: Telemetry records and outbound queue
//! - [`parameters`]: Parameter store and parameter groups

#![no_std]

pub mod actuator;
pub mod control;
pub mod estimation;
pub mod mode;
pub mod navigation;
pub mod parameters;
pub mod scheduler;
pub mod sensors;
pub mod telemetry;
pub mod traits;
