//! Feedback controllers

pub mod pid;

pub use pid::{DifferentiatorConfig, IntegratorConfig, PidConfig, PidController};
