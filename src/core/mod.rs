//! Core infrastructure shared by the vehicle tasks

pub mod logging;
