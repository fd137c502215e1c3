//! Platform-agnostic trait abstractions.
//!
//! Trait definitions here carry no feature gates. Mock implementations are
//! always available so the rest of the workspace can be exercised on the
//! host; the Embassy-backed implementation lives in the root crate.

pub mod time;

pub use time::{MockTime, TimeSource};
