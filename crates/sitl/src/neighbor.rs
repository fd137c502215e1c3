//! Scripted neighbour track.
//!
//! Replays a constant-velocity vehicle and emits the state messages a real
//! neighbour would send, at a fixed message rate.

use flockpilot_core::estimation::NeighborState;
use nalgebra::Vector3;

use crate::error::SimulatorError;

/// Constant-velocity neighbour that broadcasts its state periodically
#[derive(Debug, Clone)]
pub struct ScriptedNeighbor {
    start: Vector3<f32>,
    velocity: Vector3<f32>,
    start_ms: u32,
    message_period_ms: u32,
    next_message_ms: u32,
}

impl ScriptedNeighbor {
    pub fn new(
        start: Vector3<f32>,
        velocity: Vector3<f32>,
        start_ms: u32,
        message_period_ms: u32,
    ) -> Result<Self, SimulatorError> {
        if message_period_ms == 0 {
            return Err(SimulatorError::InvalidConfig(
                "message period must be positive",
            ));
        }
        Ok(Self {
            start,
            velocity,
            start_ms,
            message_period_ms,
            next_message_ms: start_ms,
        })
    }

    /// True position at `now_ms`.
    pub fn position_at(&self, now_ms: u32) -> Vector3<f32> {
        let elapsed_s = now_ms.saturating_sub(self.start_ms) as f32 / 1_000.0;
        self.start + self.velocity * elapsed_s
    }

    /// Message received at `now_ms`, if one is due.
    pub fn poll(&mut self, now_ms: u32) -> Option<NeighborState> {
        if now_ms < self.next_message_ms {
            return None;
        }
        self.next_message_ms = now_ms + self.message_period_ms;
        Some(NeighborState::new(
            self.position_at(now_ms),
            self.velocity,
            now_ms,
        ))
    }
}
