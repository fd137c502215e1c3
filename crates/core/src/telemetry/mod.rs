//! Telemetry records and the outbound queue
//!
//! Tasks pack plain records into a bounded queue; the link layer drains it.
//! Pushing never blocks: when the queue is full the oldest record is dropped
//! and counted. Wire encoding is out of scope here.

use heapless::Deque;
use nalgebra::Vector3;

use crate::mode::{MavState, VehicleMode};
use crate::sensors::BarometerSample;

/// Capacity of the outbound queue
pub const TELEMETRY_QUEUE_LEN: usize = 32;

/// Name of the follow-distance named value
pub const DIST_TO_FOLLOW_NAME: &str = "dist2follow";

/// One outbound record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryMessage {
    /// Barometer record
    ScaledPressure {
        time_boot_ms: u32,
        /// Absolute pressure (hPa)
        press_abs_hpa: f32,
        /// Vertical speed (m/s)
        vario_vz: f32,
        /// Temperature (centi-degrees Celsius)
        temperature_cdeg: i16,
    },
    /// Named float value
    NamedValueFloat {
        time_boot_ms: u32,
        name: &'static str,
        value: f32,
    },
    /// Own position and velocity, broadcast to neighbours
    NeighborTrack {
        time_boot_ms: u32,
        position: Vector3<f32>,
        velocity: Vector3<f32>,
    },
    /// Liveness beacon for neighbours and the ground station
    Heartbeat { mode: VehicleMode, state: MavState },
}

impl TelemetryMessage {
    /// Pack a barometer sample.
    pub fn scaled_pressure(sample: &BarometerSample, time_boot_ms: u32) -> Self {
        let cdeg = (sample.temperature_c * 100.0).clamp(i16::MIN as f32, i16::MAX as f32);
        TelemetryMessage::ScaledPressure {
            time_boot_ms,
            press_abs_hpa: sample.pressure_pa / 100.0,
            vario_vz: sample.vario_vz,
            temperature_cdeg: cdeg as i16,
        }
    }

    /// Pack the distance to the followed neighbour.
    pub fn dist_to_follow(distance: f32, time_boot_ms: u32) -> Self {
        TelemetryMessage::NamedValueFloat {
            time_boot_ms,
            name: DIST_TO_FOLLOW_NAME,
            value: distance,
        }
    }
}

/// Bounded, non-blocking outbound queue
#[derive(Debug)]
pub struct TelemetryQueue {
    queue: Deque<TelemetryMessage, TELEMETRY_QUEUE_LEN>,
    dropped: u32,
}

impl Default for TelemetryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryQueue {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Enqueue, dropping the oldest record when full.
    pub fn push(&mut self, message: TelemetryMessage) {
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above
        let _ = self.queue.push_back(message);
    }

    /// Oldest pending record
    pub fn pop(&mut self) -> Option<TelemetryMessage> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Records dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Pending records, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TelemetryMessage> {
        self.queue.iter()
    }
}
