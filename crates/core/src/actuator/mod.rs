//! Servo command type and the actuator output capability
//!
//! A [`ServoCommand`] holds one normalized value (-1.0 to +1.0) per output
//! channel. It is produced by the stabilisation cascade (or the failsafe
//! branch) and written exactly once per stabilisation tick through
//! [`ActuatorOutput`].
//!
//! ## Safety
//!
//! **CRITICAL**: only the stabilisation task may hold an `ActuatorOutput`.
//! The root crate enforces this by moving the hardware sink into that task
//! when the task table is built.

/// Number of servo/motor output channels
pub const NUM_SERVOS: usize = 4;

/// Normalized value for a channel in failsafe (motors stopped)
pub const FAILSAFE_VALUE: f32 = -1.0;

/// Normalized command for every output channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoCommand {
    /// Channel values, -1.0 to +1.0
    pub channels: [f32; NUM_SERVOS],
}

impl ServoCommand {
    pub const fn new(channels: [f32; NUM_SERVOS]) -> Self {
        Self { channels }
    }

    /// Every channel at its failsafe value.
    pub const fn failsafe() -> Self {
        Self {
            channels: [FAILSAFE_VALUE; NUM_SERVOS],
        }
    }

    /// Same value on every channel.
    pub const fn uniform(value: f32) -> Self {
        Self {
            channels: [value; NUM_SERVOS],
        }
    }

    /// Copy with every channel clamped to [-1, 1]; NaN becomes failsafe.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for value in out.channels.iter_mut() {
            *value = if value.is_nan() {
                FAILSAFE_VALUE
            } else {
                value.clamp(-1.0, 1.0)
            };
        }
        out
    }

    /// Pulse widths (µs) for every channel.
    pub fn to_pulses(&self, calibration: &PulseCalibration) -> [u16; NUM_SERVOS] {
        let mut pulses = [calibration.neutral; NUM_SERVOS];
        for (pulse, value) in pulses.iter_mut().zip(self.channels.iter()) {
            *pulse = normalized_to_pulse(
                *value,
                calibration.min,
                calibration.neutral,
                calibration.max,
            );
        }
        pulses
    }
}

impl Default for ServoCommand {
    fn default() -> Self {
        Self::failsafe()
    }
}

/// Sink for servo commands
///
/// `write` is infallible from the caller's point of view: a hardware fault
/// is the implementation's to log.
pub trait ActuatorOutput {
    /// Apply one command to every channel.
    fn write(&mut self, command: &ServoCommand);
}

impl<A: ActuatorOutput + ?Sized> ActuatorOutput for &mut A {
    fn write(&mut self, command: &ServoCommand) {
        (**self).write(command);
    }
}

/// PWM calibration shared by all channels (pulse widths in µs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCalibration {
    pub min: u16,     // Default: 1000
    pub neutral: u16, // Default: 1500
    pub max: u16,     // Default: 2000
}

impl Default for PulseCalibration {
    fn default() -> Self {
        Self {
            min: 1000,
            neutral: 1500,
            max: 2000,
        }
    }
}

/// Convert normalized value to PWM pulse width (microseconds)
///
/// Negative values interpolate between `min` and `neutral`, positive values
/// between `neutral` and `max`. NaN maps to `min`.
pub fn normalized_to_pulse(normalized: f32, min: u16, neutral: u16, max: u16) -> u16 {
    if normalized.is_nan() {
        return min;
    }
    let clamped = normalized.clamp(-1.0, 1.0);

    if clamped < 0.0 {
        let range = neutral.saturating_sub(min) as f32;
        let offset = range * (-clamped);
        neutral.saturating_sub(offset as u16)
    } else {
        let range = max.saturating_sub(neutral) as f32;
        let offset = range * clamped;
        neutral.saturating_add(offset as u16)
    }
}
