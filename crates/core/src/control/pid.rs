//! PID corrector with leaky integrator and filtered differentiator
//!
//! Used by the track follower, one instance per horizontal axis, to trim the
//! estimated target position. Gains and clips are plain data so they can be
//! loaded from the parameter store (`FOLL_*`).

use libm::fabsf;

/// Below this `dt` (seconds) the derivative is forced to zero.
const MIN_DT_S: f32 = 1.0e-6;

/// Integrator configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorConfig {
    /// Gain applied to the error before accumulation
    pub pregain: f32,
    /// Gain applied to the accumulator on output
    pub postgain: f32,
    /// Symmetric accumulator limit
    pub clip: f32,
    /// Fraction of the accumulator discarded per update (0 = no leak)
    pub leakiness: f32,
}

/// Differentiator configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentiatorConfig {
    /// Derivative gain
    pub gain: f32,
    /// Low-pass blend factor in [0, 1), weight of the previous filtered value
    pub lpf: f32,
    /// Symmetric limit on the derivative term
    pub clip: f32,
}

/// Full PID configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidConfig {
    /// Proportional gain
    pub p_gain: f32,
    /// Lower output limit
    pub clip_min: f32,
    /// Upper output limit
    pub clip_max: f32,
    pub integrator: IntegratorConfig,
    pub differentiator: DifferentiatorConfig,
    /// Width of the cubic soft dead-zone on the error (0 disables it)
    pub soft_zone_width: f32,
}

impl PidConfig {
    /// Gains used to trim the followed target position.
    pub const fn follow_default() -> Self {
        Self {
            p_gain: 2.0,
            clip_min: -100.0,
            clip_max: 100.0,
            integrator: IntegratorConfig {
                pregain: 0.5,
                postgain: 0.5,
                clip: 20.0,
                leakiness: 0.0,
            },
            differentiator: DifferentiatorConfig {
                gain: 0.1,
                lpf: 0.5,
                clip: 5.0,
            },
            soft_zone_width: 0.0,
        }
    }

    /// Pure proportional controller with symmetric output clip.
    pub const fn proportional(p_gain: f32, clip: f32) -> Self {
        Self {
            p_gain,
            clip_min: -clip,
            clip_max: clip,
            integrator: IntegratorConfig {
                pregain: 0.0,
                postgain: 0.0,
                clip: 0.0,
                leakiness: 0.0,
            },
            differentiator: DifferentiatorConfig {
                gain: 0.0,
                lpf: 0.0,
                clip: 0.0,
            },
            soft_zone_width: 0.0,
        }
    }
}

impl Default for PidConfig {
    fn default() -> Self {
        Self::follow_default()
    }
}

/// Stateful PID controller
///
/// State persists between calls until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,

    // State
    accumulator: f32,
    previous_error: f32,
    filtered_derivative: f32,
    output: f32,
    last_update_us: Option<u64>,
}

impl PidController {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            previous_error: 0.0,
            filtered_derivative: 0.0,
            output: 0.0,
            last_update_us: None,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Replace the configuration, keeping the accumulated state.
    pub fn set_config(&mut self, config: PidConfig) {
        self.config = config;
    }

    /// Clear integrator, derivative history and output.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.previous_error = 0.0;
        self.filtered_derivative = 0.0;
        self.output = 0.0;
        self.last_update_us = None;
    }

    /// One step with unit time step.
    pub fn update(&mut self, error: f32) -> f32 {
        self.step(error, 1.0)
    }

    /// One step with `dt` derived from the previous call's timestamp.
    ///
    /// The first call after construction or reset uses a unit time step.
    pub fn update_at(&mut self, error: f32, now_us: u64) -> f32 {
        let dt = match self.last_update_us {
            Some(last) => now_us.saturating_sub(last) as f32 / 1_000_000.0,
            None => 1.0,
        };
        self.last_update_us = Some(now_us);
        self.step(error, dt)
    }

    /// Last computed output
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Raw integrator accumulator (before postgain)
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Error seen by the last update, after soft-zone shaping
    pub fn previous_error(&self) -> f32 {
        self.previous_error
    }

    fn step(&mut self, error: f32, dt: f32) -> f32 {
        let cfg = self.config;
        let error = soft_zone(error, cfg.soft_zone_width);

        let p_term = cfg.p_gain * error;

        // Leaky integrator, accumulator clipped before postgain
        let integ = cfg.integrator;
        self.accumulator = clip_symmetric(
            (1.0 - integ.leakiness) * self.accumulator + integ.pregain * error * dt,
            integ.clip,
        );
        let i_term = integ.postgain * self.accumulator;

        let diff = cfg.differentiator;
        let raw = if fabsf(dt) < MIN_DT_S {
            0.0
        } else {
            (error - self.previous_error) / dt
        };
        self.filtered_derivative = diff.lpf * self.filtered_derivative + (1.0 - diff.lpf) * raw;
        let d_term = clip_symmetric(diff.gain * self.filtered_derivative, diff.clip);

        self.previous_error = error;
        self.output = clip(p_term + i_term + d_term, cfg.clip_min, cfg.clip_max);
        self.output
    }
}

/// Cubic soft dead-zone: `x³ / (w² + x²)`, identity when `w` is ~0.
pub fn soft_zone(x: f32, width: f32) -> f32 {
    if width < 1.0e-7 {
        x
    } else {
        x * x * x / (width * width + x * x)
    }
}

/// Limit `value` to `[min, max]`. A NaN bound leaves that side open.
fn clip(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

fn clip_symmetric(value: f32, limit: f32) -> f32 {
    let limit = fabsf(limit);
    clip(value, -limit, limit)
}
