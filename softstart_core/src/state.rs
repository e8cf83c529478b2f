//! Ramp state and the per-step interpolation laws.

use crate::config::RampMode;

/// Direction fixed at ramp start: `Up` iff `start < target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn between(start: f64, target: f64) -> Self {
        if start < target {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Whether `value` has reached or passed `target` in this direction.
    #[inline]
    pub fn reached(self, value: f64, target: f64) -> bool {
        match self {
            Direction::Up => value >= target,
            Direction::Down => value <= target,
        }
    }
}

/// Data describing an in-progress or idle ramp.
///
/// `target_value`, `start_value`, `direction` and `step_index` only carry
/// meaning while `active` is set or right after the terminating tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RampState {
    pub current_value: f64,
    pub target_value: f64,
    pub start_value: f64,
    pub mode: RampMode,
    pub step_index: u64,
    pub total_steps: u64,
    pub direction: Direction,
    pub active: bool,
}

impl RampState {
    /// Idle state resting at `current_value`.
    pub fn idle(current_value: f64, mode: RampMode, total_steps: u64) -> Self {
        Self {
            current_value,
            target_value: current_value,
            start_value: current_value,
            mode,
            step_index: 0,
            total_steps,
            direction: Direction::Down,
            active: false,
        }
    }

    /// Per-step rate: a ratio for exponential ramps, an increment for linear.
    pub fn rate(&self) -> f64 {
        let n = self.total_steps.max(1) as f64;
        match self.mode {
            RampMode::Exponential => {
                let base = self.start_value.max(1.0);
                (self.target_value.max(1.0) / base).powf(1.0 / n)
            }
            RampMode::Linear => (self.target_value - self.start_value) / n,
        }
    }

    /// Raw interpolated value after `step` ticks, before any clamping.
    pub fn value_at(&self, step: u64) -> f64 {
        let k = step as f64;
        match self.mode {
            RampMode::Exponential => self.start_value.max(1.0) * self.rate().powf(k),
            RampMode::Linear => self.start_value + self.rate() * k,
        }
    }
}
