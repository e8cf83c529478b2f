//! Runtime configuration for the ramp controller.
//!
//! Separate from the TOML-deserialized config in `softstart_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

use crate::error::RampError;

/// Interpolation law used to move from start to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampMode {
    /// Equal increments per tick.
    Linear,
    /// Equal ratios per tick, with both endpoints floored at 1.
    #[default]
    Exponential,
}

/// Ramp timing and initial value.
#[derive(Debug, Clone)]
pub struct RampCfg {
    /// Output used when the store holds no persisted value.
    pub start_power: f64,
    /// Total time a full ramp takes.
    pub duration: Duration,
    /// Interval between ticks.
    pub step_time: Duration,
    pub mode: RampMode,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            start_power: 0.0,
            duration: Duration::from_millis(5000),
            step_time: Duration::from_millis(100),
            mode: RampMode::Exponential,
        }
    }
}

impl RampCfg {
    /// Check every field and derive `ceil(duration / step_time)`.
    pub fn total_steps(&self) -> Result<u64, RampError> {
        if !self.start_power.is_finite() {
            return Err(RampError::Config("start_power must be finite".into()));
        }
        if self.step_time.is_zero() {
            return Err(RampError::Config("step_time must be > 0".into()));
        }
        if self.duration.is_zero() {
            return Err(RampError::Config("duration must be > 0".into()));
        }
        let steps = self.duration.as_nanos().div_ceil(self.step_time.as_nanos());
        match u64::try_from(steps) {
            Ok(0) | Err(_) => Err(RampError::Config(format!(
                "duration {:?} / step_time {:?} does not give a usable step count",
                self.duration, self.step_time
            ))),
            Ok(n) => Ok(n),
        }
    }
}
