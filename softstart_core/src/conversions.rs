//! Conversions bridging `softstart_config` types to `softstart_core` types.

use std::time::Duration;

use crate::config::{RampCfg, RampMode};
use crate::error::RampError;

// ── RampMode ─────────────────────────────────────────────────────────────────

impl From<softstart_config::Mode> for RampMode {
    fn from(m: softstart_config::Mode) -> Self {
        match m {
            softstart_config::Mode::Linear => RampMode::Linear,
            softstart_config::Mode::Exponential => RampMode::Exponential,
        }
    }
}

// ── RampCfg ──────────────────────────────────────────────────────────────────

/// Millisecond fields are signed in the file schema; negative values are
/// rejected here as well as in `Config::validate`.
fn positive_ms(value: i64, key: &str) -> Result<Duration, RampError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| RampError::Config(format!("ramp.{key} must be > 0, got {value}")))
}

impl TryFrom<&softstart_config::RampCfg> for RampCfg {
    type Error = RampError;

    fn try_from(c: &softstart_config::RampCfg) -> Result<Self, Self::Error> {
        let cfg = Self {
            start_power: c.start_power,
            duration: positive_ms(c.duration_ms, "duration_ms")?,
            step_time: positive_ms(c.step_time_ms, "step_time_ms")?,
            mode: c.mode.into(),
        };
        cfg.total_steps()?;
        Ok(cfg)
    }
}
