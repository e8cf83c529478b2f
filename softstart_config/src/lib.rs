#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the soft-start controller.
//!
//! - `Config` and its tables are deserialized from TOML and validated.
//! - Every table and key is optional; missing values fall back to the
//!   documented defaults (`start_power = 0`, `duration_ms = 5000`,
//!   `step_time_ms = 100`, `mode = "exponential"`).
use eyre::WrapErr;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bound on a single ramp's duration.
const MAX_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Interpolation law as written in the config file.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Linear,
    #[default]
    Exponential,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RampCfg {
    /// Initial output used only when the store holds no value.
    pub start_power: f64,
    /// Total ramp time in milliseconds. Also accepts alias "duration".
    #[serde(alias = "duration")]
    pub duration_ms: i64,
    /// Tick interval in milliseconds. Also accepts alias "step_time".
    #[serde(alias = "step_time")]
    pub step_time_ms: i64,
    pub mode: Mode,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            start_power: 0.0,
            duration_ms: 5000,
            step_time_ms: 100,
            mode: Mode::Exponential,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StoreCfg {
    /// File holding the persisted output value. In-memory when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub ramp: RampCfg,
    #[serde(default)]
    pub store: StoreCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is left to the caller.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))
}

impl RampCfg {
    /// Number of ticks a full ramp takes: `ceil(duration / step_time)`.
    ///
    /// Only meaningful after `Config::validate` has accepted both values.
    pub fn total_steps(&self) -> u64 {
        let duration = self.duration_ms.max(0) as u64;
        let step = self.step_time_ms.max(1) as u64;
        duration.div_ceil(step)
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Ramp
        if !self.ramp.start_power.is_finite() {
            eyre::bail!("ramp.start_power must be a finite number");
        }
        if self.ramp.duration_ms <= 0 {
            eyre::bail!("ramp.duration_ms must be > 0");
        }
        if self.ramp.duration_ms > MAX_DURATION_MS {
            eyre::bail!("ramp.duration_ms is unreasonably large (>24h)");
        }
        if self.ramp.step_time_ms <= 0 {
            eyre::bail!("ramp.step_time_ms must be > 0");
        }
        if self.ramp.total_steps() == 0 {
            eyre::bail!("ramp.duration_ms / ramp.step_time_ms must yield at least one step");
        }

        // Store
        if let Some(p) = &self.store.path
            && p.as_os_str().is_empty()
        {
            eyre::bail!("store.path must not be empty when set");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
