//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "softstart", version, about = "Soft-start ramp controller")]
pub struct Cli {
    /// Path to config TOML (typed). Built-in defaults when omitted.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print output events and errors as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Interpolation law override.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Linear,
    Exponential,
}

impl From<ModeArg> for softstart_core::RampMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Linear => softstart_core::RampMode::Linear,
            ModeArg::Exponential => softstart_core::RampMode::Exponential,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read targets from stdin and print output values as the ramp runs
    #[command(long_about = "Read targets from stdin, one message per line, and print one output value per tick.\n\nA line is either a JSON object with a \"payload\" field (e.g. {\"payload\": 42}) or a bare value; an empty line is a message without payload. Non-numeric payloads are ignored. On end of input the active ramp is allowed to finish; Ctrl-C stops immediately.")]
    Run {
        /// Persist the output value in this TOML file (overrides [store] path)
        #[arg(long, value_name = "FILE")]
        state: Option<PathBuf>,
        /// Override the configured ramp mode
        #[arg(long, value_enum, value_name = "MODE")]
        mode: Option<ModeArg>,
    },
    /// Compute one ramp without waiting and print every emitted value
    Simulate {
        /// Target value
        #[arg(long, allow_hyphen_values = true)]
        target: f64,
        /// Starting value (defaults to ramp.start_power)
        #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
        from: Option<f64>,
        /// Override the configured ramp mode
        #[arg(long, value_enum, value_name = "MODE")]
        mode: Option<ModeArg>,
    },
    /// Load and validate the configuration, then print the ramp shape
    SelfCheck,
}
