mod cli;
mod error_fmt;
mod host;

use std::path::Path;

use clap::Parser;
use eyre::WrapErr;
use softstart_core::{RampCfg, RampError};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: failed to install color-eyre: {e}");
    }

    if let Err(err) = run(cli) {
        tracing::debug!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cli, &cfg.logging)?;

    let mut ramp = RampCfg::try_from(&cfg.ramp)?;
    tracing::debug!(?ramp, "configuration loaded");

    match cli.cmd {
        Commands::Run { state, mode } => {
            if let Some(m) = mode {
                ramp.mode = m.into();
            }
            let state = state.or(cfg.store.path);
            let summary = host::run_live(ramp, state, cli.json)?;
            if summary.interrupted {
                tracing::info!(final_value = summary.final_value, "stopped by Ctrl-C");
            }
        }
        Commands::Simulate { target, from, mode } => {
            if let Some(m) = mode {
                ramp.mode = m.into();
            }
            host::run_simulate(ramp, from, target, cli.json)?;
        }
        Commands::SelfCheck => self_check(&cfg, &ramp, cli.json)?,
    }
    Ok(())
}

/// Read, parse and validate the config. Every failure is a config error.
fn load_config(path: Option<&Path>) -> eyre::Result<softstart_config::Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|e| RampError::Config(format!("cannot read {}: {e}", p.display())))?;
            softstart_config::load_toml(&text).map_err(|e: toml::de::Error| {
                RampError::Config(format!("cannot parse {}: {}", p.display(), e.message()))
            })?
        }
        None => softstart_config::Config::default(),
    };
    cfg.validate().map_err(|e| RampError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &softstart_config::Logging) -> eyre::Result<()> {
    // RUST_LOG wins over --log-level.
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err_with(|| format!("invalid --log-level {:?}", cli.log_level))?;
    let console = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| RampError::Config(format!("logging.file {file:?} has no file name")))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let level = logging.level.as_deref().unwrap_or("info");
            let filter = EnvFilter::try_new(level)
                .map_err(|e| RampError::Config(format!("logging.level {level:?}: {e}")))?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

fn self_check(cfg: &softstart_config::Config, ramp: &RampCfg, json: bool) -> eyre::Result<()> {
    let total_steps = ramp.total_steps()?;
    let mode = match ramp.mode {
        softstart_core::RampMode::Linear => "linear",
        softstart_core::RampMode::Exponential => "exponential",
    };
    let store = cfg
        .store
        .path
        .as_ref()
        .map_or_else(|| "memory".to_string(), |p| p.display().to_string());

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "mode": mode,
                "duration_ms": ramp.duration.as_millis() as u64,
                "step_time_ms": ramp.step_time.as_millis() as u64,
                "total_steps": total_steps,
                "start_power": ramp.start_power,
                "store": store,
            })
        );
    } else {
        println!("Config OK");
        println!(
            "Ramp: {mode}, {} ms in {} ms steps ({total_steps} steps)",
            ramp.duration.as_millis(),
            ramp.step_time.as_millis()
        );
        println!("Start power: {:.2}", ramp.start_power);
        println!("Store: {store}");
    }
    Ok(())
}
