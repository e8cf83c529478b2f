//! Human-readable error descriptions and structured JSON error formatting.

use softstart_core::RampError;
use softstart_core::builder::config_error;

/// Exit code for configuration errors (same as clap usage errors).
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for every other failure.
pub const EXIT_FAILURE: i32 = 1;

fn typed(err: &eyre::Report) -> Option<&RampError> {
    err.chain().find_map(|e| e.downcast_ref::<RampError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(re) = typed(err) {
        return match re {
            RampError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the [ramp] table, or a TOML syntax error.\nHow to fix: Edit the config file (duration_ms and step_time_ms must be > 0, start_power finite), then rerun `softstart self-check`."
            ),
            RampError::InvalidTarget(v) => format!(
                "What happened: Target {v} is not a finite number.\nLikely causes: A NaN or infinite value was passed as target.\nHow to fix: Pass a finite number (e.g., `--target 100`)."
            ),
            RampError::Persistence(msg) => format!(
                "What happened: The output value could not be persisted ({msg}).\nLikely causes: The state file is not writable or its directory is missing.\nHow to fix: Check --state / [store] path and its permissions."
            ),
        };
    }

    // String-based heuristics for errors coming from I/O
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("stdin") {
        return format!(
            "What happened: Reading input failed ({msg}).\nLikely causes: The input stream was closed or is not valid UTF-8.\nHow to fix: Feed one target per line, e.g. `echo 42 | softstart run`."
        );
    }

    if lower.contains("stdout") || lower.contains("broken pipe") {
        return format!(
            "What happened: Writing output failed ({msg}).\nLikely causes: The reading end of the pipe went away.\nHow to fix: Keep the consumer running for the whole ramp."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Config errors exit with 2; everything else with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if config_error(err).is_some() {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match typed(err) {
        Some(RampError::Config(_)) => "Config",
        Some(RampError::InvalidTarget(_)) => "InvalidTarget",
        Some(RampError::Persistence(_)) => "Persistence",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
