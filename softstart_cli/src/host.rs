//! Stdin/stdout host: turns input lines into messages for one `SoftStart`
//! and prints its output events.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crossbeam_channel as xch;
use eyre::WrapErr;
use softstart_core::error::Result;
use softstart_core::runner::{RunSummary, run_host, simulate};
use softstart_core::{FileStore, MemoryStore, OutputEvent, Payload, RampCfg, RampError, SoftStart, ThreadScheduler};
use softstart_traits::{KeyValueStore, MonotonicClock};

/// Parse one input line into a message payload.
///
/// `{"payload": ...}` objects carry their payload (absent field = no
/// payload); anything else is taken as a text payload. An empty line is a
/// message without payload.
pub fn parse_line(line: &str) -> Option<Payload> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::Object(obj)) => return obj.get("payload").map(json_payload),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "input is not JSON; treating as text"),
        }
    }
    Some(Payload::from(trimmed))
}

fn json_payload(v: &serde_json::Value) -> Payload {
    use serde_json::Value;
    match v {
        Value::Null => Payload::Null,
        Value::Bool(b) => Payload::Bool(*b),
        Value::Number(n) => n.as_f64().map_or(Payload::Null, Payload::Number),
        Value::String(s) => Payload::Text(s.clone()),
        other => Payload::Text(other.to_string()),
    }
}

/// Render one output event as a single line.
pub fn format_event(ev: &OutputEvent, json: bool) -> String {
    if json {
        serde_json::json!({
            "payload": ev.payload,
            "status": ev.status,
            "done": ev.done,
        })
        .to_string()
    } else if ev.done {
        format!("{} (target reached)", ev.status)
    } else {
        ev.status.clone()
    }
}

fn print_event(out: &mut impl Write, ev: &OutputEvent, json: bool) -> Result<()> {
    writeln!(out, "{}", format_event(ev, json)).wrap_err("write stdout")?;
    out.flush().wrap_err("flush stdout")?;
    Ok(())
}

/// Spawn the stdin reader. The channel closes at end of input.
fn spawn_stdin_reader() -> xch::Receiver<Option<Payload>> {
    let (tx, rx) = xch::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(error = %e, "read stdin failed; closing input");
                    break;
                }
            };
            if tx.send(parse_line(&line)).is_err() {
                break;
            }
        }
        tracing::debug!("stdin closed");
    });
    rx
}

fn install_ctrlc() -> Result<xch::Receiver<()>> {
    let (tx, rx) = xch::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .wrap_err("install Ctrl-C handler")?;
    Ok(rx)
}

/// Live host: stdin messages in, one printed line per tick out.
pub fn run_live(cfg: RampCfg, state: Option<PathBuf>, json: bool) -> Result<RunSummary> {
    let store: Box<dyn KeyValueStore + Send> = match state {
        Some(path) => {
            tracing::info!(path = %path.display(), "persisting output to file");
            Box::new(FileStore::new(path))
        }
        None => Box::new(MemoryStore::new()),
    };
    let scheduler = ThreadScheduler::new(MonotonicClock::new());
    let (mut node, outputs) = SoftStart::new(cfg, store, scheduler)?;

    let shutdown = install_ctrlc()?;
    let inputs = spawn_stdin_reader();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    run_host(&mut node, &outputs, &inputs, &shutdown, |ev| print_event(&mut out, ev, json))
}

/// Offline ramp: compute and print every value without waiting.
pub fn run_simulate(cfg: RampCfg, from: Option<f64>, target: f64, json: bool) -> Result<Vec<OutputEvent>> {
    if !target.is_finite() {
        return Err(RampError::InvalidTarget(target).into());
    }
    if let Some(v) = from
        && !v.is_finite()
    {
        return Err(RampError::Config(format!("--from must be a finite number, got {v}")).into());
    }

    let events = simulate(cfg, from, Payload::Number(target))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if events.is_empty() && !json {
        writeln!(out, "Target equals the current value; nothing to ramp.").wrap_err("write stdout")?;
    }
    for ev in &events {
        print_event(&mut out, ev, json)?;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("42", Some(Payload::from("42")))]
    #[case("  abc ", Some(Payload::from("abc")))]
    #[case(r#"{"payload": 42}"#, Some(Payload::Number(42.0)))]
    #[case(r#"{"payload": "7.5"}"#, Some(Payload::from("7.5")))]
    #[case(r#"{"payload": null}"#, Some(Payload::Null))]
    #[case(r#"{"payload": true}"#, Some(Payload::Bool(true)))]
    #[case(r#"{"topic": "x"}"#, None)]
    #[case("{not json", Some(Payload::from("{not json")))]
    fn parses_input_lines(#[case] line: &str, #[case] expected: Option<Payload>) {
        assert_eq!(parse_line(line), expected);
    }

    #[test]
    fn formats_events() {
        let ev = OutputEvent::new(42.0, false);
        assert_eq!(format_event(&ev, false), "Output: 42.00");
        let done = OutputEvent::new(100.0, true);
        assert_eq!(format_event(&done, false), "Output: 100.00 (target reached)");

        let v: serde_json::Value = serde_json::from_str(&format_event(&done, true)).unwrap();
        assert_eq!(v["payload"], 100.0);
        assert_eq!(v["status"], "Output: 100.00");
        assert_eq!(v["done"], true);
    }
}
