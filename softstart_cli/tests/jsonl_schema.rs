use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use assert_cmd::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[ramp]
duration_ms = 100
step_time_ms = 10
mode = "exponential"
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid JSON line"))
        .collect()
}

fn assert_event_schema(v: &serde_json::Value) {
    assert!(v.get("payload").and_then(|x| x.as_f64()).is_some(), "{v}");
    let status = v.get("status").and_then(|x| x.as_str()).unwrap_or("");
    assert!(status.starts_with("Output: "), "{v}");
    assert!(v.get("done").and_then(|x| x.as_bool()).is_some(), "{v}");
}

/// Every simulated tick is one JSON object; only the last has done = true.
#[rstest]
fn simulate_jsonl_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("softstart")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("simulate")
        .arg("--target")
        .arg("100")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let events = json_lines(&out);
    assert!((10..=11).contains(&events.len()), "got {} events", events.len());
    for v in &events {
        assert_event_schema(v);
    }
    let (last, rest) = events.split_last().unwrap();
    assert!(rest.iter().all(|v| v["done"] == false));
    assert_eq!(last["done"], true);
    assert_eq!(last["payload"].as_f64(), Some(100.0));
    assert_eq!(last["status"], "Output: 100.00");
    assert_eq!(events[0]["status"], "Output: 1.58");
}

#[rstest]
fn run_jsonl_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("softstart")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--mode")
        .arg("linear")
        .write_stdin("{\"payload\": \"20\"}\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let events = json_lines(&out);
    assert_eq!(events.len(), 10);
    for v in &events {
        assert_event_schema(v);
    }
    assert_eq!(events[0]["payload"].as_f64(), Some(2.0));
    assert_eq!(events[9]["payload"].as_f64(), Some(20.0));
}

/// Config errors in JSON mode: one object with reason, message and exit code.
#[rstest]
fn config_error_json_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[ramp]\nstep_time_ms = 0\n").unwrap();

    let out = Command::cargo_bin("softstart")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&out);
    assert_eq!(lines.len(), 1);
    let v = &lines[0];
    assert_eq!(v["reason"], "Config");
    assert_eq!(v["exit_code"], 2);
    assert!(v["message"].as_str().unwrap().contains("step_time_ms"));
}

#[rstest]
fn self_check_json_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("softstart")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&out);
    assert_eq!(lines.len(), 1);
    let v = &lines[0];
    assert_eq!(v["ok"], true);
    assert_eq!(v["mode"], "exponential");
    assert_eq!(v["total_steps"], 10);
    assert_eq!(v["store"], "memory");
}
