#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use softstart_core::{InputGate, Payload, RampCfg, RampController, RampMode, MemoryStore};

#[derive(Arbitrary, Debug)]
enum Input {
    Missing,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Arbitrary, Debug)]
struct Case {
    current: f64,
    input: Input,
    linear: bool,
    steps: u8,
}

fuzz_target!(|case: Case| {
    if !case.current.is_finite() {
        return;
    }
    let payload = match case.input {
        Input::Missing => None,
        Input::Null => Some(Payload::Null),
        Input::Bool(b) => Some(Payload::Bool(b)),
        Input::Number(v) => Some(Payload::Number(v)),
        Input::Text(s) => Some(Payload::Text(s)),
    };

    let Some(target) = InputGate::validate(payload.as_ref(), case.current) else {
        return;
    };
    assert!(target.is_finite());

    // Any accepted target drives a ramp that ends exactly on it.
    let steps = u64::from(case.steps.max(1));
    let mode = if case.linear { RampMode::Linear } else { RampMode::Exponential };
    let cfg = RampCfg {
        start_power: case.current,
        duration: std::time::Duration::from_millis(steps),
        step_time: std::time::Duration::from_millis(1),
        mode,
    };
    let mut ctl = RampController::new(cfg, MemoryStore::new()).expect("valid cfg");
    assert!(ctl.start_ramp(target, mode).expect("finite target"));
    let mut last = None;
    for _ in 0..=steps {
        match ctl.tick() {
            Some(ev) => last = Some(ev.payload),
            None => break,
        }
    }
    assert!(!ctl.is_active());
    assert_eq!(last.map(f64::to_bits), Some(target.to_bits()));
});
