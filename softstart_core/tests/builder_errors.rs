use std::time::Duration;

use rstest::rstest;
use softstart_core::builder::config_error;
use softstart_core::{
    ManualScheduler, MemoryStore, Payload, RampCfg, RampError, RampMode, SoftStartBuilder,
};

#[rstest]
#[case::zero_step(RampCfg { step_time: Duration::ZERO, ..RampCfg::default() })]
#[case::zero_duration(RampCfg { duration: Duration::ZERO, ..RampCfg::default() })]
#[case::nan_start(RampCfg { start_power: f64::NAN, ..RampCfg::default() })]
#[case::infinite_start(RampCfg { start_power: f64::INFINITY, ..RampCfg::default() })]
fn invalid_config_yields_typed_config_error(#[case] cfg: RampCfg) {
    let err = SoftStartBuilder::new()
        .with_config(cfg)
        .with_store(MemoryStore::new())
        .with_scheduler(ManualScheduler::new())
        .build()
        .expect_err("should reject configuration");

    match config_error(&err) {
        Some(RampError::Config(_)) => {}
        other => panic!("expected Config error, got: {other:?}"),
    }
}

#[test]
fn file_config_with_bad_step_is_rejected_before_build() {
    let file_cfg = softstart_config::RampCfg {
        step_time_ms: 0,
        ..softstart_config::RampCfg::default()
    };
    let err = SoftStartBuilder::new()
        .with_file_config(&file_cfg)
        .expect_err("zero step must fail");
    assert!(config_error(&err).is_some(), "{err:?}");
}

#[test]
fn builder_overrides_apply() {
    let store = MemoryStore::new();
    let (node, rx) = SoftStartBuilder::new()
        .with_mode(RampMode::Linear)
        .with_start_power(12.5)
        .with_store(store.clone())
        .with_scheduler(ManualScheduler::new())
        .build()
        .unwrap();

    assert!(rx.is_some());
    assert_eq!(node.mode(), RampMode::Linear);
    assert_eq!(node.current_value(), 12.5);
    assert_eq!(node.state().total_steps, 50);
}

#[test]
fn builder_with_output_emits_on_given_channel() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let sched = ManualScheduler::new();
    let (mut node, own_rx) = SoftStartBuilder::new()
        .with_mode(RampMode::Linear)
        .with_output(tx)
        .with_store(MemoryStore::new())
        .with_scheduler(sched.clone())
        .build()
        .unwrap();
    assert!(own_rx.is_none());

    node.handle_input(Some(&Payload::Number(50.0))).unwrap();
    sched.advance(Duration::from_millis(100));
    assert_eq!(rx.try_recv().unwrap().payload, 1.0);
}

#[test]
fn non_config_errors_are_not_reported_as_config() {
    let err = eyre::Report::new(RampError::InvalidTarget(f64::NAN));
    assert!(config_error(&err).is_none());
    let err = eyre::eyre!("something else");
    assert!(config_error(&err).is_none());
}
