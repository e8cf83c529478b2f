use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use softstart_core::{ManualScheduler, MemoryStore, Payload, RampCfg, RampController, RampMode, SoftStart};

fn cfg(mode: RampMode, steps: u64) -> RampCfg {
    RampCfg {
        start_power: 0.0,
        duration: Duration::from_millis(steps),
        step_time: Duration::from_millis(1),
        mode,
    }
}

// Full ramp on the bare controller: interpolation + persistence per tick.
pub fn bench_controller_ramp(c: &mut Criterion) {
    let mut g = c.benchmark_group("controller_ramp");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p softstart_core --bench ramp
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(Duration::from_millis(ms_u64));
    }

    for mode in [RampMode::Linear, RampMode::Exponential] {
        g.bench_function(format!("{mode:?}_10k_steps").to_lowercase(), |b| {
            b.iter_batched(
                || RampController::new(cfg(mode, 10_000), MemoryStore::new()).unwrap_or_else(|e| panic!("{e}")),
                |mut ctl| {
                    let _ = ctl.start_ramp(black_box(1_000.0), mode);
                    while let Some(ev) = ctl.tick() {
                        black_box(ev.payload);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

// Node path: gate, retarget, manual scheduler dispatch and the output channel.
pub fn bench_node_retarget(c: &mut Criterion) {
    let mut g = c.benchmark_group("node_retarget");
    g.sample_size(30);
    g.bench_function("retarget_every_10_ticks", |b| {
        b.iter_batched(
            || {
                let sched = ManualScheduler::new();
                let (node, rx) = SoftStart::new(cfg(RampMode::Linear, 1_000), MemoryStore::new(), sched.clone())
                    .unwrap_or_else(|e| panic!("{e}"));
                (node, rx, sched)
            },
            |(mut node, rx, sched)| {
                for i in 1..=20 {
                    let _ = node.handle_input(Some(&Payload::Number(f64::from(i) * 50.0)));
                    sched.advance(Duration::from_millis(10));
                }
                black_box(rx.try_iter().count());
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(ramp, bench_controller_ramp, bench_node_retarget);
criterion_main!(ramp);
