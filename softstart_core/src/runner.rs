//! Channel-driven host loop for a `SoftStart`, plus offline one-shot simulation.

use crossbeam_channel as xch;
use softstart_traits::KeyValueStore;

use crate::config::RampCfg;
use crate::controller::CURRENT_POWER_KEY;
use crate::error::Result;
use crate::gate::Payload;
use crate::node::SoftStart;
use crate::scheduler::{ManualScheduler, Scheduler};
use crate::status::OutputEvent;
use crate::store::MemoryStore;

/// Counters reported when a host loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    /// Messages received, valid or not.
    pub inputs: usize,
    /// Messages that started (or restarted) a ramp.
    pub ramps_started: usize,
    /// Output events passed to the sink.
    pub emitted: usize,
    /// Output value when the loop ended.
    pub final_value: f64,
    /// Whether the loop ended on a shutdown request.
    pub interrupted: bool,
}

/// What woke the host loop.
enum Wake {
    /// `true` for a request, `false` when the shutdown source went away.
    Shutdown(bool),
    Output(Option<OutputEvent>),
    /// `None` once the input side has disconnected.
    Input(Option<Option<Payload>>),
}

/// Drive `node` from an input channel until the inputs close and the last
/// ramp finishes, or until `shutdown` fires.
///
/// Each received `Option<Payload>` is one message (`None` = no payload).
/// Output events are handed to `on_event` in emission order. The node is
/// shut down before returning.
pub fn run_host<K, S, F>(
    node: &mut SoftStart<K, S>,
    outputs: &xch::Receiver<OutputEvent>,
    inputs: &xch::Receiver<Option<Payload>>,
    shutdown: &xch::Receiver<()>,
    mut on_event: F,
) -> Result<RunSummary>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
    F: FnMut(&OutputEvent) -> Result<()>,
{
    let mut summary = RunSummary::default();
    let never_inputs = xch::never::<Option<Payload>>();
    let never_shutdown = xch::never::<()>();
    let mut inputs_open = true;
    let mut shutdown_open = true;

    tracing::info!(current = node.current_value(), mode = ?node.mode(), "host loop start");

    loop {
        if !inputs_open && !node.is_ramping() {
            for ev in outputs.try_iter() {
                on_event(&ev)?;
                summary.emitted += 1;
            }
            break;
        }

        let inputs_rx = if inputs_open { inputs } else { &never_inputs };
        let shutdown_rx = if shutdown_open { shutdown } else { &never_shutdown };
        let wake = xch::select! {
            recv(shutdown_rx) -> msg => Wake::Shutdown(msg.is_ok()),
            recv(outputs) -> ev => Wake::Output(ev.ok()),
            recv(inputs_rx) -> msg => Wake::Input(msg.ok()),
        };

        match wake {
            Wake::Shutdown(true) => {
                tracing::info!("shutdown requested");
                summary.interrupted = true;
                break;
            }
            Wake::Shutdown(false) => shutdown_open = false,
            Wake::Output(Some(ev)) => {
                on_event(&ev)?;
                summary.emitted += 1;
            }
            Wake::Output(None) => {}
            Wake::Input(Some(payload)) => {
                summary.inputs += 1;
                if node.handle_input(payload.as_ref())? {
                    summary.ramps_started += 1;
                }
            }
            Wake::Input(None) => {
                tracing::debug!("input closed; waiting for active ramp");
                inputs_open = false;
            }
        }
    }

    node.shutdown();
    summary.final_value = node.current_value();
    tracing::info!(
        inputs = summary.inputs,
        ramps = summary.ramps_started,
        emitted = summary.emitted,
        final_value = summary.final_value,
        "host loop end"
    );
    Ok(summary)
}

/// Run one ramp from `from` (or `cfg.start_power`) to `target` on a
/// deterministic scheduler and return every emitted event.
///
/// An empty result means the target was rejected or equal to the start.
pub fn simulate(cfg: RampCfg, from: Option<f64>, target: Payload) -> Result<Vec<OutputEvent>> {
    let store = MemoryStore::new();
    if let Some(v) = from {
        store.insert(CURRENT_POWER_KEY, v);
    }
    let sched = ManualScheduler::new();
    let (mut node, rx) = SoftStart::new(cfg, store, sched.clone())?;

    if !node.handle_input(Some(&target))? {
        return Ok(Vec::new());
    }
    let max_fires = usize::try_from(node.state().total_steps.saturating_add(1)).unwrap_or(usize::MAX);
    sched.run_until_idle(max_fires);
    node.shutdown();
    Ok(rx.try_iter().collect())
}
