//! Host-facing soft-start handle.
//!
//! Binds one `RampController`, one `Scheduler` and an output channel. The
//! host calls `handle_input` for every incoming message and `shutdown` at
//! teardown; output events arrive on the receiver returned at build time.
//!
//! Locking: the controller sits behind a mutex held for a whole `tick` or
//! `start_ramp`. The live timer is cancelled *without* that lock held, so a
//! tick already in flight can finish before the ramp is reconfigured.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel as xch;
use softstart_traits::KeyValueStore;

use crate::config::{RampCfg, RampMode};
use crate::controller::RampController;
use crate::error::Result;
use crate::gate::{InputGate, Payload};
use crate::scheduler::{Scheduler, TickControl};
use crate::state::RampState;
use crate::status::OutputEvent;

pub struct SoftStart<K, S>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
{
    controller: Arc<Mutex<RampController<K>>>,
    scheduler: S,
    timer: Option<S::Handle>,
    outputs: xch::Sender<OutputEvent>,
    mode: RampMode,
    interval: Duration,
}

impl<K, S> core::fmt::Debug for SoftStart<K, S>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SoftStart")
            .field("state", &self.state())
            .field("timer_live", &self.timer.is_some())
            .field("interval", &self.interval)
            .finish()
    }
}

impl<K, S> SoftStart<K, S>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
{
    /// Build an idle handle and the receiver its output events go to.
    pub fn new(cfg: RampCfg, store: K, scheduler: S) -> Result<(Self, xch::Receiver<OutputEvent>)> {
        let (tx, rx) = xch::unbounded();
        Ok((Self::with_output(cfg, store, scheduler, tx)?, rx))
    }

    /// Build an idle handle that emits on an existing channel.
    pub fn with_output(
        cfg: RampCfg,
        store: K,
        scheduler: S,
        outputs: xch::Sender<OutputEvent>,
    ) -> Result<Self> {
        let mode = cfg.mode;
        let interval = cfg.step_time;
        let controller = RampController::new(cfg, store)?;
        tracing::debug!(
            current = controller.current_value(),
            total_steps = controller.total_steps(),
            ?mode,
            "soft-start ready"
        );
        Ok(Self {
            controller: Arc::new(Mutex::new(controller)),
            scheduler,
            timer: None,
            outputs,
            mode,
            interval,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RampController<K>> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_value(&self) -> f64 {
        self.lock().current_value()
    }

    pub fn is_ramping(&self) -> bool {
        self.lock().is_active()
    }

    /// Snapshot of the ramp state.
    pub fn state(&self) -> RampState {
        self.lock().state().clone()
    }

    pub fn mode(&self) -> RampMode {
        self.mode
    }

    /// Feed one incoming message. Returns whether a new ramp started.
    ///
    /// Invalid or no-op payloads are dropped without error. A valid target
    /// interrupts any running ramp and restarts from the live value.
    pub fn handle_input(&mut self, payload: Option<&Payload>) -> Result<bool> {
        let current = self.current_value();
        let Some(target) = InputGate::validate(payload, current) else {
            return Ok(false);
        };

        self.cancel_timer();
        let started = {
            let mut ctl = self.lock();
            ctl.halt();
            ctl.start_ramp(target, self.mode)?
        };
        if started {
            self.schedule_ticks();
        }
        Ok(started)
    }

    /// Stop the ramp where it is. No tick or emission happens afterwards.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
        self.lock().halt();
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn schedule_ticks(&mut self) {
        let controller = Arc::clone(&self.controller);
        let outputs = self.outputs.clone();
        let mut receiver_gone = false;

        let handle = self.scheduler.schedule_periodic(
            self.interval,
            Box::new(move || {
                // Send under the lock: once `is_ramping()` reads false, the
                // final event is already queued. The channel is unbounded so
                // the send never blocks.
                let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(event) = ctl.tick() else {
                    return TickControl::Stop;
                };
                let done = event.done;
                if outputs.send(event).is_err() && !receiver_gone {
                    receiver_gone = true;
                    tracing::debug!("output receiver dropped; emissions discarded");
                }
                if done {
                    TickControl::Stop
                } else {
                    TickControl::Continue
                }
            }),
        );
        self.timer = Some(handle);
    }
}

impl<K, S> Drop for SoftStart<K, S>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
