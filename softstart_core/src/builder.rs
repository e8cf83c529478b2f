//! Type-state builder for `SoftStart`.
//!
//! The store and the scheduler are type parameters of the builder; `build()`
//! only exists once both are real implementations, so a missing collaborator
//! is a compile error rather than a runtime one.

use crossbeam_channel as xch;
use softstart_traits::KeyValueStore;

use crate::config::{RampCfg, RampMode};
use crate::error::{RampError, Result};
use crate::node::SoftStart;
use crate::scheduler::Scheduler;
use crate::status::OutputEvent;

/// Placeholder for a collaborator not yet provided.
#[derive(Debug, Default)]
pub struct Missing;

#[derive(Debug, Default)]
pub struct SoftStartBuilder<K, S> {
    cfg: RampCfg,
    store: K,
    scheduler: S,
    outputs: Option<xch::Sender<OutputEvent>>,
}

impl SoftStartBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, S> SoftStartBuilder<K, S> {
    pub fn with_config(mut self, cfg: RampCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Take ramp settings from a parsed config file.
    pub fn with_file_config(mut self, cfg: &softstart_config::RampCfg) -> Result<Self> {
        self.cfg = RampCfg::try_from(cfg)?;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: RampMode) -> Self {
        self.cfg.mode = mode;
        self
    }

    pub fn with_start_power(mut self, start_power: f64) -> Self {
        self.cfg.start_power = start_power;
        self
    }

    /// Emit on an existing channel instead of a fresh one.
    pub fn with_output(mut self, tx: xch::Sender<OutputEvent>) -> Self {
        self.outputs = Some(tx);
        self
    }

    pub fn with_store<K2: KeyValueStore + Send + 'static>(self, store: K2) -> SoftStartBuilder<K2, S> {
        SoftStartBuilder {
            cfg: self.cfg,
            store,
            scheduler: self.scheduler,
            outputs: self.outputs,
        }
    }

    pub fn with_scheduler<S2: Scheduler>(self, scheduler: S2) -> SoftStartBuilder<K, S2> {
        SoftStartBuilder {
            cfg: self.cfg,
            store: self.store,
            scheduler,
            outputs: self.outputs,
        }
    }
}

impl<K, S> SoftStartBuilder<K, S>
where
    K: KeyValueStore + Send + 'static,
    S: Scheduler,
{
    /// Validate and build. The receiver is `None` when `with_output` was
    /// used.
    pub fn build(self) -> Result<(SoftStart<K, S>, Option<xch::Receiver<OutputEvent>>)> {
        self.cfg
            .total_steps()
            .map_err(|e| eyre::Report::new(e).wrap_err("invalid ramp configuration"))?;
        match self.outputs {
            Some(tx) => Ok((
                SoftStart::with_output(self.cfg, self.store, self.scheduler, tx)?,
                None,
            )),
            None => {
                let (node, rx) = SoftStart::new(self.cfg, self.store, self.scheduler)?;
                Ok((node, Some(rx)))
            }
        }
    }
}

/// Typed config error behind a report produced by this crate, if any.
pub fn config_error(err: &eyre::Report) -> Option<&RampError> {
    err.chain()
        .find_map(|e| e.downcast_ref::<RampError>())
        .filter(|e| matches!(e, RampError::Config(_)))
}
