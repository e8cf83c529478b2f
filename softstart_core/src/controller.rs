//! Ramp controller: owns the ramp state, computes each tick, persists the
//! output.
//!
//! The controller never schedules anything itself. Its owner (see
//! `SoftStart`) cancels the previous timer before `start_ramp` and drives
//! `tick` from a `Scheduler`; `halt` keeps `active` in step with the timer.

use std::time::Duration;

use softstart_traits::KeyValueStore;

use crate::config::{RampCfg, RampMode};
use crate::error::RampError;
use crate::state::{Direction, RampState};
use crate::status::OutputEvent;
use crate::util::approx_eq;

/// Store key holding the persisted output value.
pub const CURRENT_POWER_KEY: &str = "currentPower";

pub struct RampController<K: KeyValueStore> {
    state: RampState,
    step_interval: Duration,
    store: K,
}

impl<K: KeyValueStore> core::fmt::Debug for RampController<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RampController")
            .field("state", &self.state)
            .field("step_interval", &self.step_interval)
            .finish_non_exhaustive()
    }
}

/// Read the persisted value once, falling back to `start_power` when the
/// store is empty, unreadable, or holds a non-finite number.
fn initial_value<K: KeyValueStore>(store: &K, start_power: f64) -> f64 {
    match store.get(CURRENT_POWER_KEY) {
        Ok(Some(v)) if v.is_finite() => {
            tracing::debug!(value = v, "restored persisted output");
            v
        }
        Ok(Some(v)) => {
            tracing::warn!(value = v, start_power, "persisted output is not finite; using start_power");
            start_power
        }
        Ok(None) => start_power,
        Err(e) => {
            tracing::warn!(error = %e, start_power, "failed to read persisted output; using start_power");
            start_power
        }
    }
}

impl<K: KeyValueStore> RampController<K> {
    /// Validate `cfg`, restore the persisted output and return an idle
    /// controller.
    pub fn new(cfg: RampCfg, store: K) -> Result<Self, RampError> {
        let total_steps = cfg.total_steps()?;
        let current = initial_value(&store, cfg.start_power);
        Ok(Self {
            state: RampState::idle(current, cfg.mode, total_steps),
            step_interval: cfg.step_time,
            store,
        })
    }

    pub fn current_value(&self) -> f64 {
        self.state.current_value
    }

    pub fn state(&self) -> &RampState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn total_steps(&self) -> u64 {
        self.state.total_steps
    }

    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    pub fn mode(&self) -> RampMode {
        self.state.mode
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Begin a ramp from the live value towards `target`.
    ///
    /// Returns `Ok(false)` without touching the state when `target` is within
    /// tolerance of the current value. The caller must have cancelled any
    /// running timer first.
    pub fn start_ramp(&mut self, target: f64, mode: RampMode) -> Result<bool, RampError> {
        if !target.is_finite() {
            return Err(RampError::InvalidTarget(target));
        }
        if approx_eq(target, self.state.current_value) {
            tracing::trace!(target, current = self.state.current_value, "target equals current; no ramp");
            return Ok(false);
        }

        let start = self.state.current_value;
        self.state = RampState {
            current_value: start,
            target_value: target,
            start_value: start,
            mode,
            step_index: 0,
            total_steps: self.state.total_steps,
            direction: Direction::between(start, target),
            active: true,
        };
        tracing::debug!(
            start,
            target,
            rate = self.state.rate(),
            direction = ?self.state.direction,
            total_steps = self.state.total_steps,
            ?mode,
            "ramp start"
        );
        Ok(true)
    }

    /// Advance one step. Returns `None` when no ramp is active.
    pub fn tick(&mut self) -> Option<OutputEvent> {
        if !self.state.active {
            return None;
        }

        let s = &mut self.state;
        s.step_index = s.step_index.saturating_add(1);
        let candidate = s.value_at(s.step_index);
        let done = !candidate.is_finite()
            || s.step_index > s.total_steps
            || s.direction.reached(candidate, s.target_value);

        if done {
            s.current_value = s.target_value;
            s.active = false;
        } else {
            s.current_value = candidate;
        }
        let value = s.current_value;
        let step = s.step_index;

        if let Err(e) = self.store.set(CURRENT_POWER_KEY, value) {
            tracing::warn!(
                error = %RampError::Persistence(e.to_string()),
                value,
                "failed to persist output; ramp continues"
            );
        }

        if done {
            tracing::info!(value, steps = step, "ramp complete");
        } else {
            tracing::trace!(value, step, "tick");
        }
        Some(OutputEvent::new(value, done))
    }

    /// Mark the controller idle at its current value.
    pub fn halt(&mut self) {
        if self.state.active {
            tracing::debug!(
                value = self.state.current_value,
                step = self.state.step_index,
                "ramp interrupted"
            );
            self.state.active = false;
        }
    }
}
