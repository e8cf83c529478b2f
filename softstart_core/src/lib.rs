#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Soft-start ramp controller (host-agnostic).
//!
//! Moves a scalar output from its current value to a requested target over
//! a fixed duration, one value per tick, and persists the output through a
//! `softstart_traits::KeyValueStore` so it survives restarts.
//!
//! ## Architecture
//!
//! - **Gate**: payload validation and no-op filtering (`gate`)
//! - **State**: ramp data and the two interpolation laws (`state`)
//! - **Controller**: start/retarget, per-tick step, termination, persistence
//!   (`controller`)
//! - **Scheduler**: cancellable periodic timer, threaded or manual
//!   (`scheduler`)
//! - **SoftStart**: host-facing handle tying the above together (`node`)
//! - **Runner**: host loop and deterministic simulation (`runner`)
//!
//! ## Interpolation
//!
//! With `n = ceil(duration / step_time)` and `k` the tick number:
//! - linear: `start + (target - start) / n * k`
//! - exponential: `b * (max(target, 1) / b)^(k / n)` where `b = max(start, 1)`
//!
//! The terminating tick always emits exactly `target`.

pub mod atomic;
pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod gate;
pub mod mocks;
pub mod node;
pub mod runner;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod store;
pub mod util;

pub use builder::{Missing, SoftStartBuilder};
pub use config::{RampCfg, RampMode};
pub use controller::{CURRENT_POWER_KEY, RampController};
pub use error::RampError;
pub use gate::{InputGate, Payload};
pub use node::SoftStart;
pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, TickControl, TimerHandle};
pub use state::{Direction, RampState};
pub use status::OutputEvent;
pub use store::{FileStore, MemoryStore};
