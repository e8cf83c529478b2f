//! Output event emitted on every tick.

use crate::util::format_status;

/// One emitted value plus its status annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEvent {
    /// The controller's output after this tick.
    pub payload: f64,
    /// Human-readable status, e.g. `Output: 42.00`.
    pub status: String,
    /// True on the terminating tick of a ramp.
    pub done: bool,
}

impl OutputEvent {
    pub fn new(payload: f64, done: bool) -> Self {
        Self {
            payload,
            status: format_status(payload),
            done,
        }
    }
}
