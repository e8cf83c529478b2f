//! Input gate: the only path from an external message to `start_ramp`.
//!
//! Invalid or no-op input is dropped silently (trace-level only); routine
//! repeats of the current setpoint are expected and should not produce noise.

use crate::util::approx_eq;

/// Payload of an incoming message, as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Number(v)
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Text(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::Text(v)
    }
}

impl Payload {
    /// Finite number carried by this payload, if any. Text is trimmed and
    /// parsed as a whole; "NaN" and "inf" parse but are rejected here.
    /// Prefixed text such as "12abc" is rejected, not read as 12.
    pub fn as_finite(&self) -> Option<f64> {
        let v = match self {
            Payload::Number(v) => *v,
            Payload::Text(s) => s.trim().parse::<f64>().ok()?,
            Payload::Null | Payload::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputGate;

impl InputGate {
    /// Parsed target for `payload`, or `None` when the message must be
    /// ignored: missing/null, not a finite number, or equal to `current`
    /// within tolerance.
    pub fn validate(payload: Option<&Payload>, current: f64) -> Option<f64> {
        let Some(payload) = payload else {
            tracing::trace!("input without payload ignored");
            return None;
        };
        let Some(target) = payload.as_finite() else {
            tracing::trace!(?payload, "non-numeric payload ignored");
            return None;
        };
        if approx_eq(target, current) {
            tracing::trace!(target, current, "payload equals current output; ignored");
            return None;
        }
        Some(target)
    }
}
