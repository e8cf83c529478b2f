pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Boxed error type used across the collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-instance scalar store consulted by a ramp controller.
///
/// Implementations are scoped to a single controller: two controllers must
/// never share the same backing slot.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<f64>, BoxError>;
    fn set(&mut self, key: &str, value: f64) -> Result<(), BoxError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<f64>, BoxError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: f64) -> Result<(), BoxError> {
        (**self).set(key, value)
    }
}
