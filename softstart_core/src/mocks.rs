//! Test and helper mocks for softstart_core

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use softstart_traits::{BoxError, KeyValueStore};

/// A store whose writes always fail; reads report an empty store.
/// Counts write attempts so tests can check the controller keeps trying.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    attempts: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<f64>, BoxError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: f64) -> Result<(), BoxError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Box::new(std::io::Error::other("store unavailable")))
    }
}

/// A store whose reads fail; writes are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<f64>, BoxError> {
        Err(Box::new(std::io::Error::other("store unreadable")))
    }

    fn set(&mut self, _key: &str, _value: f64) -> Result<(), BoxError> {
        Ok(())
    }
}
