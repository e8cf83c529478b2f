//! `KeyValueStore` implementations: shared in-memory map and an atomically
//! rewritten TOML file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use softstart_traits::{BoxError, KeyValueStore};

use crate::atomic::write_atomic;

/// In-memory store. Clones share the same map, so a value written by one
/// controller is visible to a controller created later from a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, f64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without going through the trait.
    pub fn insert(&self, key: &str, value: f64) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    /// Peek at a stored value.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<f64>, BoxError> {
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: f64) -> Result<(), BoxError> {
        self.insert(key, value);
        Ok(())
    }
}

/// File-backed store holding a flat TOML table, e.g. `currentPower = 42.0`.
///
/// Writes go through a temp file and a rename so a crash mid-write leaves
/// the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<toml::Table, BoxError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text.parse::<toml::Table>()?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(toml::Table::new()),
            Err(e) => Err(Box::new(e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<f64>, BoxError> {
        let table = self.read_table()?;
        match table.get(key) {
            None => Ok(None),
            Some(toml::Value::Float(f)) => Ok(Some(*f)),
            Some(toml::Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(other) => Err(format!(
                "{}: key {key:?} holds a {}, expected a number",
                self.path.display(),
                other.type_str()
            )
            .into()),
        }
    }

    fn set(&mut self, key: &str, value: f64) -> Result<(), BoxError> {
        let mut table = self.read_table().unwrap_or_default();
        table.insert(key.to_string(), toml::Value::Float(value));
        let text = toml::to_string(&table)?;
        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }
}
