//! External persistence hook for box geometry.

use crate::geometry::BoxRect;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::RwLock;
use thiserror::Error;

/// Geometry store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend that persists box geometry between sessions.
///
/// Implementations are called synchronously from the gesture path and
/// must not block.
pub trait GeometryStore {
    /// Persist the rect under `key`.
    fn save(&self, key: &str, rect: &BoxRect) -> StoreResult<()>;

    /// Load the rect saved under `key`, if any.
    fn load(&self, key: &str) -> StoreResult<Option<BoxRect>>;
}

impl<S: GeometryStore + ?Sized> GeometryStore for Rc<S> {
    fn save(&self, key: &str, rect: &BoxRect) -> StoreResult<()> {
        (**self).save(key, rect)
    }

    fn load(&self, key: &str) -> StoreResult<Option<BoxRect>> {
        (**self).load(key)
    }
}

/// In-memory geometry store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, BoxRect>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeometryStore for MemoryStore {
    fn save(&self, key: &str, rect: &BoxRect) -> StoreResult<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
        slots.insert(key.to_string(), *rect);
        Ok(())
    }

    fn load(&self, key: &str) -> StoreResult<Option<BoxRect>> {
        let slots = self
            .slots
            .read()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
        Ok(slots.get(key).copied())
    }
}
