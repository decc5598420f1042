//! In-memory storage slot

use crate::error::StorageError;

use super::SessionStorage;

/// Volatile slot, used in tests and by hosts that persist on their own
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing slot contents
    pub fn with_contents(data: impl Into<String>) -> Self {
        Self {
            slot: Some(data.into()),
            writes: 0,
        }
    }

    /// Current slot contents
    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Number of saves performed
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, data: &str) -> Result<(), StorageError> {
        self.slot = Some(data.to_string());
        self.writes += 1;
        Ok(())
    }
}
