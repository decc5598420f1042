//! Persistence backends for the session history
//!
//! The session store keeps its whole history in a single named slot holding
//! a JSON array of session records. Backends only move that string in and out;
//! parsing and recovery are the store's job.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Trait for key-value persistence of the serialized session history
pub trait SessionStorage {
    /// Read the slot; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot
    fn save(&mut self, data: &str) -> Result<(), StorageError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Box<S> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, data: &str) -> Result<(), StorageError> {
        (**self).save(data)
    }
}
