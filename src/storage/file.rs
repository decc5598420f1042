//! File-backed storage slot
//!
//! Each slot is one JSON file named after its key inside a data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::StorageError;

use super::SessionStorage;

/// Slot stored at `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    key: String,
}

impl FileStorage {
    /// Create a file slot
    ///
    /// # Example
    /// ```ignore
    /// let storage = FileStorage::new("./data", "brain_gym_metrics");
    /// ```
    pub fn new<P: AsRef<Path>>(dir: P, key: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.to_string(),
        }
    }

    /// Slot under the default key
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir, DEFAULT_STORAGE_KEY)
    }

    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path()) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn save(&mut self, data: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_slot_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(temp_dir.path());

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory_and_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("nested"), "history");

        storage.save("[]").unwrap();

        assert!(storage.path().ends_with("nested/history.json"));
        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_save_overwrites_slot() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::in_dir(temp_dir.path());

        storage.save("[1]").unwrap();
        storage.save("[2]").unwrap();

        assert_eq!(storage.load().unwrap().as_deref(), Some("[2]"));
    }
}
