//! Mock storage backends.

use crate::storage::{KeyValueStorage, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Storage that fails every operation, like a browser with storage disabled.
#[derive(Debug, Default)]
pub struct UnavailableStorage {
    attempts: AtomicUsize,
}

impl UnavailableStorage {
    /// Create a new failing storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations attempted so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }
}

impl KeyValueStorage for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        self.fail()
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.fail()
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        self.fail()
    }
}
