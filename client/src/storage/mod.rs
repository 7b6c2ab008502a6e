//! Key-value persistence for the session.
//!
//! The session store mirrors itself into a [`KeyValueStorage`] under three
//! independent keys. Implementations are synchronous: every call completes
//! before the session mutation it belongs to becomes visible.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage key holding the JSON-encoded user profile.
pub const USER_KEY: &str = "user";
/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// All keys owned by the session.
pub const SESSION_KEYS: [&str; 3] = [USER_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY];

/// Errors raised by a storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend is not available (disabled, quota, sandbox).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing medium failed.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Synchronous string key-value storage.
///
/// # Implementation Notes
///
/// - Absence of a key is `Ok(None)`, not an error
/// - `remove` of a missing key succeeds
pub trait KeyValueStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
