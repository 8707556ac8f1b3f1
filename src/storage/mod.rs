//! Durable key/value storage for session material.
//!
//! Values are plain strings; structured values (`userInfo`) are stored as
//! serialized JSON. Reads and writes are synchronous.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Opaque session token.
pub const TOKEN_KEY: &str = "token";
/// Phone number the session was opened with.
pub const PHONE_KEY: &str = "phone";
/// Cached `/user/getUser` payload, serialized as JSON.
pub const USER_INFO_KEY: &str = "userInfo";

pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// `true` when `key` holds a non-empty value.
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some_and(|value| !value.is_empty()))
    }
}
