//! Persistent key-value storage behind the response cache.
//!
//! The cache does not care where entries live; the host application injects
//! whatever [`KeyValueStore`] suits it (SQLite, platform keyval plugin, a
//! plain JSON file). Two implementations ship with the crate:
//! [`MemoryKvStore`] for tests and memory-only operation, and [`FileKvStore`]
//! backed by a single JSON file under `~/.dealpilot`.

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous, fallible key-value store.
///
/// All four operations may fail; callers in the cache layer treat failures
/// as degraded persistence, never as errors of their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// List every key currently present in the store.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Remove all of the given keys. Missing keys are not an error.
    async fn remove_many(&self, keys: &[String]) -> Result<()>;
}
