//! JSON-file key-value store.
//!
//! Persists the whole map to a single file at `~/.dealpilot/cache/kv.json`.
//! A missing or corrupt file reads as empty; the cache layer re-populates it
//! over time. The file is rewritten in full on every mutation, which is fine
//! at the sizes the response cache produces (tens of small entries).

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

use super::KeyValueStore;

/// On-disk shape of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct KvFile {
    entries: HashMap<String, String>,
}

/// File-backed store.
pub struct FileKvStore {
    path: PathBuf,
}

impl FileKvStore {
    /// Create a store at the default location, `~/.dealpilot/cache/kv.json`.
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dealpilot")
            .join("cache")
            .join("kv.json");
        Self { path }
    }

    /// Create a store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load_file(&self) -> KvFile {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(file) => file,
                Err(e) => {
                    warn!("KV store file is corrupt, starting empty: {}", e);
                    KvFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => KvFile::default(),
            Err(e) => {
                warn!("Failed to read KV store file, starting empty: {}", e);
                KvFile::default()
            }
        }
    }

    async fn save_file(&self, file: &KvFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(file)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

impl Default for FileKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_file().await.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut file = self.load_file().await;
        file.entries.insert(key.to_string(), value.to_string());
        self.save_file(&file).await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.load_file().await.entries.keys().cloned().collect())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<()> {
        let mut file = self.load_file().await;
        let mut removed = false;
        for key in keys {
            removed |= file.entries.remove(key).is_some();
        }
        if removed {
            self.save_file(&file).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::with_path(dir.path().join("kv.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.json");
        FileKvStore::with_path(path.clone())
            .set("k", "v")
            .await
            .unwrap();

        let reopened = FileKvStore::with_path(path);
        assert_eq!(reopened.get("k").await.unwrap(), Some("v".into()));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let (_dir, store) = temp_store();
        tokio::fs::create_dir_all(store.path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&store.path, "not json{{").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_many() {
        let (_dir, store) = temp_store();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.remove_many(&["a".to_string()]).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), Some("2".into()));
    }
}
