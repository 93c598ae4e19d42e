//! Context-aware assistant response cache with LRU eviction.
//!
//! Answers are keyed by a SHA-256 digest of the question plus the context
//! fingerprint (see [`super::key`]). The store holds at most `capacity`
//! entries (50 by default); inserting past capacity evicts the least
//! recently used entry. Entries are mirrored to an injected
//! [`KeyValueStore`] so cached answers survive restarts; every storage
//! failure is logged and swallowed, so a dead backend degrades the cache to
//! memory-only instead of breaking callers.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use std::sync::Arc;
//! use dealpilot::cache::ContextAwareResponseCache;
//! use dealpilot::storage::MemoryKvStore;
//!
//! let cache = ContextAwareResponseCache::load(Arc::new(MemoryKvStore::new())).await;
//! cache.cache_response("What are the risks?", "High vacancy", None).await;
//! assert_eq!(
//!     cache.get_cached_response("What are the risks?", None).await,
//!     Some("High vacancy".to_string()),
//! );
//! # });
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::storage::KeyValueStore;

use super::context::ContextSnapshot;
use super::key::derive_key;

/// Default maximum number of cached answers.
pub const DEFAULT_CAPACITY: usize = 50;

/// Storage key prefix for persisted cache entries. Everything under this
/// prefix belongs to the cache and may be removed by `clear_cache`.
const STORAGE_PREFIX: &str = "ai_response_cache:";

/// A single cached answer.
#[derive(Debug, Clone)]
struct CacheEntry {
    response: String,
    /// Strictly increasing sequence number, bumped on every read or write.
    /// The entry with the smallest value is the next eviction victim.
    recency: u64,
}

/// Wire shape of a persisted entry.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    response: String,
    recency: u64,
}

/// In-memory LRU store. All mutation happens under the cache's mutex.
struct LruStore {
    entries: HashMap<String, CacheEntry>,
    /// Keys whose recency was bumped by a read since the last write. The
    /// next `put` flushes their updated recency to storage.
    dirty: HashSet<String>,
    capacity: usize,
    next_seq: u64,
}

impl LruStore {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            dirty: HashSet::new(),
            // A capacity of 0 would make every put evict its own insert.
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Look up a response, marking the entry most recently used on hit.
    fn get(&mut self, key: &str) -> Option<String> {
        let seq = self.bump();
        let entry = self.entries.get_mut(key)?;
        entry.recency = seq;
        self.dirty.insert(key.to_string());
        Some(entry.response.clone())
    }

    /// Insert or overwrite an entry, returning both the recency assigned to
    /// it and the key evicted to stay within capacity, if any.
    fn put(&mut self, key: String, response: String) -> (u64, Option<String>) {
        let seq = self.bump();
        // The caller persists this entry anyway; no need to flush it twice.
        self.dirty.remove(&key);
        self.entries
            .insert(key, CacheEntry { response, recency: seq });
        if self.entries.len() <= self.capacity {
            return (seq, None);
        }
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.recency)
            .map(|(k, _)| k.clone());
        if let Some(victim) = &victim {
            debug!(key = %&victim[..8.min(victim.len())], "Evicting LRU cache entry");
            self.entries.remove(victim);
            self.dirty.remove(victim);
        }
        (seq, victim)
    }

    /// Drain the read-bumped keys into `(key, wire entry)` pairs for
    /// persistence. Keys evicted since the bump are skipped.
    fn take_dirty(&mut self) -> Vec<(String, PersistedEntry)> {
        let keys: Vec<String> = self.dirty.drain().collect();
        keys.into_iter()
            .filter_map(|key| {
                let entry = self.entries.get(&key)?;
                let persisted = PersistedEntry {
                    response: entry.response.clone(),
                    recency: entry.recency,
                };
                Some((key, persisted))
            })
            .collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dirty.clear();
    }
}

/// Context-aware response cache.
///
/// One instance is constructed at application start via [`load`] and handed
/// to the assistant feature; tests construct their own instance per case so
/// nothing leaks between them.
///
/// [`load`]: ContextAwareResponseCache::load
pub struct ContextAwareResponseCache {
    store: Mutex<LruStore>,
    storage: Arc<dyn KeyValueStore>,
}

impl ContextAwareResponseCache {
    /// Construct a cache with the default capacity and hydrate it from
    /// `storage`.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::load_with_capacity(storage, DEFAULT_CAPACITY).await
    }

    /// Construct a cache sized per `config` and hydrate it from `storage`.
    /// `config.enabled` is the host's concern; a disabled cache is simply
    /// never consulted.
    pub async fn from_config(storage: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::load_with_capacity(storage, config.capacity).await
    }

    /// Construct a cache bounded at `capacity` entries and hydrate it from
    /// `storage`. Never fails: unreadable storage or corrupt records simply
    /// mean fewer (or no) prior entries, and corrupt records are deleted.
    pub async fn load_with_capacity(storage: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        let cache = Self {
            store: Mutex::new(LruStore::new(capacity)),
            storage,
        };
        cache.hydrate().await;
        cache
    }

    /// Return the cached answer for `question` under `context`, or `None`.
    ///
    /// A hit marks the entry most recently used. The recency bump happens in
    /// memory only, keeping reads free of storage I/O; the entry is marked
    /// dirty and its updated recency is written out by the next
    /// [`cache_response`](Self::cache_response). A bump after the last write
    /// of a process is not persisted.
    pub async fn get_cached_response(
        &self,
        question: &str,
        context: Option<&ContextSnapshot>,
    ) -> Option<String> {
        let key = derive_key(question, context);
        self.lock_store().get(&key)
    }

    /// Store an answer for `question` under `context`.
    ///
    /// Evicts the least recently used entry when the store is over capacity.
    /// The in-memory state is updated first and stays authoritative. The
    /// storage writes afterwards are best-effort: the new entry, plus any
    /// recency bumps accumulated by reads since the previous write.
    pub async fn cache_response(
        &self,
        question: &str,
        response: &str,
        context: Option<&ContextSnapshot>,
    ) {
        let key = derive_key(question, context);
        let (evicted, mut writes) = {
            let mut store = self.lock_store();
            let (recency, evicted) = store.put(key.clone(), response.to_string());
            let mut writes = store.take_dirty();
            writes.push((
                key,
                PersistedEntry {
                    response: response.to_string(),
                    recency,
                },
            ));
            (evicted, writes)
        };

        for (key, persisted) in writes.drain(..) {
            match serde_json::to_string(&persisted) {
                Ok(value) => {
                    if let Err(e) = self.storage.set(&storage_key(&key), &value).await {
                        warn!("Failed to persist cached response: {}", e);
                    }
                }
                Err(e) => warn!("Failed to encode cached response: {}", e),
            }
        }
        if let Some(victim) = evicted {
            if let Err(e) = self.storage.remove_many(&[storage_key(&victim)]).await {
                warn!("Failed to remove evicted cache entry from storage: {}", e);
            }
        }
    }

    /// Drop every cached answer, in memory and in storage.
    pub async fn clear_cache(&self) {
        self.lock_store().clear();
        match self.storage.list_keys().await {
            Ok(keys) => {
                let ours: Vec<String> = keys
                    .into_iter()
                    .filter(|k| k.starts_with(STORAGE_PREFIX))
                    .collect();
                if ours.is_empty() {
                    return;
                }
                if let Err(e) = self.storage.remove_many(&ours).await {
                    warn!("Failed to clear persisted cache entries: {}", e);
                }
            }
            Err(e) => warn!("Failed to list persisted cache entries: {}", e),
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock_store().entries.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Acquire the store lock, recovering from poisoning. A panicking reader
    /// or writer leaves the map itself intact (every mutation is a single
    /// HashMap/HashSet call), so the public never-fails contract holds even
    /// then.
    fn lock_store(&self) -> std::sync::MutexGuard<'_, LruStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- hydration ----------------------------------------------------------

    /// Load persisted entries into memory. Corrupt records are dropped from
    /// storage; any storage failure leaves the cache empty but functional.
    async fn hydrate(&self) {
        let keys = match self.storage.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(
                    "Failed to list persisted cache entries, starting empty: {}",
                    e
                );
                return;
            }
        };

        let mut loaded: Vec<(String, PersistedEntry)> = Vec::new();
        let mut corrupt: Vec<String> = Vec::new();
        for storage_key in keys.into_iter().filter(|k| k.starts_with(STORAGE_PREFIX)) {
            let cache_key = storage_key[STORAGE_PREFIX.len()..].to_string();
            match self.storage.get(&storage_key).await {
                Ok(Some(value)) => match serde_json::from_str::<PersistedEntry>(&value) {
                    Ok(entry) => loaded.push((cache_key, entry)),
                    Err(e) => {
                        warn!("Dropping corrupt cache entry {}: {}", storage_key, e);
                        corrupt.push(storage_key);
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to read persisted cache entry {}: {}", storage_key, e);
                }
            }
        }

        {
            let mut store = self.lock_store();
            // Oldest first; re-assigned sequence numbers then preserve the
            // persisted eviction order without ties. If the configured
            // capacity shrank since the entries were written, keep only the
            // most recent ones.
            loaded.sort_by_key(|(_, e)| e.recency);
            let skip = loaded.len().saturating_sub(store.capacity);
            for (key, entry) in loaded.into_iter().skip(skip) {
                let seq = store.bump();
                store.entries.insert(
                    key,
                    CacheEntry {
                        response: entry.response,
                        recency: seq,
                    },
                );
            }
        }

        if !corrupt.is_empty() {
            if let Err(e) = self.storage.remove_many(&corrupt).await {
                warn!("Failed to remove corrupt cache entries: {}", e);
            }
        }
    }
}

fn storage_key(cache_key: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, cache_key)
}
