//! Cache store backends.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

use super::key::CacheKey;

/// Errors surfaced by a store backend.
///
/// The orchestrator downgrades all of these to a miss (fail open); they are
/// typed so operators can tell an unreachable backend from a slow one.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A stored payload together with its age at read time.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub payload: Bytes,
    pub age: Duration,
}

/// Key-value storage with per-entry expiry.
///
/// Implementations must support concurrent `get`/`set`/`invalidate` from
/// independent tasks; each operation is atomic on its single key and no
/// multi-key coordination is required. TTL positivity is validated by the
/// orchestrator before a write ever reaches the store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up an entry. `None` covers both never-set and expired keys;
    /// expiry must be checked at read time even if the backend also evicts
    /// in the background, because background eviction may lag.
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>>;

    /// Write an entry, replacing any prior entry for the key wholesale
    /// (new payload, new creation time, new TTL).
    async fn set(&self, key: &CacheKey, payload: Bytes, ttl: Duration) -> StoreResult<()>;

    /// Remove an entry immediately regardless of remaining TTL. Returns
    /// `false` when the key was logically absent.
    async fn invalidate(&self, key: &CacheKey) -> StoreResult<bool>;

    /// Drop every entry.
    async fn clear(&self) -> StoreResult<()>;

    /// Number of live (non-expired) entries.
    async fn len(&self) -> StoreResult<usize>;

    fn name(&self) -> &'static str;
}

struct Entry {
    payload: Bytes,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl Entry {
    fn new(payload: Bytes, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            payload,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// In-process store backed by a `RwLock`-guarded map.
///
/// Expired entries are dropped lazily on read and swept on write; when the
/// map reaches capacity the least recently accessed entry is evicted.
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    max_entries: usize,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, Entry>) {
        entries.retain(|_, e| !e.is_expired());
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        if let Some(entry) = entries.get_mut(&key.hash) {
            if entry.is_expired() {
                entries.remove(&key.hash);
                return Ok(None);
            }
            entry.last_accessed = Instant::now();
            return Ok(Some(StoredEntry {
                payload: entry.payload.clone(),
                age: entry.created_at.elapsed(),
            }));
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, payload: Bytes, ttl: Duration) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        self.evict_if_needed(&mut entries);
        entries.insert(key.hash.clone(), Entry::new(payload, ttl));
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> StoreResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        // An expired entry is logically absent even if still present.
        Ok(entries
            .remove(&key.hash)
            .map(|e| !e.is_expired())
            .unwrap_or(false))
    }

    async fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?
            .clear();
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(entries.values().filter(|e| !e.is_expired()).count())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// No-op store: every lookup misses, every write vanishes. Disables caching
/// without touching the request path.
pub struct NullStore;

impl NullStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Ok(None)
    }

    async fn set(&self, _: &CacheKey, _: Bytes, _: Duration) -> StoreResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _: &CacheKey) -> StoreResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
