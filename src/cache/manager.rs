//! Response cache orchestration.
//!
//! [`ResponseCache`] is the only type request handlers interact with. It
//! owns key derivation, hit/miss decisioning, provenance stamping, and the
//! fail-open policy: every environmental failure degrades to "act as if
//! there were no cache", surfaced to callers only as a miss.

use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::key::{CacheKey, KeyNormalizer, RequestKind};
use super::store::{CacheStore, StoreError, StoreResult};
use crate::types::payload::{Envelope, Provenance, ENVELOPE_SCHEMA_VERSION};
use crate::types::turn::Turn;
use crate::{Error, Result};

/// Configuration for [`ResponseCache`].
///
/// There is deliberately no default TTL: the handler supplies one per
/// write, and a missing or zero TTL is a caller error, not something the
/// cache papers over with silent unbounded retention.
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// When false, every lookup misses and every write is a no-op.
    pub enabled: bool,
    /// Encoded envelopes above this size are not stored.
    pub max_payload_size: usize,
    /// Optional namespace prepended to every key, for shared backends.
    pub key_prefix: Option<String>,
    /// Upper bound on any single store round trip.
    pub op_timeout: Duration,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_payload_size: 1024 * 1024,
            key_prefix: None,
            op_timeout: Duration::from_millis(250),
        }
    }
}

impl ResponseCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }
}

/// Snapshot of cache activity counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Store failures, timeouts, and undecodable entries - the observable
    /// trace of every swallowed fail-open degradation.
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of a cache lookup. Transient, never persisted.
#[derive(Debug, Clone)]
pub enum CacheResult {
    Hit {
        /// The caller's response fields, to be decoded by the caller.
        payload: Value,
        /// How long ago the entry was written.
        age: Duration,
        /// Always [`Provenance::Cache`] on a hit - stamped at read time by
        /// the orchestrator, never trusted from the stored blob.
        provenance: Provenance,
    },
    Miss,
}

impl CacheResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheResult::Hit { .. })
    }
}

/// Cache orchestrator sitting in front of the expensive upstream pipeline.
///
/// The store handle is constructed by the process and passed in; the cache
/// holds no ambient global state.
pub struct ResponseCache {
    config: ResponseCacheConfig,
    normalizer: KeyNormalizer,
    store: Box<dyn CacheStore>,
    stats: Arc<AtomicStats>,
}

impl ResponseCache {
    pub fn new(config: ResponseCacheConfig, store: Box<dyn CacheStore>) -> Self {
        Self::with_kind(config, store, RequestKind::Chat)
    }

    pub fn with_kind(
        config: ResponseCacheConfig,
        store: Box<dyn CacheStore>,
        kind: RequestKind,
    ) -> Self {
        Self {
            config,
            normalizer: KeyNormalizer::for_kind(kind),
            store,
            stats: Arc::new(AtomicStats::new()),
        }
    }

    /// Look up the cached response for a request.
    ///
    /// Never fails: invalid input, store unavailability, timeouts, and
    /// undecodable entries all surface as [`CacheResult::Miss`].
    pub async fn get_response(&self, message: &str, history: &[Turn]) -> CacheResult {
        if !self.config.enabled {
            return CacheResult::Miss;
        }
        let key = match self.normalizer.derive(message, history) {
            Ok(key) => self.prefix_key(key),
            Err(err) => {
                debug!(error = %err, "cache lookup skipped");
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return CacheResult::Miss;
            }
        };

        match self.bounded(self.store.get(&key)).await {
            Ok(Some(entry)) => match Envelope::from_bytes(&entry.payload) {
                Ok(env) if env.schema_version <= ENVELOPE_SCHEMA_VERSION => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, age_ms = entry.age.as_millis() as u64, "cache hit");
                    CacheResult::Hit {
                        payload: env.body,
                        age: entry.age,
                        provenance: Provenance::Cache,
                    }
                }
                _ => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %key, "discarding undecodable cache entry");
                    CacheResult::Miss
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache miss");
                CacheResult::Miss
            }
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %err, "cache store get failed, treating as miss");
                CacheResult::Miss
            }
        }
    }

    /// Store a freshly computed response under the same key that
    /// [`get_response`](Self::get_response) derives for these inputs.
    ///
    /// `ttl_secs == 0` is the one hard failure ([`Error::InvalidTtl`]);
    /// everything else - invalid input, oversize payload, store failure -
    /// degrades to a logged no-op so the request path never fails because
    /// caching failed.
    pub async fn set_response<T: Serialize>(
        &self,
        message: &str,
        history: &[Turn],
        payload: &T,
        ttl_secs: u64,
    ) -> Result<()> {
        if ttl_secs == 0 {
            return Err(Error::InvalidTtl(ttl_secs));
        }
        if !self.config.enabled {
            return Ok(());
        }
        let key = match self.normalizer.derive(message, history) {
            Ok(key) => self.prefix_key(key),
            Err(err) => {
                debug!(error = %err, "cache write skipped");
                return Ok(());
            }
        };

        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %err, "payload not serializable, response not cached");
                return Ok(());
            }
        };
        let bytes = match Envelope::fresh(body).to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %err, "envelope encoding failed, response not cached");
                return Ok(());
            }
        };
        if bytes.len() > self.config.max_payload_size {
            debug!(key = %key, size = bytes.len(), "payload exceeds cache limit, not storing");
            return Ok(());
        }

        let ttl = Duration::from_secs(ttl_secs);
        match self.bounded(self.store.set(&key, bytes, ttl)).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, ttl_secs, "cached response");
            }
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %err, "cache store set failed, response not cached");
            }
        }
        Ok(())
    }

    /// Explicitly remove the entry for a request, e.g. after an
    /// administrative correction of a bad answer. Best-effort: returns
    /// `false` when nothing was removed, including on store failure.
    pub async fn invalidate(&self, message: &str, history: &[Turn]) -> bool {
        if !self.config.enabled {
            return false;
        }
        let key = match self.normalizer.derive(message, history) {
            Ok(key) => self.prefix_key(key),
            Err(err) => {
                debug!(error = %err, "cache invalidation skipped");
                return false;
            }
        };
        match self.bounded(self.store.invalidate(&key)).await {
            Ok(removed) => {
                if removed {
                    self.stats.deletes.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "cache entry invalidated");
                }
                removed
            }
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %err, "cache store invalidate failed");
                false
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Bound a store round trip by the configured timeout; an elapsed
    /// timeout is reported as a store failure and handled fail-open.
    async fn bounded<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match timeout(self.config.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.op_timeout)),
        }
    }

    fn prefix_key(&self, key: CacheKey) -> CacheKey {
        match self.config.key_prefix {
            Some(ref prefix) => CacheKey {
                hash: format!("{}:{}", prefix, key.hash),
                kind: key.kind,
            },
            None => key,
        }
    }
}
