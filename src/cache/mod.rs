//! # Response Caching
//!
//! This module is the heart of the crate: it turns conversational requests
//! into stable keys, stores opaque response payloads with per-entry TTL,
//! and sits transparently in front of the expensive upstream pipeline.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | Orchestrator: lookup, write-after-compute, invalidation |
//! | [`ResponseCacheConfig`] | Behavior limits (size, timeout, namespacing) |
//! | [`KeyNormalizer`] | Deterministic `(message, history)` -> key derivation |
//! | [`CacheStore`] | Trait for pluggable store backends |
//! | [`MemoryStore`] | In-process map with expiry and LRU eviction |
//! | [`NullStore`] | No-op store for disabling caching |
//! | [`FlightTable`] | Opt-in single-flight layer for concurrent misses |
//!
//! ## Example
//!
//! ```rust
//! use reply_cache::cache::{MemoryStore, ResponseCache, ResponseCacheConfig};
//! use std::time::Duration;
//!
//! let config = ResponseCacheConfig::default()
//!     .with_key_prefix("support")
//!     .with_op_timeout(Duration::from_millis(100));
//! let cache = ResponseCache::new(config, Box::new(MemoryStore::new(1000)));
//! # let _ = cache;
//! ```
//!
//! ## Fail-Open Contract
//!
//! The cache is an optimization, never a dependency the request path can be
//! blocked by. Store unavailability and timeouts surface to callers as
//! misses; only a non-positive TTL on a write - a caller bug - is a hard
//! error.

pub mod flight;
pub mod key;
pub mod manager;
pub mod store;

pub use flight::{FlightConfig, FlightDecision, FlightTable};
pub use key::{CacheKey, KeyNormalizer, RequestKind};
pub use manager::{CacheResult, CacheStats, ResponseCache, ResponseCacheConfig};
pub use store::{CacheStore, MemoryStore, NullStore, StoreError, StoredEntry};
