//! # reply-cache
//!
//! Response caching subsystem for conversational support backends: it sits
//! between a request handler and an expensive language-model pipeline,
//! answering repeated questions from the cache instead of recomputing them.
//!
//! ## Overview
//!
//! A request is identified by its current message plus the ordered
//! conversation history. The [`cache::KeyNormalizer`] derives a stable,
//! collision-resistant key from those inputs; the [`cache::ResponseCache`]
//! decides hit vs. miss against a pluggable [`cache::CacheStore`], enforces
//! per-entry TTL, and stamps each result with its provenance. Misses are
//! never stored - an entry is written only after the upstream pipeline has
//! computed a response (write-after-compute).
//!
//! ## Core Philosophy
//!
//! - **Fail open**: a broken or slow store degrades to "no cache", never to
//!   a failed request.
//! - **Payload-agnostic**: responses are opaque, schema-versioned blobs;
//!   the caller decodes them, the cache does not.
//! - **Explicit lifecycle**: the store handle is constructed at process
//!   start and passed in; there is no global client.
//!
//! ## Quick Start
//!
//! ```rust
//! use reply_cache::{CacheResult, MemoryStore, ResponseCache, ResponseCacheConfig, Turn};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> reply_cache::Result<()> {
//! let store = MemoryStore::new(1000);
//! let cache = ResponseCache::new(ResponseCacheConfig::default(), Box::new(store));
//!
//! let history = vec![Turn::user("Hi"), Turn::assistant("Hello! How can I help?")];
//! let message = "What is your refund policy?";
//!
//! if let CacheResult::Miss = cache.get_response(message, &history).await {
//!     // ... invoke the upstream pipeline, then store its answer:
//!     let answer = json!({ "answer": "Refunds are accepted within 30 days." });
//!     cache.set_response(message, &history, &answer, 1800).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Key derivation, store backends, orchestration |
//! | [`types`] | Conversation turns and the payload envelope |
//! | [`error`] | Unified error type and fail-open taxonomy |

pub mod cache;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use cache::{
    CacheKey, CacheResult, CacheStats, CacheStore, FlightConfig, FlightDecision, FlightTable,
    KeyNormalizer, MemoryStore, NullStore, RequestKind, ResponseCache, ResponseCacheConfig,
    StoreError, StoredEntry,
};
pub use error::Error;
pub use types::{
    payload::{Envelope, Provenance},
    turn::{Turn, TurnRole},
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
