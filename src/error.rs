use crate::cache::store::StoreError;
use thiserror::Error;

/// Unified error type for the response cache subsystem.
///
/// Only [`Error::InvalidTtl`] is ever surfaced to a request handler as a
/// hard failure; it marks a caller bug, not an environmental condition.
/// Everything else is downgraded inside the orchestrator to a miss or a
/// logged no-op so the request path never blocks on the cache.
#[derive(Debug, Error)]
pub enum Error {
    /// No cache key could be derived from the request (e.g. empty message).
    #[error("invalid cache input: {reason}")]
    InvalidInput { reason: String },

    /// Caller supplied a non-positive TTL on a write.
    #[error("invalid TTL: {0} seconds (must be a positive integer)")]
    InvalidTtl(u64),

    /// Backing store unreachable, timed out, or otherwise failing.
    #[error("cache store error: {0}")]
    Store(#[from] StoreError),

    /// Payload envelope could not be encoded or decoded.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new invalid-input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True when the failure is environmental and the fail-open policy
    /// applies: the orchestrator acts as if there were no cache.
    pub fn is_fail_open(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Serialization(_))
    }
}
