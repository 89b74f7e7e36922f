//! Optional single-flight coalescing for concurrent identical misses.
//!
//! The core contract does not deduplicate upstream calls: two simultaneous
//! first-time requests for the same message may both miss and both invoke
//! the expensive upstream, last write winning. [`FlightTable`] is the
//! opt-in enhancement layer for callers that want at-most-one computation
//! per key under bursty identical traffic: a handler asks [`FlightTable::begin`]
//! before calling upstream, and only the `Lead` caller proceeds; `Follow`
//! callers can re-poll the cache instead. Markers carry their own short TTL
//! so a crashed lead never wedges a key.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::key::CacheKey;

#[derive(Debug, Clone)]
pub struct FlightConfig {
    /// How long an in-flight marker is honored before it is presumed dead.
    pub pending_ttl: Duration,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            pending_ttl: Duration::from_secs(15),
        }
    }
}

impl FlightConfig {
    pub fn with_pending_ttl(mut self, pending_ttl: Duration) -> Self {
        self.pending_ttl = pending_ttl;
        self
    }
}

/// Whether the caller owns the upstream computation for this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightDecision {
    /// No live marker existed; the caller computes and must call
    /// [`FlightTable::finish`] when done.
    Lead,
    /// Another caller is already computing this key.
    Follow,
}

/// In-process table of keys with an upstream computation in flight.
pub struct FlightTable {
    config: FlightConfig,
    pending: Mutex<HashMap<String, Instant>>,
}

impl FlightTable {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Claim the computation for a key, or learn that one is in flight.
    pub fn begin(&self, key: &CacheKey) -> FlightDecision {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            // A poisoned table must not stall requests; duplicate upstream
            // work is the acceptable degradation.
            Err(_) => return FlightDecision::Lead,
        };
        let now = Instant::now();
        pending.retain(|_, started| now.duration_since(*started) < self.config.pending_ttl);
        if pending.contains_key(&key.hash) {
            return FlightDecision::Follow;
        }
        pending.insert(key.hash.clone(), now);
        FlightDecision::Lead
    }

    /// Release the marker after the lead caller finishes (or fails).
    pub fn finish(&self, key: &CacheKey) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&key.hash);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for FlightTable {
    fn default() -> Self {
        Self::new(FlightConfig::default())
    }
}
