//! Payload envelope: what the store physically holds.
//!
//! The cache never interprets the caller's response fields. A payload is
//! wrapped in a schema-versioned [`Envelope`] at write time, serialized to
//! bytes, and handed back as raw JSON on a hit for the caller to decode.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Current envelope layout version. Entries written by a newer layout are
/// discarded on read rather than misinterpreted.
pub const ENVELOPE_SCHEMA_VERSION: u16 = 1;

/// Where a response handed to the end caller came from.
///
/// Stamped by the orchestrator, never by the caller: entries are written
/// with [`Provenance::Upstream`] (fixed at write time), and every hit is
/// reported with [`Provenance::Cache`] regardless of what the stored blob
/// itself claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Served from the cache store.
    Cache,
    /// Freshly computed by the upstream pipeline.
    Upstream,
}

/// Schema-versioned wrapper around an opaque response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub schema_version: u16,
    pub provenance: Provenance,
    /// The caller's response fields, uninterpreted by the cache.
    pub body: Value,
}

impl Envelope {
    /// Wrap a freshly computed payload for storage.
    pub fn fresh(body: Value) -> Self {
        Self {
            schema_version: ENVELOPE_SCHEMA_VERSION,
            provenance: Provenance::Upstream,
            body,
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_stamps_upstream_provenance_and_current_version() {
        let env = Envelope::fresh(json!({"answer": "30 days"}));
        assert_eq!(env.provenance, Provenance::Upstream);
        assert_eq!(env.schema_version, ENVELOPE_SCHEMA_VERSION);
    }

    #[test]
    fn envelope_round_trips_through_bytes() {
        let env = Envelope::fresh(json!({"answer": "30 days", "intent": "refund"}));
        let bytes = env.to_bytes().unwrap();
        let decoded = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn garbage_bytes_do_not_decode() {
        assert!(Envelope::from_bytes(b"not json at all").is_err());
    }
}
