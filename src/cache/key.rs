//! Cache key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::turn::Turn;
use crate::{Error, Result};

/// Logical request family, prefixed into the hash input so that different
/// request types never share a key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Conversational answer (FAQ / policy questions).
    Chat,
    /// Order-intent lookup against the product catalog.
    Order,
}

impl RequestKind {
    fn tag(&self) -> &'static str {
        match self {
            RequestKind::Chat => "chat",
            RequestKind::Order => "order",
        }
    }
}

/// Derived, fixed-shape cache identifier: a hex SHA-256 digest plus the
/// request kind it was derived for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
    pub kind: RequestKind,
}

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Maps `(message, history)` to a [`CacheKey`] deterministically.
///
/// Canonicalization: surrounding whitespace is trimmed and internal
/// whitespace runs in the message collapse to a single space, so incidental
/// formatting differences do not defeat the cache. History turns are hashed
/// in conversation order, verbatim. Every field entering the digest is
/// length-prefixed; `("a","bc")` and `("ab","c")` cannot collide.
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    kind: RequestKind,
}

impl KeyNormalizer {
    pub fn new() -> Self {
        Self::for_kind(RequestKind::Chat)
    }

    pub fn for_kind(kind: RequestKind) -> Self {
        Self { kind }
    }

    /// Derive the key for a request.
    ///
    /// Fails with [`Error::InvalidInput`] when the message is empty or
    /// whitespace-only; the caller must not attempt a lookup in that case.
    pub fn derive(&self, message: &str, history: &[Turn]) -> Result<CacheKey> {
        let canonical = canonicalize_message(message);
        if canonical.is_empty() {
            return Err(Error::invalid_input("message is empty"));
        }

        let mut hasher = Sha256::new();
        update_field(&mut hasher, self.kind.tag());
        update_field(&mut hasher, &canonical);
        // Turn count is part of the canonical form.
        hasher.update((history.len() as u64).to_le_bytes());
        for turn in history {
            update_field(&mut hasher, turn.role.as_str());
            update_field(&mut hasher, &turn.text);
        }

        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Ok(CacheKey {
            hash,
            kind: self.kind,
        })
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

fn canonicalize_message(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
