//! Core type definitions shared by the cache subsystem and its callers.

pub mod payload;
pub mod turn;

pub use payload::{Envelope, Provenance, ENVELOPE_SCHEMA_VERSION};
pub use turn::{Turn, TurnRole};
