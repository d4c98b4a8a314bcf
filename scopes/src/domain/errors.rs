//! Structured error types for scopes
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Unmatched starts and stops are not errors: the reconstructor discards them
//! silently. These types only cover input that cannot be decoded at all and
//! output that cannot be written.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegacyDecodeError {
    #[error("Legacy event has no type (zeroed event, version {version})")]
    NoneType { version: u8 },

    #[error("Unknown legacy event type {event_type} (version {version})")]
    UnknownType { event_type: u8, version: u8 },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write trace JSON: {0}")]
    Json(#[from] serde_json::Error),
}
