//! Protocol error types.

use thiserror::Error;

/// Errors encoding or decoding protocol frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An outbound envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
    /// An inbound frame was not a valid event.
    #[error("malformed inbound event: {0}")]
    Decode(#[source] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
