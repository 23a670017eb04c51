//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding wire frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON or a known variant failed to parse.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame parsed as JSON but carries no string `kind` field.
    #[error("frame has no `kind` discriminant")]
    MissingDiscriminant,
}
