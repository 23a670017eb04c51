//! Transport client error types.

use thiserror::Error;

/// Errors surfaced synchronously by the transport client.
///
/// Connection failures are not in here: they surface asynchronously as a
/// [`crate::Disconnected`] bus event.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured endpoint does not parse as a URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The room-stats request failed.
    #[error("room stats request failed: {0}")]
    Http(#[from] reqwest::Error),
}
