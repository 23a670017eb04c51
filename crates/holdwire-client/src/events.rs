//! Internal connection lifecycle events.
//!
//! Published on the bus by the transport client; carry no payload.

/// The persistent connection is open and frames can flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connected;

/// The persistent connection closed, failed to open, or errored.
///
/// Emitted exactly once per connection attempt that reached the end of its
/// life, including explicit [`crate::NetClient::stop`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;
