//! Persistent-connection transport client.
//!
//! Owns the lifecycle of one WebSocket connection to the game server:
//! translates outbound [`holdwire_proto::Intent`]s taken from the bus into
//! wire frames, decodes inbound frames, and publishes each decoded message
//! on its own bus channel. At most one live socket exists per client;
//! starting a new connection force-closes the previous one first.
//!
//! Network failures never propagate to callers. They surface solely as a
//! [`Disconnected`] bus event; reconnection policy belongs to the session
//! controller (this system has none: losing the connection drops the player
//! to Idle).

pub mod client;
pub mod config;
pub mod error;
pub mod events;

pub use client::{LinkState, NetClient};
pub use config::Endpoints;
pub use error::ClientError;
pub use events::{Connected, Disconnected};
