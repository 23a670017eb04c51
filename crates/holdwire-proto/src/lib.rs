//! Wire format for the holdwire game protocol.
//!
//! Frames are self-describing JSON text. Inbound frames carry a `kind`
//! discriminant selecting one of the [`ServerMessage`] variants; outbound
//! frames are [`Intent`] objects describing the player's current gameplay
//! phase. Room statistics arrive over a separate HTTP channel as
//! [`RoomStats`].
//!
//! Unknown inbound `kind` values decode to `None` rather than an error so
//! that newer servers can ship new message kinds without crashing older
//! clients.

pub mod error;
pub mod intent;
pub mod phase;
pub mod server;

pub use error::ProtocolError;
pub use intent::Intent;
pub use phase::{Category, Phase};
pub use server::{ErrorMessage, Record, RoomStats, ServerMessage, Update};
