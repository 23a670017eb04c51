//! Inbound server messages.
//!
//! Every frame on the persistent connection is a JSON object with a string
//! `kind` discriminant. Each kind has its own payload struct so that bus
//! subscribers can listen per message type; [`ServerMessage`] is the decoded
//! union. [`RoomStats`] is not a socket frame; it arrives as the body of the
//! room-stats HTTP response.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Live standings while the player holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Authoritative hold duration in seconds.
    pub duration: u64,
    /// Server-side push timestamp (unix seconds).
    pub timestamp: u64,
    /// Rank among currently active holders.
    pub place_active: u64,
    /// Number of currently active holders.
    pub count_active: u64,
    /// Optional server-pushed notice text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Final standing for a completed hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Push timestamp of the recorded hold (unix seconds).
    pub timestamp: u64,
    /// Recorded hold duration in seconds.
    pub duration: u64,
    /// Rank on the leaderboard.
    pub place_leaderboard: u64,
    /// Number of leaderboard entries.
    pub count_leaderboard: u64,
    /// True if this hold set a new world record.
    pub world_record: bool,
}

/// Server-reported error, surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Human-readable error text.
    pub message: String,
}

/// A decoded inbound frame, discriminated by the `kind` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ServerMessage {
    /// `kind: "Update"` — live standings.
    Update(Update),
    /// `kind: "Record"` — completed-hold standing.
    Record(Record),
    /// `kind: "Error"` — user-facing error.
    Error(ErrorMessage),
}

impl ServerMessage {
    /// Decode one inbound frame.
    ///
    /// Returns `Ok(None)` for a structurally valid frame whose `kind` is
    /// unrecognized: unknown message kinds must not crash the client.
    pub fn decode(text: &str) -> Result<Option<Self>, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let Some(kind) = value.get("kind").and_then(serde_json::Value::as_str) else {
            return Err(ProtocolError::MissingDiscriminant);
        };
        match kind {
            "Update" | "Record" | "Error" => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }
}

/// Room statistics, fetched over HTTP outside the persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    /// Number of currently active holders in the room.
    pub count_active: u64,
    /// Number of leaderboard entries for the room.
    pub count_leaderboard: u64,
    /// All-time best hold duration in seconds.
    pub best_duration: u64,
    /// Best hold duration today, in seconds.
    pub todays_record: u64,
}
