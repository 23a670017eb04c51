//! Outbound gameplay intent frames.

use serde::{Deserialize, Serialize};

use crate::{Phase, ProtocolError};

/// One outbound frame per phase transition.
///
/// Carries the phase and, for Hold and Release, the accumulated hold
/// duration in whole seconds. Intents are best-effort: a frame that cannot
/// be sent is dropped, since only the latest hold state matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Gameplay phase this intent announces.
    pub phase: Phase,
    /// Accumulated hold duration in seconds.
    pub duration: u64,
}

impl Intent {
    /// Intent announcing the start of a hold cycle.
    #[must_use]
    pub fn push() -> Self {
        Self { phase: Phase::Push, duration: 0 }
    }

    /// Periodic intent carrying the accumulated hold duration.
    #[must_use]
    pub fn hold(duration: u64) -> Self {
        Self { phase: Phase::Hold, duration }
    }

    /// Final intent of a cycle, carrying the total hold duration.
    #[must_use]
    pub fn release(duration: u64) -> Self {
        Self { phase: Phase::Release, duration }
    }

    /// Serialize the intent to its JSON wire form.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
