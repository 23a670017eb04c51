//! Gameplay phase and button category enums.

use serde::{Deserialize, Serialize};

/// The player's gameplay phase.
///
/// Idle is both the initial state and the state reached after every
/// Push -> Hold -> Release cycle completes. The phase is shared between the
/// protocol (outbound [`crate::Intent`] frames) and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Button not held.
    Idle,
    /// Button just pressed, inside the debounce window.
    Push,
    /// Button held past the debounce window.
    Hold,
    /// Button released, terminal per cycle.
    Release,
}

impl Phase {
    /// Wire spelling of the phase.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Push => "push",
            Self::Hold => "hold",
            Self::Release => "release",
        }
    }
}

/// Button category selecting which room/leaderboard the player competes in.
///
/// `Prestige` is reachable only for premium users; `NewYear` is seasonal and
/// never part of the regular cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Seasonal new-year button.
    NewYear,
    /// Peace button.
    Peace,
    /// Love button.
    Love,
    /// Fortune button.
    Fortune,
    /// Premium-only prestige button.
    Prestige,
}

impl Category {
    /// Wire spelling of the category, used in query parameters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewYear => "newyear",
            Self::Peace => "peace",
            Self::Love => "love",
            Self::Fortune => "fortune",
            Self::Prestige => "prestige",
        }
    }

    /// Next category in the carousel order.
    #[must_use]
    pub fn next(self, premium: bool) -> Self {
        match self {
            Self::NewYear => Self::Love,
            Self::Love => Self::Fortune,
            Self::Fortune => Self::Peace,
            Self::Peace => {
                if premium {
                    Self::Prestige
                } else {
                    Self::Love
                }
            },
            Self::Prestige => Self::Love,
        }
    }

    /// Previous category in the carousel order.
    #[must_use]
    pub fn prev(self, premium: bool) -> Self {
        match self {
            Self::NewYear => Self::Peace,
            Self::Love => {
                if premium {
                    Self::Prestige
                } else {
                    Self::Peace
                }
            },
            Self::Fortune => Self::Love,
            Self::Peace => Self::Fortune,
            Self::Prestige => Self::Peace,
        }
    }
}
