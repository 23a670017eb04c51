//! Session-state reducer.
//!
//! [`Session`] is the mutable record behind the UI: current phase, selected
//! category, hold timing, ranks, and counters. It is owned by the session
//! controller and mutated only from bus-handler context, never by the
//! transport client.
//!
//! The hold duration is monotonically non-decreasing within one
//! Push -> Release cycle, except when corrected downward by an authoritative
//! server-reported duration: the server value wins when smaller.

use holdwire_proto::{Category, ErrorMessage, Phase, Record, RoomStats, Update};

/// Mutable session state merged from input events and inbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Current gameplay phase.
    pub phase: Phase,
    /// Selected button category.
    pub category: Category,
    /// Whether the user may select premium categories.
    pub premium: bool,
    /// Unix timestamp (seconds) of the current push.
    pub push_timestamp: u64,
    /// Accumulated hold duration in seconds.
    pub hold_duration: u64,
    /// Rank among currently active holders.
    pub place_active: u64,
    /// Number of currently active holders.
    pub count_active: u64,
    /// Rank on the leaderboard.
    pub place_leaderboard: u64,
    /// Number of leaderboard entries.
    pub count_leaderboard: u64,
    /// All-time best hold duration for the room.
    pub best_duration: u64,
    /// Best hold duration today for the room.
    pub todays_record: u64,
    /// True while the last completed hold stands as the world record.
    pub world_record: bool,
    /// User-facing notice text (server message or error).
    pub notice: Option<String>,
}

impl Session {
    /// Fresh idle session for the given category.
    #[must_use]
    pub fn new(category: Category, premium: bool) -> Self {
        Self {
            phase: Phase::Idle,
            category,
            premium,
            push_timestamp: 0,
            hold_duration: 0,
            place_active: 0,
            count_active: 0,
            place_leaderboard: 0,
            count_leaderboard: 0,
            best_duration: 0,
            todays_record: 0,
            world_record: false,
            notice: None,
        }
    }

    /// Apply a locally-driven phase transition.
    ///
    /// Push seeds the active counters to 1 (the player is holding, rank
    /// unknown until the first Update) and records the push timestamp.
    pub fn apply_phase(&mut self, phase: Phase, duration: u64, now_unix: u64) {
        self.phase = phase;
        self.world_record = false;
        match phase {
            Phase::Push => {
                self.push_timestamp = now_unix;
                self.hold_duration = 0;
                self.place_active = 1;
                self.count_active = 1;
            },
            Phase::Hold | Phase::Release => {
                self.hold_duration = duration;
            },
            Phase::Idle => {},
        }
    }

    /// Merge a live-standings update.
    pub fn apply_update(&mut self, update: &Update) {
        // The server's duration is authoritative only downward: the local
        // clock may run ahead, never behind the server's.
        if update.duration < self.hold_duration {
            self.hold_duration = update.duration;
        }
        self.push_timestamp = update.timestamp;
        self.place_active = update.place_active;
        self.count_active = update.count_active;
        if let Some(text) = &update.message {
            self.notice = Some(text.clone());
        }
    }

    /// Merge a completed-hold record.
    pub fn apply_record(&mut self, record: &Record) {
        self.push_timestamp = record.timestamp;
        self.hold_duration = record.duration;
        self.place_leaderboard = record.place_leaderboard;
        self.count_leaderboard = record.count_leaderboard;
        self.world_record = record.world_record;
    }

    /// Store a server-reported error as the user-facing notice.
    pub fn apply_error(&mut self, error: &ErrorMessage) {
        self.notice = Some(error.message.clone());
    }

    /// Merge fetched room statistics.
    pub fn apply_room_stats(&mut self, stats: RoomStats) {
        self.count_active = stats.count_active;
        self.count_leaderboard = stats.count_leaderboard;
        self.best_duration = stats.best_duration;
        self.todays_record = stats.todays_record;
    }

    /// Switch category: drop to Idle and clear per-cycle state.
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.phase = Phase::Idle;
        self.push_timestamp = 0;
        self.hold_duration = 0;
        self.world_record = false;
        self.notice = None;
    }
}
