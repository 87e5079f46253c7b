//! Events fanned out to participants.

use battle_core::{BattleState, ConclusionReason, MatchMode, PlayerId, SessionId};
use serde::{Deserialize, Serialize};

/// Authoritative broadcasts. Every variant carries a full state snapshot;
/// receivers replace their copy instead of merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// Sent to each human participant's identity topic and to the session topic.
    MatchStarted {
        session: SessionId,
        mode: MatchMode,
        state: Box<BattleState>,
    },

    TurnResolved {
        session: SessionId,
        /// The turn that was resolved.
        turn: u32,
        state: Box<BattleState>,
        log: Vec<String>,
        /// Hex SHA-256 of `state`.
        digest: String,
    },

    MatchConcluded {
        session: SessionId,
        /// `None` for a draw.
        winner: Option<PlayerId>,
        reason: ConclusionReason,
        final_state: Box<BattleState>,
    },
}

impl ArenaEvent {
    pub fn session(&self) -> SessionId {
        match self {
            ArenaEvent::MatchStarted { session, .. }
            | ArenaEvent::TurnResolved { session, .. }
            | ArenaEvent::MatchConcluded { session, .. } => *session,
        }
    }

    pub fn state(&self) -> &BattleState {
        match self {
            ArenaEvent::MatchStarted { state, .. } | ArenaEvent::TurnResolved { state, .. } => {
                state
            }
            ArenaEvent::MatchConcluded { final_state, .. } => final_state,
        }
    }

    /// JSON payload for transports outside the process.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
