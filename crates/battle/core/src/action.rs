//! Client-declared moves.

use crate::ids::SessionId;

/// One card play declared for the current turn.
///
/// Ephemeral: it exists between submission and turn resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleAction {
    pub session: SessionId,
    /// Roster index of the acting combatant on the declaring side.
    pub combatant: u8,
    /// Index into the acting combatant's card list.
    pub card: u8,
    /// Optional roster index for single-target selectors.
    ///
    /// Interpreted on the enemy side for enemy selectors and on the own side for
    /// ally selectors. Missing or fainted targets fall back to automatic choice.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<u8>,
}

impl BattleAction {
    pub const fn new(session: SessionId, combatant: u8, card: u8) -> Self {
        Self {
            session,
            combatant,
            card,
            target: None,
        }
    }

    #[must_use]
    pub const fn targeting(mut self, target: u8) -> Self {
        self.target = Some(target);
        self
    }
}

/// What a side contributed to a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Declaration {
    /// Declared in time; may be empty when nothing is affordable.
    Actions(Vec<BattleAction>),
    /// The turn window elapsed without a declaration.
    Missed,
}

impl Declaration {
    pub fn actions(&self) -> &[BattleAction] {
        match self {
            Declaration::Actions(actions) => actions,
            Declaration::Missed => &[],
        }
    }

    pub fn is_missed(&self) -> bool {
        matches!(self, Declaration::Missed)
    }
}
