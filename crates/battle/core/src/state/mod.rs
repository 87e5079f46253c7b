//! Authoritative battle state representation.
//!
//! [`BattleState`] holds both sides' combatant snapshots and the turn counter.
//! The runtime broadcasts clones of it; mutation happens exclusively through
//! [`crate::engine::CombatEngine`] and [`crate::session::BattleSession`].
mod combatant;

use arrayvec::ArrayVec;

use crate::config::BattleRules;
use crate::error::RosterError;
use crate::ids::PlayerId;
use crate::session::Difficulty;

pub use combatant::{Combatant, CombatantSpec, DamageOutcome, StatKind, StatusEffect};

#[cfg(test)]
pub(crate) use combatant::fixtures;

/// Up to [`BattleRules::MAX_ROSTER`] combatants fielded by one participant.
pub type Roster = ArrayVec<Combatant, { BattleRules::MAX_ROSTER }>;

/// The two sides of a session. Home is the first participant bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub const fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

/// Addresses one combatant: side plus roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantRef {
    pub side: Side,
    pub index: u8,
}

impl CombatantRef {
    pub const fn new(side: Side, index: u8) -> Self {
        Self { side, index }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticipantKind {
    Human,
    Automated(Difficulty),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub identity: PlayerId,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn human(identity: PlayerId) -> Self {
        Self {
            identity,
            kind: ParticipantKind::Human,
        }
    }

    /// Synthesized opponent; its identity is derived from the difficulty.
    pub fn automated(difficulty: Difficulty) -> Self {
        Self {
            identity: PlayerId(format!("bot:{difficulty}")),
            kind: ParticipantKind::Automated(difficulty),
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self.kind, ParticipantKind::Automated(_))
    }
}

/// One participant and the combatants it fields.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideState {
    pub participant: Participant,
    pub roster: Roster,
    /// Consecutive turns without a declaration.
    pub missed_turns: u32,
}

impl SideState {
    pub fn new(participant: Participant, combatants: Vec<Combatant>) -> Result<Self, RosterError> {
        if combatants.is_empty() {
            return Err(RosterError::Empty);
        }
        if combatants.len() > BattleRules::MAX_ROSTER {
            return Err(RosterError::TooLarge {
                count: combatants.len(),
                max: BattleRules::MAX_ROSTER,
            });
        }

        Ok(Self {
            participant,
            roster: combatants.into_iter().collect(),
            missed_turns: 0,
        })
    }

    pub fn identity(&self) -> &PlayerId {
        &self.participant.identity
    }

    pub fn living(&self) -> impl Iterator<Item = (u8, &Combatant)> + '_ {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, c)| (i as u8, c))
    }

    pub fn is_wiped(&self) -> bool {
        self.roster.iter().all(|c| !c.is_alive())
    }

    /// Remaining hit points across the roster, in per-mille of the total maximum.
    pub fn hp_permille(&self) -> u32 {
        let hp: u64 = self.roster.iter().map(|c| u64::from(c.hp())).sum();
        let max: u64 = self.roster.iter().map(|c| u64::from(c.max_hp())).sum();
        ((hp * 1000) / max.max(1)) as u32
    }
}

/// Canonical snapshot of one match's combat state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// Current turn, starting at 1.
    pub turn: u32,
    sides: [SideState; 2],
}

impl BattleState {
    pub fn new(home: SideState, away: SideState) -> Self {
        Self {
            turn: 1,
            sides: [home, away],
        }
    }

    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        &mut self.sides[side.index()]
    }

    pub fn combatant(&self, at: CombatantRef) -> Option<&Combatant> {
        self.side(at.side).roster.get(usize::from(at.index))
    }

    pub fn combatant_mut(&mut self, at: CombatantRef) -> Option<&mut Combatant> {
        self.side_mut(at.side).roster.get_mut(usize::from(at.index))
    }

    pub fn is_alive(&self, at: CombatantRef) -> bool {
        self.combatant(at).is_some_and(Combatant::is_alive)
    }

    /// Side controlled by `identity`, if it participates.
    pub fn side_of(&self, identity: &PlayerId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.side(side).identity() == identity)
    }

    pub fn combatants_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.sides.iter_mut().flat_map(|s| s.roster.iter_mut())
    }

    /// SHA-256 over the bincode encoding of the state.
    ///
    /// Clients compare this against their locally rendered state to detect
    /// desynchronization.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        // bincode encoding of plain structs is infallible
        if let Ok(bytes) = bincode::serialize(self) {
            hasher.update(&bytes);
        }
        hasher.finalize().into()
    }
}
