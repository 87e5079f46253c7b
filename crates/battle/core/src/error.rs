//! Error types for battle-core.
//!
//! Validation failures are rejected before any state is touched; the combat
//! invariants (hit points never negative, energy within range) are enforced by
//! construction in the engine and have no error variant.

use crate::elements::Element;
use crate::ids::{CardId, PlayerId, SessionId};
use crate::session::SessionPhase;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ElementError {
    #[error("a combatant needs at least one element")]
    Empty,

    #[error("{count} elements given, at most {max} allowed")]
    TooMany { count: usize, max: usize },

    #[error("element {0} listed twice")]
    Duplicate(Element),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("card {0} has no effects")]
    NoEffects(CardId),

    #[error("card {card} effect #{index} is timed but has zero duration")]
    ZeroDuration { card: CardId, index: usize },

    #[error("card {0} mixes enemy and ally single-target effects")]
    MixedSingleTargets(CardId),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("roster is empty")]
    Empty,

    #[error("roster has {count} combatants, at most {max} allowed")]
    TooLarge { count: usize, max: usize },

    #[error("combatant {0} has no cards")]
    NoCards(String),

    #[error("combatant has {count} cards, at most {max} allowed")]
    TooManyCards { count: usize, max: usize },

    #[error("combatant {0} has zero max hit points")]
    ZeroHitPoints(String),

    #[error(transparent)]
    Card(#[from] CardError),
}

/// Reasons a declared action is rejected at submission time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("action targets {provided} but belongs to {expected}")]
    WrongSession {
        expected: SessionId,
        provided: SessionId,
    },

    #[error("{0} is not a participant of this session")]
    UnknownParticipant(PlayerId),

    #[error("no combatant at roster index {0}")]
    UnknownCombatant(u8),

    #[error("combatant {0} has fainted")]
    CombatantFainted(u8),

    #[error("combatant {combatant} has no card at index {card}")]
    UnknownCard { combatant: u8, card: u8 },

    #[error("card {card} costs {cost} energy but only {available} is available")]
    Unaffordable {
        card: CardId,
        cost: u32,
        available: u32,
    },

    #[error("combatant {0} declared more than one action")]
    DuplicateCombatant(u8),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {operation} while session is {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        operation: &'static str,
    },

    #[error("session {0} has concluded")]
    Concluded(SessionId),

    #[error("a participant cannot be matched against themselves")]
    SelfMatch,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("{0} already has a queued entry")]
    AlreadyQueued(PlayerId),

    #[error("private code {0} is already in use")]
    CodeInUse(String),

    #[error("no private session with code {0}")]
    UnknownCode(String),

    #[error("a participant cannot join their own private session")]
    SelfMatch,
}
