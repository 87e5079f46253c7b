//! Deterministic combat rules for the card battle arena.
//!
//! `battle-core` defines the canonical rules (elements, combatants, cards, the
//! effect engine, turn resolution, the session state machine and the
//! matchmaking queue) as pure APIs without I/O. All combat mutation flows
//! through [`engine::CombatEngine`]; the async authority in `arena-runtime`
//! owns sessions and drives them turn by turn.
pub mod action;
pub mod card;
pub mod config;
pub mod elements;
pub mod engine;
pub mod error;
pub mod ids;
pub mod matchmaking;
pub mod session;
pub mod state;

pub use action::{BattleAction, Declaration};
pub use card::{Card, CardEffect, EffectKind, TargetSelector};
pub use config::BattleRules;
pub use elements::{Element, Elements, effectiveness, multiplier};
pub use engine::{CombatEngine, DamageOutcome, execution_order};
pub use error::{CardError, ElementError, QueueError, RosterError, SessionError, ValidationError};
pub use ids::{AssetId, CardId, PlayerId, PrivateCode, SessionId};
pub use matchmaking::{JoinOutcome, MatchQueue, QueueEntry};
pub use session::{
    BattleSession, ConclusionReason, Difficulty, MatchMode, Outcome, SessionPhase, StakeTier,
    TurnReport,
};
pub use state::{
    BattleState, Combatant, CombatantRef, CombatantSpec, Participant, ParticipantKind, Roster,
    Side, SideState, StatKind, StatusEffect,
};
