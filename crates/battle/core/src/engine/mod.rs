//! Combat engine: the only code path that mutates combatants mid-match.
//!
//! [`CombatEngine`] borrows a [`BattleState`] and the match [`BattleRules`]
//! and exposes three layers:
//! - [`effects`] resolves targets and applies a single card effect
//! - [`turn`] orders a turn's actions and runs them one at a time
//! - end-of-turn bookkeeping (status timers, energy regeneration)
//!
//! Every mutation appends human-readable log lines that the runtime forwards
//! to clients unchanged.
mod effects;
mod turn;

use crate::config::BattleRules;
use crate::state::BattleState;

pub use crate::state::DamageOutcome;
pub use effects::{damage_against, resolve_targets};
pub use turn::execution_order;

/// Applies card plays and turn bookkeeping to a borrowed battle state.
pub struct CombatEngine<'a> {
    state: &'a mut BattleState,
    rules: &'a BattleRules,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut BattleState, rules: &'a BattleRules) -> Self {
        Self { state, rules }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }
}
