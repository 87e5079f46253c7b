//! Turn execution: ordering, per-action validation and end-of-turn bookkeeping.

use core::cmp::Reverse;

use crate::action::BattleAction;
use crate::state::{BattleState, CombatantRef, Side, StatKind};

use super::CombatEngine;
use super::effects::resolve_targets;

/// Orders both sides' actions into a single execution sequence.
///
/// Descending speed; ties go to the home side, then to the lower roster index.
/// The sort is stable, so the result depends only on the inputs.
pub fn execution_order(
    state: &BattleState,
    home: &[BattleAction],
    away: &[BattleAction],
) -> Vec<(Side, BattleAction)> {
    let mut order: Vec<(Side, BattleAction)> = home
        .iter()
        .map(|a| (Side::Home, *a))
        .chain(away.iter().map(|a| (Side::Away, *a)))
        .collect();

    order.sort_by_key(|(side, action)| {
        let speed = state
            .combatant(CombatantRef::new(*side, action.combatant))
            .map_or(0, |c| c.speed());
        (Reverse(speed), *side, action.combatant)
    });
    order
}

impl CombatEngine<'_> {
    /// Runs one full turn: every action in speed order, then turn-end upkeep.
    ///
    /// Mutations from earlier actions are visible to later ones.
    pub fn run_turn(&mut self, home: &[BattleAction], away: &[BattleAction]) -> Vec<String> {
        let mut log = Vec::new();
        for (side, action) in execution_order(self.state, home, away) {
            log.extend(self.execute_action(side, &action));
        }
        log.extend(self.end_turn());
        log
    }

    /// Executes one declared action with live validation.
    ///
    /// A fainted actor or an unaffordable card is skipped with a log line.
    /// Energy is deducted before any effect runs, and every effect's targets are
    /// resolved before the first effect mutates state.
    pub fn execute_action(&mut self, side: Side, action: &BattleAction) -> Vec<String> {
        let at = CombatantRef::new(side, action.combatant);
        let Some(actor) = self.state.combatant(at) else {
            return vec![format!("{side} has no combatant at index {}", action.combatant)];
        };
        if !actor.is_alive() {
            return vec![format!("{} has fainted and cannot act", actor.name())];
        }
        let Some(card) = actor.card(action.card).cloned() else {
            return vec![format!("{} has no card at index {}", actor.name(), action.card)];
        };
        let name = actor.name().to_string();

        let paid = self
            .state
            .combatant_mut(at)
            .is_some_and(|actor| actor.spend_energy(card.cost));
        if !paid {
            return vec![format!(
                "{name} lacks the energy for {} ({} needed)",
                card.name, card.cost
            )];
        }

        let mut log = vec![format!("{name} plays {}", card.name)];

        let resolved: Vec<Vec<CombatantRef>> = card
            .effects
            .iter()
            .map(|effect| resolve_targets(self.state, at, effect.target, action.target))
            .collect();

        for (effect, targets) in card.effects.iter().zip(&resolved) {
            if targets.is_empty() {
                continue;
            }
            log.extend(self.apply_effect(at, effect, targets));
        }
        log
    }

    /// Turn-end upkeep: status timers first, then energy regeneration.
    pub fn end_turn(&mut self) -> Vec<String> {
        let mut log = Vec::new();
        let regen = self.rules.energy_regen_per_turn;

        for unit in self.state.combatants_mut() {
            for expired in unit.tick_statuses() {
                let kind = match (expired.stat, expired.magnitude >= 0) {
                    (StatKind::Attack, true) => "attack buff",
                    (StatKind::Attack, false) => "attack debuff",
                    (StatKind::Defense, true) => "defense buff",
                    (StatKind::Defense, false) => "defense debuff",
                };
                log.push(format!("{}'s {kind} wore off", unit.name()));
            }
            if unit.is_alive() {
                unit.gain_energy(regen);
            }
        }
        log
    }
}
