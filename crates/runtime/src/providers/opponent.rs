//! Automated opponent policy.
//!
//! Each living combatant on the automated side picks one affordable card per
//! turn. Difficulty decides how much the policy looks at:
//! - Easy plays a random affordable card and lets targeting fall back
//! - Normal scores cards against the default target
//! - Hard scores every (card, target) pair and prefers finishing blows
//!
//! Scores are plain integers; higher is better. Ties keep the lowest card index.

use battle_core::{
    BattleAction, BattleState, Card, CardEffect, Combatant, CombatantRef, Difficulty, EffectKind,
    SessionId, Side, TargetSelector, engine::damage_against,
};
use rand::Rng;
use rand::seq::SliceRandom;

/// Bonus for a hit that would knock the target out.
const LETHAL_BONUS: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct OpponentPolicy {
    difficulty: Difficulty,
}

impl OpponentPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// One action per living combatant on `side` that can afford a card.
    pub fn declare<R: Rng + ?Sized>(
        &self,
        state: &BattleState,
        side: Side,
        session: SessionId,
        rng: &mut R,
    ) -> Vec<BattleAction> {
        state
            .side(side)
            .living()
            .filter_map(|(index, unit)| {
                let actor = CombatantRef::new(side, index);
                self.choose(state, actor, unit, &mut *rng)
                    .map(|(card, target)| {
                        let action = BattleAction::new(session, index, card);
                        match target {
                            Some(target) => action.targeting(target),
                            None => action,
                        }
                    })
            })
            .collect()
    }

    fn choose<R: Rng + ?Sized>(
        &self,
        state: &BattleState,
        actor: CombatantRef,
        unit: &Combatant,
        rng: &mut R,
    ) -> Option<(u8, Option<u8>)> {
        let affordable: Vec<u8> = unit.affordable_cards().collect();

        match self.difficulty {
            Difficulty::Easy => affordable.choose(rng).map(|&card| (card, None)),
            Difficulty::Normal => affordable
                .iter()
                .filter_map(|&index| unit.card(index).map(|card| (index, card)))
                .map(|(index, card)| (score_card(state, actor, unit, card, None), index))
                .max_by_key(|&(score, index)| (score, std::cmp::Reverse(index)))
                .map(|(_, index)| (index, None)),
            Difficulty::Hard => {
                let enemies: Vec<u8> = state
                    .side(actor.side.opponent())
                    .living()
                    .map(|(index, _)| index)
                    .collect();
                affordable
                    .iter()
                    .filter_map(|&index| unit.card(index).map(|card| (index, card)))
                    .flat_map(|(index, card)| {
                        let targets: Vec<Option<u8>> = if wants_enemy_target(card) {
                            enemies.iter().copied().map(Some).collect()
                        } else {
                            vec![None]
                        };
                        targets.into_iter().map(move |target| (index, card, target))
                    })
                    .map(|(index, card, target)| {
                        let score = score_card(state, actor, unit, card, target);
                        (score, index, target)
                    })
                    .max_by_key(|&(score, index, target)| {
                        (score, std::cmp::Reverse(index), std::cmp::Reverse(target))
                    })
                    .map(|(_, index, target)| (index, target))
            }
        }
    }
}

fn wants_enemy_target(card: &Card) -> bool {
    card.effects
        .iter()
        .any(|effect| effect.target == TargetSelector::Enemy)
}

/// Expected value of playing `card` now.
fn score_card(
    state: &BattleState,
    actor: CombatantRef,
    unit: &Combatant,
    card: &Card,
    explicit: Option<u8>,
) -> u32 {
    card.effects
        .iter()
        .map(|effect| score_effect(state, actor, unit, effect, explicit))
        .sum()
}

fn score_effect(
    state: &BattleState,
    actor: CombatantRef,
    unit: &Combatant,
    effect: &CardEffect,
    explicit: Option<u8>,
) -> u32 {
    let targets = battle_core::engine::resolve_targets(state, actor, effect.target, explicit);
    let victims = targets.iter().filter_map(|&at| state.combatant(at));

    match effect.kind {
        EffectKind::Damage | EffectKind::Drain => victims
            .map(|target| {
                let (damage, _) = damage_against(unit, target, effect.magnitude);
                let landed = damage.saturating_sub(target.shield()).min(target.hp());
                if explicit.is_some() && landed >= target.hp() {
                    landed + LETHAL_BONUS
                } else {
                    landed
                }
            })
            .sum(),
        EffectKind::Heal => victims
            .map(|target| effect.magnitude.min(target.max_hp() - target.hp()))
            .sum(),
        EffectKind::Shield => victims.count() as u32 * effect.magnitude / 2,
        EffectKind::BuffAttack
        | EffectKind::BuffDefense
        | EffectKind::DebuffAttack
        | EffectKind::DebuffDefense => victims.count() as u32 * effect.magnitude * effect.duration,
        EffectKind::BuffEnergy | EffectKind::DebuffEnergy => {
            victims.count() as u32 * effect.magnitude / 4
        }
    }
}
