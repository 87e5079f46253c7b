//! Target resolution and single-effect application.

use crate::card::{CardEffect, EffectKind, TargetSelector};
use crate::elements::multiplier;
use crate::state::{BattleState, Combatant, CombatantRef, StatKind};

use super::CombatEngine;

/// Resolves a selector to living combatants before any mutation happens.
///
/// `User` is always the actor. Single-target selectors honor `explicit` when
/// it names a living combatant on the right side; otherwise an enemy selector
/// falls back to the lowest-index living enemy and an ally selector to the
/// living ally with the lowest hit-point ratio.
pub fn resolve_targets(
    state: &BattleState,
    actor: CombatantRef,
    selector: TargetSelector,
    explicit: Option<u8>,
) -> Vec<CombatantRef> {
    let own = actor.side;
    let enemy = actor.side.opponent();

    let living = |side| {
        state
            .side(side)
            .living()
            .map(move |(index, _)| CombatantRef::new(side, index))
    };
    let explicit_on = |side| {
        explicit
            .map(|index| CombatantRef::new(side, index))
            .filter(|&at| state.is_alive(at))
    };

    match selector {
        TargetSelector::User => {
            if state.is_alive(actor) {
                vec![actor]
            } else {
                Vec::new()
            }
        }
        TargetSelector::Enemy => explicit_on(enemy)
            .or_else(|| living(enemy).next())
            .into_iter()
            .collect(),
        TargetSelector::Ally => explicit_on(own)
            .or_else(|| {
                state
                    .side(own)
                    .living()
                    .min_by_key(|(index, c)| (c.hp_permille(), *index))
                    .map(|(index, _)| CombatantRef::new(own, index))
            })
            .into_iter()
            .collect(),
        TargetSelector::AllAllies => living(own).collect(),
        TargetSelector::AllEnemies => living(enemy).collect(),
    }
}

/// Damage one hit deals: `floor(max(1, base + attack - defense) * multiplier)`.
///
/// Returns the damage and the elemental multiplier used.
pub fn damage_against(attacker: &Combatant, defender: &Combatant, base: u32) -> (u32, f64) {
    let nominal = (i64::from(base) + attacker.attack() - defender.defense()).max(1);
    let scale = multiplier(attacker.elements(), defender.elements());
    let damage = (nominal as f64 * scale).floor();
    (damage.min(f64::from(u32::MAX)) as u32, scale)
}

impl CombatEngine<'_> {
    /// Applies one effect to pre-resolved targets and returns its log lines.
    ///
    /// Targets that fainted after resolution are skipped.
    pub fn apply_effect(
        &mut self,
        actor: CombatantRef,
        effect: &CardEffect,
        targets: &[CombatantRef],
    ) -> Vec<String> {
        let mut log = Vec::new();
        let Some(user) = self.state.combatant(actor).cloned() else {
            return log;
        };

        for &target in targets {
            if !self.state.is_alive(target) {
                continue;
            }
            match effect.kind {
                EffectKind::Damage => {
                    self.strike(&user, target, effect.magnitude, &mut log);
                }
                EffectKind::Drain => {
                    let dealt = self.strike(&user, target, effect.magnitude, &mut log);
                    let share = u64::from(dealt) * u64::from(self.rules.drain_heal_percent) / 100;
                    if let Some(user_mut) = self.state.combatant_mut(actor) {
                        let restored = user_mut.heal(share as u32);
                        log.push(format!("{} drains {} hp", user.name(), restored));
                    }
                }
                EffectKind::Heal => {
                    if let Some(unit) = self.state.combatant_mut(target) {
                        let restored = unit.heal(effect.magnitude);
                        log.push(format!(
                            "{} recovers {} hp ({}/{})",
                            unit.name(),
                            restored,
                            unit.hp(),
                            unit.max_hp()
                        ));
                    }
                }
                EffectKind::Shield => {
                    if let Some(unit) = self.state.combatant_mut(target) {
                        unit.add_shield(effect.magnitude);
                        log.push(format!(
                            "{} gains {} shield (now {})",
                            unit.name(),
                            effect.magnitude,
                            unit.shield()
                        ));
                    }
                }
                EffectKind::BuffAttack
                | EffectKind::BuffDefense
                | EffectKind::DebuffAttack
                | EffectKind::DebuffDefense => {
                    let (stat, sign, verb) = match effect.kind {
                        EffectKind::BuffAttack => (StatKind::Attack, 1, "rises"),
                        EffectKind::BuffDefense => (StatKind::Defense, 1, "rises"),
                        EffectKind::DebuffAttack => (StatKind::Attack, -1, "falls"),
                        _ => (StatKind::Defense, -1, "falls"),
                    };
                    let magnitude = i32::try_from(effect.magnitude).unwrap_or(i32::MAX) * sign;
                    if let Some(unit) = self.state.combatant_mut(target) {
                        unit.add_status(stat, magnitude, effect.duration);
                        log.push(format!(
                            "{}'s {} {} by {} for {} turns",
                            unit.name(),
                            stat,
                            verb,
                            effect.magnitude,
                            effect.duration
                        ));
                    }
                }
                EffectKind::BuffEnergy => {
                    if let Some(unit) = self.state.combatant_mut(target) {
                        let gained = unit.gain_energy(effect.magnitude);
                        log.push(format!("{} gains {} energy", unit.name(), gained));
                    }
                }
                EffectKind::DebuffEnergy => {
                    if let Some(unit) = self.state.combatant_mut(target) {
                        let lost = unit.lose_energy(effect.magnitude);
                        log.push(format!("{} loses {} energy", unit.name(), lost));
                    }
                }
            }
        }
        log
    }

    /// Deals one hit and returns the hit points actually removed.
    fn strike(
        &mut self,
        user: &Combatant,
        target: CombatantRef,
        base: u32,
        log: &mut Vec<String>,
    ) -> u32 {
        let Some(unit) = self.state.combatant_mut(target) else {
            return 0;
        };

        let (damage, scale) = damage_against(user, unit, base);
        let outcome = unit.take_damage(damage);

        let mut line = format!(
            "{} hits {} for {} damage (x{:.1})",
            user.name(),
            unit.name(),
            damage,
            scale
        );
        if outcome.absorbed > 0 {
            line.push_str(&format!(", {} absorbed by shield", outcome.absorbed));
        }
        log.push(line);

        if !unit.is_alive() {
            log.push(format!("{} fainted", unit.name()));
        }
        outcome.hp_loss
    }
}
