//! Combatant state: one fighting unit's mutable combat stats.
//!
//! Mutators only exist in invariant-preserving form: hit points and shield
//! saturate at zero, energy stays within `[0, max_energy]`, and every change
//! to a transient stat delta is mirrored by a status record.

use crate::card::Card;
use crate::elements::Elements;
use crate::error::RosterError;
use crate::ids::AssetId;

/// Canonical combatant shape produced by the roster boundary decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSpec {
    pub id: AssetId,
    pub name: String,
    pub elements: Elements,
    pub hp: u32,
    pub energy: u32,
    pub speed: u32,
    pub attack: u32,
    pub defense: u32,
    pub cards: Vec<Card>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
}

/// Runtime record of an active buff (positive) or debuff (negative).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub stat: StatKind,
    pub magnitude: i32,
    /// Turn-end decrements left before the record expires.
    pub remaining: u32,
}

/// Result of pushing damage through shield and hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage soaked by the shield.
    pub absorbed: u32,
    /// Damage left after the shield, before clamping to current hit points.
    pub passed_through: u32,
    /// Hit points actually lost.
    pub hp_loss: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    id: AssetId,
    name: String,
    elements: Elements,
    hp: u32,
    max_hp: u32,
    energy: u32,
    max_energy: u32,
    speed: u32,
    base_attack: u32,
    base_defense: u32,
    attack_delta: i32,
    defense_delta: i32,
    shield: u32,
    statuses: Vec<StatusEffect>,
    cards: Vec<Card>,
}

impl Combatant {
    /// Cards addressable by a `u8` action index.
    pub const MAX_CARDS: usize = u8::MAX as usize + 1;

    /// Snapshots a roster entry at match start, full hit points and energy.
    pub fn from_spec(spec: CombatantSpec) -> Result<Self, RosterError> {
        if spec.hp == 0 {
            return Err(RosterError::ZeroHitPoints(spec.id.0));
        }
        if spec.cards.is_empty() {
            return Err(RosterError::NoCards(spec.id.0));
        }
        if spec.cards.len() > Self::MAX_CARDS {
            return Err(RosterError::TooManyCards {
                count: spec.cards.len(),
                max: Self::MAX_CARDS,
            });
        }
        for card in &spec.cards {
            card.validate()?;
        }

        Ok(Self {
            id: spec.id,
            name: spec.name,
            elements: spec.elements,
            hp: spec.hp,
            max_hp: spec.hp,
            energy: spec.energy,
            max_energy: spec.energy,
            speed: spec.speed,
            base_attack: spec.attack,
            base_defense: spec.defense,
            attack_delta: 0,
            defense_delta: 0,
            shield: 0,
            statuses: Vec::new(),
            cards: spec.cards,
        })
    }

    /// Starts the combatant with a pre-charged shield.
    #[must_use]
    pub fn with_shield(mut self, shield: u32) -> Self {
        self.shield = shield;
        self
    }

    /// Starts the combatant below full hit points (clamped to `1..=max_hp`).
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.clamp(1, self.max_hp);
        self
    }

    /// Starts the combatant below full energy (clamped to `max_energy`).
    #[must_use]
    pub fn with_energy(mut self, energy: u32) -> Self {
        self.energy = energy.min(self.max_energy);
        self
    }

    // ===== read access =====

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn shield(&self) -> u32 {
        self.shield
    }

    pub fn attack_delta(&self) -> i32 {
        self.attack_delta
    }

    pub fn defense_delta(&self) -> i32 {
        self.defense_delta
    }

    /// Base attack plus the transient delta.
    pub fn attack(&self) -> i64 {
        i64::from(self.base_attack) + i64::from(self.attack_delta)
    }

    /// Base defense plus the transient delta.
    pub fn defense(&self) -> i64 {
        i64::from(self.base_defense) + i64::from(self.defense_delta)
    }

    pub fn statuses(&self) -> &[StatusEffect] {
        &self.statuses
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: u8) -> Option<&Card> {
        self.cards.get(usize::from(index))
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn can_afford(&self, card: &Card) -> bool {
        card.cost <= self.energy
    }

    /// Indices of the cards playable with the current energy.
    pub fn affordable_cards(&self) -> impl Iterator<Item = u8> + '_ {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.can_afford(card))
            .filter_map(|(index, _)| u8::try_from(index).ok())
    }

    /// Hit points as a fraction of maximum, in per-mille for integer comparisons.
    pub fn hp_permille(&self) -> u32 {
        ((u64::from(self.hp) * 1000) / u64::from(self.max_hp.max(1))) as u32
    }

    /// Sum of active status magnitudes for a stat.
    pub fn status_total(&self, stat: StatKind) -> i32 {
        self.statuses
            .iter()
            .filter(|s| s.stat == stat)
            .map(|s| s.magnitude)
            .sum()
    }

    // ===== invariant-preserving mutation =====

    /// Applies damage: shield first, the excess to hit points, clamped at zero.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;

        let passed_through = amount - absorbed;
        let hp_loss = passed_through.min(self.hp);
        self.hp -= hp_loss;

        DamageOutcome {
            absorbed,
            passed_through,
            hp_loss,
        }
    }

    /// Restores hit points up to the maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp - self.hp);
        self.hp += restored;
        restored
    }

    pub fn add_shield(&mut self, amount: u32) {
        self.shield = self.shield.saturating_add(amount);
    }

    /// Adds energy up to the maximum. Returns the amount gained.
    pub fn gain_energy(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_energy - self.energy);
        self.energy += gained;
        gained
    }

    /// Removes energy down to zero. Returns the amount lost.
    pub fn lose_energy(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.energy);
        self.energy -= lost;
        lost
    }

    /// Deducts a card cost. Leaves energy untouched and returns false if unaffordable.
    pub fn spend_energy(&mut self, cost: u32) -> bool {
        if cost > self.energy {
            return false;
        }
        self.energy -= cost;
        true
    }

    /// Shifts a transient stat delta and records the status that will undo it.
    pub fn add_status(&mut self, stat: StatKind, magnitude: i32, duration: u32) {
        *self.delta_mut(stat) += magnitude;
        self.statuses.push(StatusEffect {
            stat,
            magnitude,
            remaining: duration,
        });
    }

    /// Turn-end step: decrements every status and reverses the expired ones.
    ///
    /// Returns the records that expired, in the order they were applied.
    pub fn tick_statuses(&mut self) -> Vec<StatusEffect> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.statuses.len());

        for mut status in self.statuses.drain(..) {
            status.remaining = status.remaining.saturating_sub(1);
            if status.remaining == 0 {
                expired.push(status);
            } else {
                kept.push(status);
            }
        }
        self.statuses = kept;

        for status in &expired {
            *self.delta_mut(status.stat) -= status.magnitude;
        }
        expired
    }

    fn delta_mut(&mut self, stat: StatKind) -> &mut i32 {
        match stat {
            StatKind::Attack => &mut self.attack_delta,
            StatKind::Defense => &mut self.defense_delta,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::combatant;
    use super::*;
    use crate::elements::Element;

    #[test]
    fn shield_absorbs_before_hit_points() {
        let mut unit = combatant("Sprout", Element::Plant, 10, 10).with_shield(50);
        let outcome = unit.take_damage(130);
        assert_eq!(outcome.absorbed, 50);
        assert_eq!(outcome.passed_through, 80);
        assert_eq!(outcome.hp_loss, 80);
        assert_eq!(unit.shield(), 0);
        assert_eq!(unit.hp(), 120);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut unit = combatant("Sprout", Element::Plant, 10, 10).with_hp(30);
        let outcome = unit.take_damage(500);
        assert_eq!(outcome.hp_loss, 30);
        assert_eq!(unit.hp(), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut unit = combatant("Sprout", Element::Plant, 10, 10).with_hp(190);
        assert_eq!(unit.heal(50), 10);
        assert_eq!(unit.hp(), unit.max_hp());
    }

    #[test]
    fn energy_stays_in_range() {
        let mut unit = combatant("Ember", Element::Fire, 10, 10).with_energy(5);
        assert!(!unit.spend_energy(10));
        assert_eq!(unit.energy(), 5);
        assert_eq!(unit.lose_energy(20), 5);
        assert_eq!(unit.gain_energy(500), 100);
        assert_eq!(unit.energy(), 100);
    }

    #[test]
    fn statuses_reverse_exactly_once() {
        let mut unit = combatant("Ember", Element::Fire, 100, 70);
        unit.add_status(StatKind::Attack, 15, 2);
        unit.add_status(StatKind::Attack, -5, 1);
        assert_eq!(unit.attack(), 110);

        let expired = unit.tick_statuses();
        assert_eq!(expired.len(), 1);
        assert_eq!(unit.attack(), 115);
        assert_eq!(unit.attack_delta(), unit.status_total(StatKind::Attack));

        unit.tick_statuses();
        assert_eq!(unit.attack(), 100);
        assert!(unit.statuses().is_empty());

        // Nothing left to reverse.
        unit.tick_statuses();
        assert_eq!(unit.attack_delta(), 0);
    }

    #[test]
    fn roster_entries_need_cards_and_hit_points() {
        let mut spec = CombatantSpec {
            id: AssetId::new("blank"),
            name: "Blank".into(),
            elements: Elements::single(Element::Metal),
            hp: 0,
            energy: 10,
            speed: 1,
            attack: 1,
            defense: 1,
            cards: vec![fixtures::strike(5)],
        };
        assert_eq!(
            Combatant::from_spec(spec.clone()),
            Err(RosterError::ZeroHitPoints("blank".into()))
        );

        spec.hp = 10;
        spec.cards.clear();
        assert_eq!(
            Combatant::from_spec(spec),
            Err(RosterError::NoCards("blank".into()))
        );
    }

    #[test]
    fn card_list_must_fit_the_action_index() {
        let mut cards = vec![fixtures::strike(5); Combatant::MAX_CARDS];
        let mut spec = CombatantSpec {
            id: AssetId::new("hoarder"),
            name: "Hoarder".into(),
            elements: Elements::single(Element::Metal),
            hp: 10,
            energy: 100,
            speed: 1,
            attack: 1,
            defense: 1,
            cards: cards.clone(),
        };
        let full = Combatant::from_spec(spec.clone()).expect("256 cards fit");
        assert_eq!(full.affordable_cards().last(), Some(u8::MAX));

        cards.push(fixtures::strike(5));
        spec.cards = cards;
        assert_eq!(
            Combatant::from_spec(spec),
            Err(RosterError::TooManyCards {
                count: Combatant::MAX_CARDS + 1,
                max: 256
            })
        );
    }
}
