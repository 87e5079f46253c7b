//! Immutable card definitions.

use crate::elements::Element;
use crate::error::CardError;
use crate::ids::CardId;

/// Catalog entry a combatant can play for an energy cost.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub element: Element,
    pub cost: u32,
    pub effects: Vec<CardEffect>,
}

/// One typed outcome of playing a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardEffect {
    pub kind: EffectKind,
    pub magnitude: u32,
    pub target: TargetSelector,
    /// Turns a stat buff/debuff stays active. Ignored by untimed kinds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectKind {
    Damage,
    Heal,
    Shield,
    BuffAttack,
    BuffDefense,
    DebuffAttack,
    DebuffDefense,
    BuffEnergy,
    DebuffEnergy,
    /// Damage, then heal the user by a share of the hit-point damage dealt.
    Drain,
}

impl EffectKind {
    /// Whether the effect leaves a status record that expires after `duration` turns.
    pub const fn is_timed(&self) -> bool {
        matches!(
            self,
            Self::BuffAttack | Self::BuffDefense | Self::DebuffAttack | Self::DebuffDefense
        )
    }

    pub const fn is_offensive(&self) -> bool {
        matches!(self, Self::Damage | Self::Drain)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetSelector {
    /// The acting combatant, whoever it is attacking.
    #[cfg_attr(feature = "serde", serde(rename = "Self"))]
    User,
    Ally,
    Enemy,
    AllAllies,
    AllEnemies,
}

impl CardEffect {
    pub const fn new(kind: EffectKind, magnitude: u32, target: TargetSelector) -> Self {
        Self {
            kind,
            magnitude,
            target,
            duration: 0,
        }
    }

    pub const fn timed(
        kind: EffectKind,
        magnitude: u32,
        target: TargetSelector,
        duration: u32,
    ) -> Self {
        Self {
            kind,
            magnitude,
            target,
            duration,
        }
    }
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        element: Element,
        cost: u32,
        effects: Vec<CardEffect>,
    ) -> Self {
        Self {
            id: CardId::new(id),
            name: name.into(),
            element,
            cost,
            effects,
        }
    }

    /// Rejects cards the engine could not apply faithfully.
    pub fn validate(&self) -> Result<(), CardError> {
        if self.effects.is_empty() {
            return Err(CardError::NoEffects(self.id.clone()));
        }
        for (index, effect) in self.effects.iter().enumerate() {
            if effect.kind.is_timed() && effect.duration == 0 {
                return Err(CardError::ZeroDuration {
                    card: self.id.clone(),
                    index,
                });
            }
        }
        // One explicit target index cannot address both sides.
        let aims_at = |selector| self.effects.iter().any(|e| e.target == selector);
        if aims_at(TargetSelector::Enemy) && aims_at(TargetSelector::Ally) {
            return Err(CardError::MixedSingleTargets(self.id.clone()));
        }
        Ok(())
    }

    /// Sum of the nominal damage magnitudes, used to rank offensive cards.
    pub fn offensive_power(&self) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.kind.is_offensive())
            .map(|e| e.magnitude)
            .sum()
    }
}
