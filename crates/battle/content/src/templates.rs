//! Automated-opponent templates and roster synthesis.
//!
//! Templates carry Normal-difficulty stats. [`TemplateCatalog::synthesize`]
//! draws a roster from them and scales hit points, attack and defense by the
//! difficulty's [`DifficultyProfile`].

use battle_core::{AssetId, BattleRules, CombatantSpec, Difficulty, Elements};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::CardCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentTemplate {
    pub id: String,
    pub name: String,
    pub elements: Elements,
    pub hp: u32,
    pub energy: u32,
    pub speed: u32,
    pub attack: u32,
    pub defense: u32,
    /// Card ids resolved against the [`CardCatalog`].
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    pub templates: Vec<OpponentTemplate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub roster_size: usize,
    /// Scale applied to hp, attack and defense, in percent.
    pub stat_percent: u32,
}

pub const fn difficulty_profile(difficulty: Difficulty) -> DifficultyProfile {
    match difficulty {
        Difficulty::Easy => DifficultyProfile {
            roster_size: 2,
            stat_percent: 85,
        },
        Difficulty::Normal => DifficultyProfile {
            roster_size: BattleRules::MAX_ROSTER,
            stat_percent: 100,
        },
        Difficulty::Hard => DifficultyProfile {
            roster_size: BattleRules::MAX_ROSTER,
            stat_percent: 120,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("no opponent templates available")]
    Empty,

    #[error("template {template} references unknown card {card}")]
    UnknownCard { template: String, card: String },
}

impl OpponentTemplate {
    /// Builds the combatant shape for one roster slot.
    pub fn to_spec(
        &self,
        slot: usize,
        profile: DifficultyProfile,
        catalog: &CardCatalog,
    ) -> Result<CombatantSpec, TemplateError> {
        let cards = self
            .cards
            .iter()
            .map(|id| {
                catalog
                    .get(id)
                    .cloned()
                    .ok_or_else(|| TemplateError::UnknownCard {
                        template: self.id.clone(),
                        card: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scale = |value: u32| -> u32 {
            let scaled = u64::from(value) * u64::from(profile.stat_percent) / 100;
            u32::try_from(scaled).unwrap_or(u32::MAX)
        };

        Ok(CombatantSpec {
            id: AssetId::new(format!("bot:{}:{slot}", self.id)),
            name: self.name.clone(),
            elements: self.elements.clone(),
            hp: scale(self.hp).max(1),
            energy: self.energy,
            speed: self.speed,
            attack: scale(self.attack),
            defense: scale(self.defense),
            cards,
        })
    }
}

impl TemplateCatalog {
    pub fn new(templates: Vec<OpponentTemplate>) -> Self {
        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&OpponentTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Draws distinct templates for an automated roster.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        catalog: &CardCatalog,
        rng: &mut R,
    ) -> Result<Vec<CombatantSpec>, TemplateError> {
        if self.templates.is_empty() {
            return Err(TemplateError::Empty);
        }
        let profile = difficulty_profile(difficulty);

        self.templates
            .choose_multiple(rng, profile.roster_size)
            .enumerate()
            .map(|(slot, template)| template.to_spec(slot, profile, catalog))
            .collect()
    }
}
