//! Card catalog lookup.

use std::collections::BTreeMap;

use battle_core::{Card, CardError, CardId};
use serde::{Deserialize, Serialize};

/// Every card a combatant may carry, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogFile", into = "CatalogFile")]
pub struct CardCatalog {
    cards: BTreeMap<CardId, Card>,
}

/// On-disk shape: a flat list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "CardCatalog")]
struct CatalogFile {
    cards: Vec<Card>,
}

impl From<CatalogFile> for CardCatalog {
    fn from(file: CatalogFile) -> Self {
        Self::new(file.cards)
    }
}

impl From<CardCatalog> for CatalogFile {
    fn from(catalog: CardCatalog) -> Self {
        Self {
            cards: catalog.cards.into_values().collect(),
        }
    }
}

impl CardCatalog {
    /// Later duplicates replace earlier ones.
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(&CardId::new(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Checks every card the way roster construction will.
    pub fn validate(&self) -> Result<(), CardError> {
        self.cards.values().try_for_each(Card::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{CardEffect, EffectKind, Element, TargetSelector};

    fn card(id: &str, cost: u32) -> Card {
        Card::new(
            id,
            id,
            Element::Wind,
            cost,
            vec![CardEffect::new(EffectKind::Damage, 10, TargetSelector::Enemy)],
        )
    }

    #[test]
    fn lookup_by_id() {
        let catalog = CardCatalog::new([card("gust", 10), card("squall", 30)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("squall").map(|c| c.cost), Some(30));
        assert!(!catalog.contains("breeze"));
    }

    #[test]
    fn validation_reports_broken_cards() {
        let broken = Card::new("empty", "Empty", Element::Wind, 0, Vec::new());
        let catalog = CardCatalog::new([card("gust", 10), broken]);
        assert_eq!(
            catalog.validate(),
            Err(CardError::NoEffects(CardId::new("empty")))
        );
    }
}
