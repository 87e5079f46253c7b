//! Ledger asset records → canonical combatants.
//!
//! Ledger indexers disagree on field names and casing (`hp`, `HP`, `health`),
//! on whether elements are a string or a list, and on whether numbers are
//! numbers or strings. This module absorbs all of that in one step; nothing
//! downstream ever sees a raw record.

use std::str::FromStr;

use battle_core::{AssetId, CombatantSpec, Element, ElementError, Elements};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::CardCatalog;

/// Energy pool used when a record does not carry one.
pub const DEFAULT_ENERGY: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed asset record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("asset {asset}: unknown element {value:?}")]
    UnknownElement { asset: String, value: String },

    #[error("asset {asset}: {source}")]
    Elements {
        asset: String,
        #[source]
        source: ElementError,
    },

    #[error("asset {asset}: field {field} is not a non-negative integer ({value})")]
    InvalidStat {
        asset: String,
        field: &'static str,
        value: String,
    },

    #[error("asset {asset}: unknown card {card}")]
    UnknownCard { asset: String, card: String },
}

/// Raw asset record as returned by a ledger indexer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerRecord {
    #[serde(alias = "ID", alias = "tokenId", alias = "token_id", alias = "objectId")]
    pub id: String,
    #[serde(default, alias = "Name", alias = "nickname", alias = "title")]
    pub name: Option<String>,
    #[serde(
        alias = "element",
        alias = "Element",
        alias = "Elements",
        alias = "type",
        alias = "types"
    )]
    pub elements: ElementField,
    #[serde(
        alias = "HP",
        alias = "Hp",
        alias = "health",
        alias = "hit_points",
        alias = "maxHp",
        alias = "max_hp"
    )]
    pub hp: StatField,
    #[serde(default, alias = "Energy", alias = "mana", alias = "maxEnergy")]
    pub energy: Option<StatField>,
    #[serde(alias = "Speed", alias = "SPD", alias = "spd")]
    pub speed: StatField,
    #[serde(alias = "Attack", alias = "ATK", alias = "atk")]
    pub attack: StatField,
    #[serde(alias = "Defense", alias = "DEF", alias = "def")]
    pub defense: StatField,
    #[serde(alias = "Cards", alias = "moves", alias = "abilities", alias = "deck")]
    pub cards: Vec<String>,
}

/// `"fire"`, `"Fire/Plant"`, `"fire, plant"` or `["FIRE", "plant"]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ElementField {
    List(Vec<String>),
    Text(String),
}

/// Integer or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatField {
    Number(u64),
    Text(String),
}

impl ElementField {
    fn tags(&self) -> Vec<&str> {
        match self {
            ElementField::List(items) => items.iter().map(|s| s.trim()).collect(),
            ElementField::Text(text) => text
                .split(['/', ',', '|'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl StatField {
    fn value(&self, asset: &str, field: &'static str) -> Result<u32, RecordError> {
        let invalid = |value: String| RecordError::InvalidStat {
            asset: asset.to_string(),
            field,
            value,
        };
        match self {
            StatField::Number(n) => u32::try_from(*n).map_err(|_| invalid(n.to_string())),
            StatField::Text(text) => text.trim().parse().map_err(|_| invalid(text.clone())),
        }
    }
}

impl LedgerRecord {
    /// Normalizes the record, resolving card ids against `catalog`.
    pub fn into_spec(self, catalog: &CardCatalog) -> Result<CombatantSpec, RecordError> {
        let asset = self.id.as_str();

        let tags = self
            .elements
            .tags()
            .into_iter()
            .map(|tag| {
                Element::from_str(tag).map_err(|_| RecordError::UnknownElement {
                    asset: asset.to_string(),
                    value: tag.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let elements = Elements::new(&tags).map_err(|source| RecordError::Elements {
            asset: asset.to_string(),
            source,
        })?;

        let cards = self
            .cards
            .iter()
            .map(|id| {
                catalog
                    .get(id.trim())
                    .cloned()
                    .ok_or_else(|| RecordError::UnknownCard {
                        asset: asset.to_string(),
                        card: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let energy = match &self.energy {
            Some(stat) => stat.value(asset, "energy")?,
            None => DEFAULT_ENERGY,
        };

        Ok(CombatantSpec {
            id: AssetId::new(asset),
            name: self.name.clone().unwrap_or_else(|| asset.to_string()),
            elements,
            hp: self.hp.value(asset, "hp")?,
            energy,
            speed: self.speed.value(asset, "speed")?,
            attack: self.attack.value(asset, "attack")?,
            defense: self.defense.value(asset, "defense")?,
            cards,
        })
    }
}

/// Decodes one record, unwrapping the `fields` envelope some indexers add.
pub fn decode_record(value: Value) -> Result<LedgerRecord, RecordError> {
    let value = match value {
        Value::Object(mut map) if map.get("fields").is_some_and(Value::is_object) => {
            map.remove("fields").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

/// Decodes a JSON array of records.
pub fn decode_records(json: &str) -> Result<Vec<LedgerRecord>, RecordError> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    values.into_iter().map(decode_record).collect()
}
