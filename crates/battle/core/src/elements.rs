//! Element tags and the type-effectiveness table.
//!
//! The table is directional: `Fire → Plant` is super effective (2.0) while
//! `Plant → Fire` is resisted (0.5). Multi-element combatants are scored by
//! their single best matchup, never an aggregate.

use arrayvec::ArrayVec;

use crate::config::BattleRules;
use crate::error::ElementError;

/// Multiplier for a super-effective matchup.
pub const SUPER_EFFECTIVE: f64 = 2.0;
/// Multiplier for a resisted matchup.
pub const RESISTED: f64 = 0.5;
/// Multiplier for pairs missing from the table.
pub const NEUTRAL: f64 = 1.0;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    Fire,
    Water,
    Plant,
    Electric,
    Earth,
    Wind,
    Ice,
    Metal,
    Light,
    Shadow,
    Spirit,
}

/// Directional multiplier for one (attacker, defender) element pair.
pub fn effectiveness(attacker: Element, defender: Element) -> f64 {
    use Element::*;

    match (attacker, defender) {
        (Fire, Plant | Ice | Metal) => SUPER_EFFECTIVE,
        (Fire, Fire | Water | Earth) => RESISTED,

        (Water, Fire | Earth) => SUPER_EFFECTIVE,
        (Water, Water | Plant | Ice) => RESISTED,

        (Plant, Water | Earth) => SUPER_EFFECTIVE,
        (Plant, Fire | Plant | Wind | Metal) => RESISTED,

        (Electric, Water | Wind) => SUPER_EFFECTIVE,
        (Electric, Electric | Earth | Plant) => RESISTED,

        (Earth, Fire | Electric | Metal) => SUPER_EFFECTIVE,
        (Earth, Plant | Wind) => RESISTED,

        (Wind, Plant) => SUPER_EFFECTIVE,
        (Wind, Electric | Ice | Metal) => RESISTED,

        (Ice, Plant | Wind | Earth) => SUPER_EFFECTIVE,
        (Ice, Fire | Water | Ice | Metal) => RESISTED,

        (Metal, Ice | Light) => SUPER_EFFECTIVE,
        (Metal, Fire | Water | Electric | Metal) => RESISTED,

        (Light, Shadow) => SUPER_EFFECTIVE,
        (Light, Light | Metal) => RESISTED,

        (Shadow, Spirit) => SUPER_EFFECTIVE,
        (Shadow, Shadow | Light) => RESISTED,

        (Spirit, Light) => SUPER_EFFECTIVE,
        (Spirit, Shadow) => RESISTED,

        _ => NEUTRAL,
    }
}

/// One or two element tags carried by a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Element>", into = "Vec<Element>")
)]
pub struct Elements(ArrayVec<Element, { BattleRules::MAX_ELEMENTS }>);

impl Elements {
    /// Builds a validated tag set: one or two distinct elements.
    pub fn new(tags: &[Element]) -> Result<Self, ElementError> {
        if tags.is_empty() {
            return Err(ElementError::Empty);
        }
        if tags.len() > BattleRules::MAX_ELEMENTS {
            return Err(ElementError::TooMany {
                count: tags.len(),
                max: BattleRules::MAX_ELEMENTS,
            });
        }

        let mut set = ArrayVec::new();
        for &tag in tags {
            if set.contains(&tag) {
                return Err(ElementError::Duplicate(tag));
            }
            set.push(tag);
        }
        Ok(Self(set))
    }

    pub fn single(element: Element) -> Self {
        let mut set = ArrayVec::new();
        set.push(element);
        Self(set)
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0.contains(&element)
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.0
    }
}

impl TryFrom<Vec<Element>> for Elements {
    type Error = ElementError;

    fn try_from(tags: Vec<Element>) -> Result<Self, Self::Error> {
        Self::new(&tags)
    }
}

impl From<Elements> for Vec<Element> {
    fn from(elements: Elements) -> Self {
        elements.0.to_vec()
    }
}

/// Effective multiplier between two tag sets: the maximum over every pair.
pub fn multiplier(attacker: &Elements, defender: &Elements) -> f64 {
    attacker
        .iter()
        .flat_map(|a| defender.iter().map(move |d| effectiveness(a, d)))
        .fold(None, |best: Option<f64>, m| {
            Some(best.map_or(m, |b| b.max(m)))
        })
        .unwrap_or(NEUTRAL)
}
