//! Data-driven battle content.
//!
//! - card catalog (`data/cards.ron`)
//! - automated-opponent templates (`data/opponents.ron`) and the roster
//!   synthesizer that scales them per difficulty
//! - the ledger record decoder: the one place where loosely shaped asset
//!   records become canonical [`battle_core::CombatantSpec`]s
//!
//! Content is consumed by the arena runtime and never appears in battle state.

pub mod catalog;
pub mod records;
pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::CardCatalog;
pub use records::{LedgerRecord, RecordError, decode_record, decode_records};
pub use templates::{
    DifficultyProfile, OpponentTemplate, TemplateCatalog, TemplateError, difficulty_profile,
};

#[cfg(feature = "loaders")]
pub use loaders::{CardLoader, ContentFactory, LoadResult, TemplateLoader};
