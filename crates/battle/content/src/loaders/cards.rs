//! Card catalog loader.

use std::path::Path;

use crate::catalog::CardCatalog;
use crate::loaders::{LoadResult, read_file};

const BUILTIN: &str = include_str!("../../data/cards.ron");

/// Loader for the card catalog from RON files.
pub struct CardLoader;

impl CardLoader {
    /// Load and validate a card catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<CardCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> LoadResult<CardCatalog> {
        Self::parse(BUILTIN)
    }

    pub fn parse(content: &str) -> LoadResult<CardCatalog> {
        let catalog: CardCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse card catalog RON: {}", e))?;
        catalog
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid card catalog: {}", e))?;
        Ok(catalog)
    }
}
