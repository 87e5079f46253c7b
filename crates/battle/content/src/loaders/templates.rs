//! Opponent template loader.

use std::path::Path;

use crate::catalog::CardCatalog;
use crate::loaders::{LoadResult, read_file};
use crate::templates::TemplateCatalog;

const BUILTIN: &str = include_str!("../../data/opponents.ron");

/// Loader for automated-opponent templates from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load templates and check every card reference against `cards`.
    pub fn load(path: &Path, cards: &CardCatalog) -> LoadResult<TemplateCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, cards)
    }

    pub fn builtin(cards: &CardCatalog) -> LoadResult<TemplateCatalog> {
        Self::parse(BUILTIN, cards)
    }

    pub fn parse(content: &str, cards: &CardCatalog) -> LoadResult<TemplateCatalog> {
        let catalog: TemplateCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse opponent templates RON: {}", e))?;

        for template in &catalog.templates {
            if template.cards.is_empty() {
                anyhow::bail!("Template '{}' has no cards", template.id);
            }
            if let Some(missing) = template.cards.iter().find(|id| !cards.contains(id)) {
                anyhow::bail!(
                    "Template '{}' references unknown card '{}'",
                    template.id,
                    missing
                );
            }
        }
        Ok(catalog)
    }
}
