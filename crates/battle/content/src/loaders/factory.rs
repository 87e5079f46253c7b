//! Content factory for loading arena content from a data directory.

use std::path::{Path, PathBuf};

use crate::catalog::CardCatalog;
use crate::loaders::{CardLoader, LoadResult, TemplateLoader};
use crate::templates::TemplateCatalog;

/// Loads arena content from a data directory, falling back to the bundled
/// data for files that are absent.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── cards.ron
/// └── opponents.ron
/// ```
pub struct ContentFactory {
    data_dir: Option<PathBuf>,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
        }
    }

    /// Bundled content only.
    pub fn builtin() -> Self {
        Self { data_dir: None }
    }

    pub fn load_cards(&self) -> LoadResult<CardCatalog> {
        match self.existing("cards.ron") {
            Some(path) => CardLoader::load(&path),
            None => CardLoader::builtin(),
        }
    }

    pub fn load_templates(&self, cards: &CardCatalog) -> LoadResult<TemplateCatalog> {
        match self.existing("opponents.ron") {
            Some(path) => TemplateLoader::load(&path, cards),
            None => TemplateLoader::builtin(cards),
        }
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    fn existing(&self, file: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(file))
            .filter(|path| path.is_file())
    }
}
