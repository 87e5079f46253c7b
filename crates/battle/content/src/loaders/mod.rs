//! File loaders for RON content.
//!
//! Built-in data ships inside the crate (`include_str!`); operators can point
//! [`ContentFactory`] at a directory to override it.

pub mod cards;
pub mod factory;
pub mod templates;

pub use cards::CardLoader;
pub use factory::ContentFactory;
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
