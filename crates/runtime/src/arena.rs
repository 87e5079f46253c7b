//! High-level arena orchestrator.
//!
//! [`Arena`] wires content, collaborators and configuration into an
//! [`ArenaHandle`]. Session workers are spawned on demand by the handle; the
//! arena itself runs no background task.

use std::sync::Arc;

use battle_content::{CardCatalog, ContentFactory, TemplateCatalog};
use battle_core::{PlayerId, SessionId};

use crate::api::{
    ArenaConnection, ArenaError, ArenaHandle, AssetResolver, MatchRecorder, Result,
    StaticAssetResolver, TracingRecorder,
};
use crate::config::ArenaConfig;

/// Main entry point for embedding the arena.
pub struct Arena {
    handle: ArenaHandle,
}

impl Arena {
    /// Create a new arena builder
    pub fn builder() -> ArenaBuilder {
        ArenaBuilder::new()
    }

    /// Get a cloneable handle
    pub fn handle(&self) -> ArenaHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &ArenaConfig {
        self.handle.config()
    }

    pub async fn connect(&self, identity: PlayerId) -> ArenaConnection {
        self.handle.connect(identity).await
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.handle.active_sessions().await
    }
}

/// Builder for [`Arena`]
pub struct ArenaBuilder {
    config: ArenaConfig,
    resolver: Option<Arc<dyn AssetResolver>>,
    recorder: Option<Arc<dyn MatchRecorder>>,
    content: Option<ContentFactory>,
    catalogs: Option<(CardCatalog, TemplateCatalog)>,
}

impl ArenaBuilder {
    fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
            resolver: None,
            recorder: None,
            content: None,
            catalogs: None,
        }
    }

    /// Override arena configuration
    pub fn config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the asset resolver (default: an empty [`StaticAssetResolver`])
    pub fn resolver(mut self, resolver: impl AssetResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the match recorder (default: [`TracingRecorder`])
    pub fn recorder(mut self, recorder: impl MatchRecorder + 'static) -> Self {
        self.recorder = Some(Arc::new(recorder));
        self
    }

    pub fn shared_recorder(mut self, recorder: Arc<dyn MatchRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Load content through `factory` instead of `config.content_dir`.
    pub fn content(mut self, factory: ContentFactory) -> Self {
        self.content = Some(factory);
        self
    }

    /// Use already-loaded catalogs.
    pub fn catalogs(mut self, cards: CardCatalog, templates: TemplateCatalog) -> Self {
        self.catalogs = Some((cards, templates));
        self
    }

    /// Build the arena, loading content if no catalogs were provided
    pub fn build(self) -> Result<Arena> {
        let (cards, templates) = match self.catalogs {
            Some(catalogs) => catalogs,
            None => {
                let factory = self.content.unwrap_or_else(|| match &self.config.content_dir {
                    Some(dir) => ContentFactory::new(dir.clone()),
                    None => ContentFactory::builtin(),
                });
                let cards = factory
                    .load_cards()
                    .map_err(|e| ArenaError::Content(format!("{e:#}")))?;
                let templates = factory
                    .load_templates(&cards)
                    .map_err(|e| ArenaError::Content(format!("{e:#}")))?;
                (cards, templates)
            }
        };

        tracing::info!(
            target: "arena",
            cards = cards.len(),
            turn_timeout_ms = self.config.turn_timeout.as_millis() as u64,
            "arena ready"
        );

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(StaticAssetResolver::new()));
        let recorder = self.recorder.unwrap_or_else(|| Arc::new(TracingRecorder));

        Ok(Arena {
            handle: ArenaHandle::new(self.config, resolver, recorder, cards, templates),
        })
    }
}

impl Default for ArenaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
