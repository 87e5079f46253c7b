//! Collaborators the arena reaches through traits.
//!
//! Asset ownership lives on a ledger and match history lives in whatever store
//! the deployment uses; the arena only needs a way to turn asset ids into
//! combatants and a place to hand finished matches to.
use std::collections::HashMap;

use async_trait::async_trait;
use battle_content::{CardCatalog, LedgerRecord};
use battle_core::{
    AssetId, Combatant, CombatantSpec, ConclusionReason, MatchMode, PlayerId, SessionId, StakeTier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ArenaError, Result};

/// Resolves opaque asset ids into canonical combatants.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Snapshot `assets` for `owner` at match start, in the given order.
    async fn resolve(&self, owner: &PlayerId, assets: &[AssetId]) -> Result<Vec<Combatant>>;
}

/// Receives the summary of every concluded match exactly once.
#[async_trait]
pub trait MatchRecorder: Send + Sync {
    async fn record(&self, summary: &MatchSummary) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub session: SessionId,
    pub mode: MatchMode,
    pub stake: StakeTier,
    pub home: PlayerId,
    pub away: PlayerId,
    /// `None` for a draw.
    pub winner: Option<PlayerId>,
    pub reason: ConclusionReason,
    pub turns: u32,
    pub concluded_at: DateTime<Utc>,
}

/// In-memory resolver over pre-decoded asset specs.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetResolver {
    specs: HashMap<AssetId, CombatantSpec>,
}

impl StaticAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes ledger records against `cards`.
    pub fn from_records(
        records: impl IntoIterator<Item = LedgerRecord>,
        cards: &CardCatalog,
    ) -> Result<Self> {
        let mut resolver = Self::new();
        for record in records {
            let spec = record
                .into_spec(cards)
                .map_err(|e| ArenaError::Resolver(e.to_string()))?;
            resolver.insert(spec);
        }
        Ok(resolver)
    }

    pub fn insert(&mut self, spec: CombatantSpec) {
        self.specs.insert(spec.id.clone(), spec);
    }

    #[must_use]
    pub fn with(mut self, spec: CombatantSpec) -> Self {
        self.insert(spec);
        self
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[async_trait]
impl AssetResolver for StaticAssetResolver {
    async fn resolve(&self, _owner: &PlayerId, assets: &[AssetId]) -> Result<Vec<Combatant>> {
        assets
            .iter()
            .map(|id| {
                let spec = self
                    .specs
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ArenaError::Resolver(format!("unknown asset {id}")))?;
                Ok(Combatant::from_spec(spec)?)
            })
            .collect()
    }
}

/// Default recorder: logs the summary and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

#[async_trait]
impl MatchRecorder for TracingRecorder {
    async fn record(&self, summary: &MatchSummary) -> Result<()> {
        tracing::info!(
            target: "arena::recorder",
            session = %summary.session,
            home = %summary.home,
            away = %summary.away,
            winner = summary.winner.as_ref().map(PlayerId::as_str).unwrap_or("draw"),
            reason = %summary.reason,
            turns = summary.turns,
            concluded_at = %summary.concluded_at,
            "match concluded"
        );
        Ok(())
    }
}
