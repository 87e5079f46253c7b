//! Live session directory.
//!
//! Maps session ids to their worker's command channel and enforces that two
//! identities share at most one active session. Registration and the pair
//! check happen under one write lock.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use battle_core::{PlayerId, SessionId};
use tokio::sync::{RwLock, mpsc};

use crate::api::{ArenaError, Result};
use crate::workers::SessionCommand;

/// Unordered identity pair.
pub(crate) type Pair = (PlayerId, PlayerId);

pub(crate) fn pair(a: &PlayerId, b: &PlayerId) -> Pair {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

struct Entry {
    commands: mpsc::Sender<SessionCommand>,
    pair: Pair,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Entry>,
    pairs: HashMap<Pair, SessionId>,
}

#[derive(Clone, Default)]
pub(crate) struct SessionRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a session, failing if its participants already share one.
    pub(crate) async fn insert(
        &self,
        id: SessionId,
        home: &PlayerId,
        away: &PlayerId,
        commands: mpsc::Sender<SessionCommand>,
    ) -> Result<()> {
        let key = pair(home, away);
        let mut inner = self.inner.write().await;
        if inner.pairs.contains_key(&key) {
            return Err(ArenaError::PairAlreadyActive(key.0, key.1));
        }
        inner.pairs.insert(key.clone(), id);
        inner.sessions.insert(id, Entry { commands, pair: key });
        Ok(())
    }

    /// Unregisters a session and frees its identity pair.
    pub(crate) async fn remove(&self, id: SessionId) -> bool {
        let mut inner = self.inner.write().await;
        match inner.sessions.remove(&id) {
            Some(entry) => {
                inner.pairs.remove(&entry.pair);
                true
            }
            None => false,
        }
    }

    pub(crate) async fn commands(&self, id: SessionId) -> Option<mpsc::Sender<SessionCommand>> {
        self.inner
            .read()
            .await
            .sessions
            .get(&id)
            .map(|entry| entry.commands.clone())
    }

    pub(crate) async fn is_pair_active(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.inner.read().await.pairs.contains_key(&pair(a, b))
    }

    pub(crate) async fn active_pairs(&self) -> HashSet<Pair> {
        self.inner.read().await.pairs.keys().cloned().collect()
    }

    pub(crate) async fn sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.inner.read().await.sessions.keys().copied().collect();
        ids.sort();
        ids
    }
}
