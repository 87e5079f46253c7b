//! Waiting-room bookkeeping for ranked pairing and private lobbies.
//!
//! The queue only decides who plays whom. Creating the session, resolving
//! rosters and notifying participants is the caller's job.

use std::collections::{BTreeMap, VecDeque};

use crate::error::QueueError;
use crate::ids::{PlayerId, PrivateCode};
use crate::session::StakeTier;
use crate::state::{Combatant, Participant};

/// A participant waiting to be paired, with its resolved roster.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueEntry {
    pub participant: Participant,
    pub roster: Vec<Combatant>,
    pub stake: StakeTier,
}

impl QueueEntry {
    pub fn new(participant: Participant, roster: Vec<Combatant>, stake: StakeTier) -> Self {
        Self {
            participant,
            roster,
            stake,
        }
    }

    pub fn identity(&self) -> &PlayerId {
        &self.participant.identity
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JoinOutcome {
    /// Paired with the oldest compatible entry, which takes the home side.
    Matched { home: QueueEntry, away: QueueEntry },
    Queued,
}

#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<QueueEntry>,
    lobbies: BTreeMap<PrivateCode, QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `entry` with the oldest waiting entry of the same stake tier, or
    /// enqueues it.
    ///
    /// `blocked` reports identity pairs that already share an active session;
    /// such candidates are skipped and stay queued.
    pub fn join<F>(&mut self, entry: QueueEntry, blocked: F) -> Result<JoinOutcome, QueueError>
    where
        F: Fn(&PlayerId, &PlayerId) -> bool,
    {
        if self.contains(entry.identity()) {
            return Err(QueueError::AlreadyQueued(entry.identity().clone()));
        }

        let partner = self.waiting.iter().position(|waiting| {
            waiting.stake == entry.stake && !blocked(waiting.identity(), entry.identity())
        });

        match partner.and_then(|index| self.waiting.remove(index)) {
            Some(home) => Ok(JoinOutcome::Matched { home, away: entry }),
            None => {
                self.waiting.push_back(entry);
                Ok(JoinOutcome::Queued)
            }
        }
    }

    /// Removes every entry held by `identity`. Returns whether one existed.
    pub fn cancel(&mut self, identity: &PlayerId) -> bool {
        let before = self.waiting.len() + self.lobbies.len();
        self.waiting.retain(|entry| entry.identity() != identity);
        self.lobbies.retain(|_, entry| entry.identity() != identity);
        before != self.waiting.len() + self.lobbies.len()
    }

    /// Parks a host under a join code until a guest claims it.
    pub fn open_private(&mut self, entry: QueueEntry, code: PrivateCode) -> Result<(), QueueError> {
        if self.contains(entry.identity()) {
            return Err(QueueError::AlreadyQueued(entry.identity().clone()));
        }
        if self.lobbies.contains_key(&code) {
            return Err(QueueError::CodeInUse(code.0));
        }
        self.lobbies.insert(code, entry);
        Ok(())
    }

    /// Hands the host entry behind `code` to `guest`. The code is single use.
    pub fn claim_private(
        &mut self,
        code: &PrivateCode,
        guest: &PlayerId,
    ) -> Result<QueueEntry, QueueError> {
        match self.lobbies.get(code) {
            None => Err(QueueError::UnknownCode(code.0.clone())),
            Some(host) if host.identity() == guest => Err(QueueError::SelfMatch),
            Some(_) => self
                .lobbies
                .remove(code)
                .ok_or_else(|| QueueError::UnknownCode(code.0.clone())),
        }
    }

    pub fn has_code(&self, code: &PrivateCode) -> bool {
        self.lobbies.contains_key(code)
    }

    pub fn contains(&self, identity: &PlayerId) -> bool {
        self.waiting.iter().any(|entry| entry.identity() == identity)
            || self.lobbies.values().any(|entry| entry.identity() == identity)
    }

    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }
}
