//! Unified error types surfaced by the arena API.
//!
//! Wraps rule violations from `battle-core` together with coordination
//! failures so callers can bubble them up with consistent context. None of
//! these are fatal to the arena itself.
use battle_core::{PlayerId, QueueError, RosterError, SessionError, SessionId};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, ArenaError>;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("{0} not found")]
    SessionNotFound(SessionId),

    #[error("{0} has concluded")]
    SessionConcluded(SessionId),

    #[error("{identity} already declared for turn {turn}")]
    AlreadySubmitted { identity: PlayerId, turn: u32 },

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("asset resolution failed: {0}")]
    Resolver(String),

    #[error("match recording failed: {0}")]
    Recorder(String),

    #[error("invalid private code {0:?}")]
    InvalidPrivateCode(String),

    #[error("{0} and {1} already share an active session")]
    PairAlreadyActive(PlayerId, PlayerId),

    #[error("connection is not attached to a session")]
    NotAttached,

    #[error("content unavailable: {0}")]
    Content(String),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
