//! Worker tasks that back the arena orchestration.
//!
//! Each live session runs one [`SessionWorker`] that owns its
//! [`battle_core::BattleSession`] and is the only code that resolves its turns.

mod session;

pub(crate) use session::{SessionCommand, SessionWorker, WorkerContext};
