//! Public arena API surface.
//!
//! This module gathers the types exposed to consumers of the arena crate so
//! other layers can stay focused on orchestration and workers.

pub mod connection;
pub mod errors;
pub mod handle;
pub mod providers;

pub use connection::{ArenaConnection, BattleView};
pub use errors::{ArenaError, Result};
pub use handle::{ArenaHandle, JoinTicket, SessionSnapshot, SubmitAck};
pub use providers::{
    AssetResolver, MatchRecorder, MatchSummary, StaticAssetResolver, TracingRecorder,
};
