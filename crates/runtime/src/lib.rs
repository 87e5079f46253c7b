//! Async authority for the card battle arena.
//!
//! This crate wires the pure rules of `battle-core` and the content of
//! `battle-content` into live sessions. Consumers build an [`Arena`], hand
//! out [`ArenaHandle`]s, and follow matches through [`ArenaConnection`]s.
//!
//! Modules are organized by responsibility:
//! - [`arena`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`providers`] holds the automated opponent policy
//! - `workers` keeps the per-session tasks internal to the crate
pub mod api;
pub mod arena;
pub mod config;
pub mod events;
pub mod providers;

mod registry;
mod workers;

pub use api::{
    ArenaConnection, ArenaError, ArenaHandle, AssetResolver, BattleView, JoinTicket,
    MatchRecorder, MatchSummary, Result, SessionSnapshot, StaticAssetResolver, SubmitAck,
    TracingRecorder,
};
pub use arena::{Arena, ArenaBuilder};
pub use config::ArenaConfig;
pub use events::{ArenaEvent, EventBus, Topic};
pub use providers::OpponentPolicy;
