//! Topic-based event bus for arena events.
//!
//! Events are published to per-identity and per-session topics, and consumers
//! subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::ArenaEvent;
