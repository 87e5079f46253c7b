//! Arena configuration.
//!
//! Defaults suit a public deployment; [`ArenaConfig::from_env`] applies
//! `ARENA_*` overrides on top of them.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_core::BattleRules;

#[derive(Clone, Debug)]
pub struct ArenaConfig {
    pub rules: BattleRules,
    /// How long a turn waits for declarations before missing sides are skipped.
    pub turn_timeout: Duration,
    /// How long a concluded session waits for participants to acknowledge.
    pub ack_timeout: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Seeds private codes, opponent synthesis and easy-difficulty choices.
    /// `None` draws a seed from the OS.
    pub seed: Option<u64>,
    /// Directory holding `cards.ron` and `opponents.ron`; bundled content fills gaps.
    pub content_dir: Option<PathBuf>,
}

impl ArenaConfig {
    pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_EVENT_BUFFER: usize = 64;
    pub const DEFAULT_COMMAND_BUFFER: usize = 32;

    /// Defaults with `ARENA_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("ARENA_TURN_TIMEOUT_MS") {
            config.turn_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("ARENA_ACK_TIMEOUT_MS") {
            config.ack_timeout = Duration::from_millis(ms);
        }
        if let Some(turns) = read_env::<u32>("ARENA_FORFEIT_AFTER") {
            config.rules.forfeit_after_missed_turns = turns;
        }
        if let Some(turns) = read_env::<u32>("ARENA_MAX_TURNS") {
            config.rules.max_turns = turns;
        }
        if let Some(regen) = read_env::<u32>("ARENA_ENERGY_REGEN") {
            config.rules.energy_regen_per_turn = regen;
        }
        if let Some(percent) = read_env::<u32>("ARENA_DRAIN_PERCENT") {
            config.rules.drain_heal_percent = percent.min(100);
        }
        if let Some(capacity) = read_env::<usize>("ARENA_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("ARENA_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(seed) = read_env::<u64>("ARENA_SEED") {
            config.seed = Some(seed);
        }
        if let Ok(dir) = env::var("ARENA_CONTENT_DIR") {
            config.content_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rules: BattleRules::default(),
            turn_timeout: Self::DEFAULT_TURN_TIMEOUT,
            ack_timeout: Self::DEFAULT_ACK_TIMEOUT,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER,
            seed: None,
            content_dir: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
