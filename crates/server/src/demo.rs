//! Demonstration match: a local identity against an automated opponent.
//!
//! The local side is played by the hard opponent policy, so the demo needs no
//! input and always terminates.

use anyhow::{Result, bail};
use arena_runtime::{Arena, ArenaError, ArenaEvent, OpponentPolicy};
use battle_core::{AssetId, BattleRules, Difficulty, PlayerId, Side};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub async fn run(arena: &Arena, mut roster: Vec<AssetId>) -> Result<()> {
    roster.truncate(BattleRules::MAX_ROSTER);
    let difficulty = std::env::var("ARENA_DEMO_DIFFICULTY")
        .ok()
        .and_then(|raw| raw.parse::<Difficulty>().ok())
        .unwrap_or_default();
    let identity = PlayerId::new("demo-player");

    let mut conn = arena.connect(identity.clone()).await;
    let session = conn.start_automated_match(roster, difficulty).await?;
    tracing::info!(%session, %difficulty, "demo match requested");

    let pilot = OpponentPolicy::new(Difficulty::Hard);
    let mut rng = StdRng::seed_from_u64(arena.config().seed.unwrap_or_default());

    while let Some(event) = conn.next_event().await {
        match &event {
            ArenaEvent::MatchStarted { .. } => {
                tracing::info!(%session, "match started");
            }
            ArenaEvent::TurnResolved { turn, log, .. } => {
                for line in log {
                    tracing::info!(turn, "{line}");
                }
                if !conn.view().in_sync() {
                    tracing::warn!(turn, "local view diverged; resyncing");
                    conn.resync().await?;
                }
            }
            ArenaEvent::MatchConcluded { winner, reason, .. } => {
                match winner {
                    Some(winner) => tracing::info!(%winner, %reason, "match concluded"),
                    None => tracing::info!(%reason, "match ended in a draw"),
                }
                conn.acknowledge().await?;
                return Ok(());
            }
        }

        let Some(state) = conn.view().state() else {
            continue;
        };
        let actions = pilot.declare(state, Side::Home, session, &mut rng);
        match conn.submit(actions).await {
            Ok(_) | Err(ArenaError::SessionConcluded(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    bail!("{session} closed before concluding")
}
