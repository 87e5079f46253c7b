use std::sync::Arc;
use std::time::Duration;

use arena_runtime::{
    Arena, ArenaConfig, ArenaConnection, ArenaError, ArenaEvent, ArenaHandle, JoinTicket,
    MatchRecorder, MatchSummary, StaticAssetResolver,
};
use async_trait::async_trait;
use battle_core::{
    AssetId, BattleAction, Card, CardEffect, CombatantSpec, ConclusionReason, Difficulty,
    EffectKind, Element, Elements, MatchMode, PlayerId, QueueError, SessionId, Side, StakeTier,
    TargetSelector,
};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct MemoryRecorder(Arc<Mutex<Vec<MatchSummary>>>);

#[async_trait]
impl MatchRecorder for MemoryRecorder {
    async fn record(&self, summary: &MatchSummary) -> arena_runtime::Result<()> {
        self.0.lock().await.push(summary.clone());
        Ok(())
    }
}

fn spec(id: &str, element: Element, hp: u32, speed: u32, attack: u32, card: Card) -> CombatantSpec {
    CombatantSpec {
        id: AssetId::new(id),
        name: id.to_string(),
        elements: Elements::single(element),
        hp,
        energy: 100,
        speed,
        attack,
        defense: 10,
        cards: vec![card],
    }
}

fn strike(element: Element, base: u32, cost: u32) -> Card {
    Card::new(
        "strike",
        "Strike",
        element,
        cost,
        vec![CardEffect::new(EffectKind::Damage, base, TargetSelector::Enemy)],
    )
}

fn resolver() -> StaticAssetResolver {
    StaticAssetResolver::new()
        .with(spec("ember", Element::Fire, 200, 60, 35, strike(Element::Fire, 40, 20)))
        .with(spec("sprout", Element::Plant, 100, 40, 15, strike(Element::Plant, 20, 10)))
        .with(spec("titan", Element::Spirit, 5000, 999, 200, strike(Element::Spirit, 100, 0)))
}

fn arena(recorder: MemoryRecorder) -> Arena {
    let config = ArenaConfig {
        seed: Some(7),
        ..ArenaConfig::default()
    };
    Arena::builder()
        .config(config)
        .resolver(resolver())
        .recorder(recorder)
        .build()
        .expect("arena builds with bundled content")
}

fn alice() -> PlayerId {
    PlayerId::new("alice")
}

fn bob() -> PlayerId {
    PlayerId::new("bob")
}

fn roster(id: &str) -> Vec<AssetId> {
    vec![AssetId::new(id)]
}

async fn ranked_pair(handle: &ArenaHandle) -> SessionId {
    let first = handle
        .join_queue(alice(), roster("ember"), StakeTier::Silver)
        .await
        .expect("alice joins");
    assert_eq!(first, JoinTicket::Queued);

    match handle
        .join_queue(bob(), roster("sprout"), StakeTier::Silver)
        .await
        .expect("bob joins")
    {
        JoinTicket::Matched(id) => id,
        JoinTicket::Queued => panic!("equal stakes should pair"),
    }
}

async fn expect_started(conn: &mut ArenaConnection) -> SessionId {
    match conn.next_event().await {
        Some(ArenaEvent::MatchStarted { session, .. }) => session,
        other => panic!("expected MatchStarted, got {other:?}"),
    }
}

async fn wait_for_teardown(handle: &ArenaHandle, session: SessionId) {
    // long enough to outlast the acknowledgement window
    for _ in 0..120 {
        if !handle.is_active(session).await {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    panic!("{session} was never torn down");
}

#[tokio::test(start_paused = true)]
async fn knockout_concludes_records_once_and_tears_down() {
    let recorder = MemoryRecorder::default();
    let arena = arena(recorder.clone());
    let handle = arena.handle();

    // ================================================================
    // PHASE 1: pairing
    // ================================================================
    let mut conn = arena.connect(alice()).await;
    let session = ranked_pair(&handle).await;
    assert_eq!(expect_started(&mut conn).await, session);
    assert_eq!(conn.session(), Some(session));

    // ================================================================
    // PHASE 2: one decisive turn
    // ================================================================
    let first = conn
        .submit(vec![BattleAction::new(session, 0, 0)])
        .await
        .expect("alice declares");
    assert_eq!(first.turn, 1);
    assert!(!first.resolved_immediately);

    let dup = conn.submit(vec![BattleAction::new(session, 0, 0)]).await;
    assert!(matches!(dup, Err(ArenaError::AlreadySubmitted { turn: 1, .. })));

    let second = handle
        .submit_actions(session, bob(), vec![BattleAction::new(session, 0, 0)])
        .await
        .expect("bob declares");
    assert!(second.resolved_immediately);

    match conn.next_event().await {
        Some(ArenaEvent::TurnResolved { turn, log, .. }) => {
            assert_eq!(turn, 1);
            assert_eq!(log[1], "ember hits sprout for 130 damage (x2.0)");
            assert!(log.iter().any(|l| l == "sprout has fainted and cannot act"));
        }
        other => panic!("expected TurnResolved, got {other:?}"),
    }
    assert!(conn.view().in_sync());

    match conn.next_event().await {
        Some(ArenaEvent::MatchConcluded { winner, reason, .. }) => {
            assert_eq!(winner, Some(alice()));
            assert_eq!(reason, ConclusionReason::Knockout);
        }
        other => panic!("expected MatchConcluded, got {other:?}"),
    }

    // ================================================================
    // PHASE 3: locked out, acknowledged, torn down
    // ================================================================
    let late = handle
        .submit_actions(session, alice(), vec![BattleAction::new(session, 0, 0)])
        .await;
    assert!(matches!(late, Err(ArenaError::SessionConcluded(id)) if id == session));

    conn.acknowledge().await.expect("alice acknowledges");
    handle.acknowledge(session, bob()).await.expect("bob acknowledges");

    assert!(conn.next_event().await.is_none(), "session channel closes on teardown");
    wait_for_teardown(&handle, session).await;
    assert!(matches!(
        handle.session_snapshot(session).await,
        Err(ArenaError::SessionNotFound(_))
    ));

    let recorded = recorder.0.lock().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].winner, Some(alice()));
    assert_eq!(recorded[0].mode, MatchMode::Ranked);
    assert_eq!(recorded[0].stake, StakeTier::Silver);
}

#[tokio::test(start_paused = true)]
async fn deadline_resolves_without_the_silent_side() {
    let arena = arena(MemoryRecorder::default());
    let handle = arena.handle();
    let mut conn = arena.connect(alice()).await;
    let session = ranked_pair(&handle).await;
    expect_started(&mut conn).await;

    // Nothing that kills: the turn should run with only alice acting.
    conn.submit(Vec::new()).await.expect("empty declaration is valid");

    match conn.next_event().await {
        Some(ArenaEvent::TurnResolved { turn, state, log, .. }) => {
            assert_eq!(turn, 1);
            assert!(!log.iter().any(|l| l.starts_with("sprout plays")));
            assert_eq!(state.side(Side::Away).missed_turns, 1);
            assert_eq!(state.side(Side::Home).missed_turns, 0);
        }
        other => panic!("expected TurnResolved, got {other:?}"),
    }

    let snapshot = handle.session_snapshot(session).await.expect("still live");
    assert_eq!(snapshot.turn, 2);
}

#[tokio::test(start_paused = true)]
async fn consecutive_missed_turns_forfeit_the_match() {
    let recorder = MemoryRecorder::default();
    let arena = arena(recorder.clone());
    let handle = arena.handle();
    let mut conn = arena.connect(alice()).await;
    let session = ranked_pair(&handle).await;
    expect_started(&mut conn).await;

    let limit = arena.config().rules.forfeit_after_missed_turns;
    for turn in 1..=limit {
        conn.submit(Vec::new()).await.expect("alice keeps declaring");
        match conn.next_event().await {
            Some(ArenaEvent::TurnResolved { turn: resolved, .. }) => assert_eq!(resolved, turn),
            other => panic!("expected TurnResolved, got {other:?}"),
        }
    }

    match conn.next_event().await {
        Some(ArenaEvent::MatchConcluded { winner, reason, .. }) => {
            assert_eq!(winner, Some(alice()));
            assert_eq!(reason, ConclusionReason::Forfeit);
        }
        other => panic!("expected MatchConcluded, got {other:?}"),
    }

    // Bob never acknowledges; the window closes on its own.
    conn.acknowledge().await.expect("alice acknowledges");
    wait_for_teardown(&handle, session).await;
    assert_eq!(recorder.0.lock().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn automated_match_runs_to_conclusion() {
    let recorder = MemoryRecorder::default();
    let arena = arena(recorder.clone());
    let mut conn = arena.connect(alice()).await;

    let session = conn
        .start_automated_match(roster("titan"), Difficulty::Easy)
        .await
        .expect("automated match starts");
    assert_eq!(expect_started(&mut conn).await, session);

    let opponents = conn
        .view()
        .state()
        .map(|state| state.side(Side::Away).roster.len())
        .expect("view has a state");
    assert_eq!(opponents, 2);

    loop {
        let alive = conn
            .view()
            .state()
            .is_some_and(|state| state.side(Side::Home).living().next().is_some());
        let actions = if alive {
            vec![BattleAction::new(session, 0, 0)]
        } else {
            Vec::new()
        };
        match conn.submit(actions).await {
            Ok(_) | Err(ArenaError::SessionConcluded(_)) => {}
            Err(e) => panic!("unexpected submission failure: {e}"),
        }

        match conn.next_event().await {
            Some(ArenaEvent::TurnResolved { .. }) if !conn.view().is_concluded() => {}
            Some(ArenaEvent::MatchConcluded { winner, .. }) => {
                assert_eq!(winner, Some(alice()));
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    conn.acknowledge().await.expect("alice acknowledges");
    let handle = arena.handle();
    wait_for_teardown(&handle, session).await;

    let recorded = recorder.0.lock().await;
    assert_eq!(recorded[0].mode, MatchMode::Automated(Difficulty::Easy));
    assert_eq!(recorded[0].away, PlayerId::new("bot:easy"));
}

#[tokio::test(start_paused = true)]
async fn private_code_round_trip() {
    let arena = arena(MemoryRecorder::default());
    let handle = arena.handle();
    let mut host = arena.connect(alice()).await;

    let code = host
        .create_private_session(roster("ember"), StakeTier::Gold)
        .await
        .expect("lobby opens");
    assert!(code.is_well_formed());

    assert!(matches!(
        handle.join_private_session(bob(), roster("sprout"), "no!").await,
        Err(ArenaError::InvalidPrivateCode(_))
    ));
    assert!(matches!(
        handle.join_private_session(alice(), roster("sprout"), code.as_str()).await,
        Err(ArenaError::Queue(QueueError::SelfMatch))
    ));

    let typed = format!("  {}  ", code.as_str().to_lowercase());
    let session = handle
        .join_private_session(bob(), roster("sprout"), &typed)
        .await
        .expect("guest joins");

    match host.next_event().await {
        Some(ArenaEvent::MatchStarted { session: started, mode, state }) => {
            assert_eq!(started, session);
            assert_eq!(mode, MatchMode::Private);
            assert_eq!(state.side(Side::Home).identity(), &alice());
        }
        other => panic!("expected MatchStarted, got {other:?}"),
    }

    let snapshot = handle.session_snapshot(session).await.expect("live session");
    assert_eq!(snapshot.stake, StakeTier::Gold);

    assert!(matches!(
        handle
            .join_private_session(PlayerId::new("carol"), roster("sprout"), code.as_str())
            .await,
        Err(ArenaError::Queue(QueueError::UnknownCode(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn a_pair_shares_at_most_one_active_session() {
    let arena = arena(MemoryRecorder::default());
    let handle = arena.handle();
    let session = ranked_pair(&handle).await;
    assert_eq!(handle.active_sessions().await, vec![session]);

    let code = handle
        .create_private_session(alice(), roster("ember"), StakeTier::Bronze)
        .await
        .expect("lobby opens");
    assert!(matches!(
        handle.join_private_session(bob(), roster("sprout"), code.as_str()).await,
        Err(ArenaError::PairAlreadyActive(..))
    ));
    // The failed join hands the lobby back to its host.
    assert!(handle.cancel_queue(&alice()).await);

    assert_eq!(
        handle.join_queue(alice(), roster("ember"), StakeTier::Silver).await.expect("queued"),
        JoinTicket::Queued
    );
    assert_eq!(
        handle.join_queue(bob(), roster("sprout"), StakeTier::Silver).await.expect("queued"),
        JoinTicket::Queued
    );
    assert_eq!(handle.active_sessions().await, vec![session]);
}
