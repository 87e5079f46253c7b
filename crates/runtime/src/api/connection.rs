//! Client-side connection objects.
//!
//! An [`ArenaConnection`] belongs to one identity. It listens on the identity
//! topic until a match starts, then follows that session's topic until the
//! session closes. Dropping it unsubscribes from both.

use std::collections::HashSet;

use battle_core::{
    AssetId, BattleAction, BattleState, ConclusionReason, Difficulty, PlayerId, PrivateCode,
    SessionId, StakeTier,
};
use tokio::sync::broadcast::{self, error::RecvError};

use super::errors::{ArenaError, Result};
use super::handle::{ArenaHandle, JoinTicket, SessionSnapshot, SubmitAck};
use crate::events::{ArenaEvent, Topic};

/// Local rendering of the session a connection follows.
///
/// Every broadcast carries a full snapshot, so applying an event replaces the
/// state outright. Missed or lagged events only delay the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleView {
    session: Option<SessionId>,
    state: Option<BattleState>,
    /// Last resolved turn.
    turn: u32,
    log: Vec<String>,
    digest: Option<String>,
    conclusion: Option<(Option<PlayerId>, ConclusionReason)>,
}

impl BattleView {
    pub fn apply(&mut self, event: &ArenaEvent) {
        if self.session != Some(event.session()) {
            *self = Self {
                session: Some(event.session()),
                ..Self::default()
            };
        }
        self.state = Some(event.state().clone());

        match event {
            ArenaEvent::MatchStarted { .. } => {}
            ArenaEvent::TurnResolved {
                turn, log, digest, ..
            } => {
                self.turn = *turn;
                self.log = log.clone();
                self.digest = Some(digest.clone());
            }
            ArenaEvent::MatchConcluded { winner, reason, .. } => {
                self.conclusion = Some((winner.clone(), *reason));
            }
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn state(&self) -> Option<&BattleState> {
        self.state.as_ref()
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Log lines of the last resolved turn.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_concluded(&self) -> bool {
        self.conclusion.is_some()
    }

    /// Winner once concluded; `Some(None)` is a draw.
    pub fn winner(&self) -> Option<Option<&PlayerId>> {
        self.conclusion.as_ref().map(|(winner, _)| winner.as_ref())
    }

    pub fn reason(&self) -> Option<ConclusionReason> {
        self.conclusion.as_ref().map(|(_, reason)| *reason)
    }

    /// Compares the local state against the last broadcast digest.
    ///
    /// True when no digest has been received yet.
    pub fn in_sync(&self) -> bool {
        match (&self.state, &self.digest) {
            (Some(state), Some(digest)) => hex::encode(state.digest()) == *digest,
            _ => true,
        }
    }

    /// Replaces the view from an authoritative snapshot.
    pub fn resync(&mut self, snapshot: &SessionSnapshot) {
        self.session = Some(snapshot.session);
        self.state = snapshot.state.clone();
        self.digest = snapshot.digest.clone();
        self.turn = snapshot.turn.saturating_sub(1);
        self.conclusion = snapshot
            .outcome
            .as_ref()
            .map(|outcome| (outcome.winner.clone(), outcome.reason));
    }
}

/// One identity's live link to the arena.
pub struct ArenaConnection {
    handle: ArenaHandle,
    identity: PlayerId,
    player_rx: broadcast::Receiver<ArenaEvent>,
    session_rx: Option<(SessionId, broadcast::Receiver<ArenaEvent>)>,
    /// Sessions whose channel already closed; stale start notices are skipped.
    finished: HashSet<SessionId>,
    view: BattleView,
}

impl ArenaConnection {
    pub(crate) fn new(
        handle: ArenaHandle,
        identity: PlayerId,
        player_rx: broadcast::Receiver<ArenaEvent>,
    ) -> Self {
        tracing::debug!(target: "arena::connection", %identity, "connected");
        Self {
            handle,
            identity,
            player_rx,
            session_rx: None,
            finished: HashSet::new(),
            view: BattleView::default(),
        }
    }

    pub fn identity(&self) -> &PlayerId {
        &self.identity
    }

    pub fn view(&self) -> &BattleView {
        &self.view
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session_rx.as_ref().map(|(id, _)| *id)
    }

    /// Follows `session`'s topic, replacing any previous attachment.
    pub async fn attach(&mut self, session: SessionId) -> Result<()> {
        if self.session() == Some(session) {
            return Ok(());
        }
        let rx = self.handle.subscribe(Topic::Session(session)).await;
        // The worker unregisters before closing its channel, so a session that
        // is still registered here will close this receiver on teardown.
        if !self.handle.is_active(session).await {
            drop(rx);
            self.handle.event_bus().prune().await;
            return Err(ArenaError::SessionNotFound(session));
        }
        tracing::debug!(target: "arena::connection", identity = %self.identity, %session, "attached");
        self.session_rx = Some((session, rx));
        Ok(())
    }

    pub fn detach(&mut self) {
        if let Some((session, _)) = self.session_rx.take() {
            self.finished.insert(session);
        }
    }

    /// Next event for this connection, updating [`Self::view`].
    ///
    /// Attaches automatically on `MatchStarted`. Returns `None` when the
    /// followed channel closes: the session's after teardown, or the identity
    /// topic's.
    pub async fn next_event(&mut self) -> Option<ArenaEvent> {
        loop {
            let received = match self.session_rx.as_mut() {
                Some((_, rx)) => rx.recv().await,
                None => self.player_rx.recv().await,
            };

            match received {
                Ok(event) => {
                    if let ArenaEvent::MatchStarted { session, .. } = &event {
                        if self.finished.contains(session) {
                            continue;
                        }
                        if self.session_rx.is_none() && self.attach(*session).await.is_err() {
                            self.finished.insert(*session);
                            continue;
                        }
                    }
                    self.view.apply(&event);
                    return Some(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: "arena::connection",
                        identity = %self.identity,
                        skipped,
                        "receiver lagged"
                    );
                }
                Err(RecvError::Closed) => {
                    if self.session_rx.is_some() {
                        self.detach();
                    }
                    return None;
                }
            }
        }
    }

    pub async fn join_queue(&self, roster: Vec<AssetId>, stake: StakeTier) -> Result<JoinTicket> {
        self.handle.join_queue(self.identity.clone(), roster, stake).await
    }

    pub async fn cancel_queue(&self) -> bool {
        self.handle.cancel_queue(&self.identity).await
    }

    pub async fn start_automated_match(
        &self,
        roster: Vec<AssetId>,
        difficulty: Difficulty,
    ) -> Result<SessionId> {
        self.handle
            .start_automated_match(self.identity.clone(), roster, difficulty)
            .await
    }

    pub async fn create_private_session(
        &self,
        roster: Vec<AssetId>,
        stake: StakeTier,
    ) -> Result<PrivateCode> {
        self.handle
            .create_private_session(self.identity.clone(), roster, stake)
            .await
    }

    pub async fn join_private_session(&self, roster: Vec<AssetId>, code: &str) -> Result<SessionId> {
        self.handle
            .join_private_session(self.identity.clone(), roster, code)
            .await
    }

    /// Declares actions for the attached session's current turn.
    pub async fn submit(&self, actions: Vec<BattleAction>) -> Result<SubmitAck> {
        let session = self.session().ok_or(ArenaError::NotAttached)?;
        self.handle
            .submit_actions(session, self.identity.clone(), actions)
            .await
    }

    pub async fn acknowledge(&self) -> Result<()> {
        let session = self.session().ok_or(ArenaError::NotAttached)?;
        self.handle.acknowledge(session, self.identity.clone()).await
    }

    /// Pulls an authoritative snapshot and rebuilds the view from it.
    pub async fn resync(&mut self) -> Result<()> {
        let session = self.session().ok_or(ArenaError::NotAttached)?;
        let snapshot = self.handle.session_snapshot(session).await?;
        self.view.resync(&snapshot);
        Ok(())
    }
}

impl Drop for ArenaConnection {
    fn drop(&mut self) {
        tracing::debug!(target: "arena::connection", identity = %self.identity, "disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        AssetId, Combatant, CombatantSpec, Element, Elements, MatchMode, Participant, SideState,
    };

    fn state() -> BattleState {
        let unit = |name: &str| {
            Combatant::from_spec(CombatantSpec {
                id: AssetId::new(name),
                name: name.to_string(),
                elements: Elements::single(Element::Water),
                hp: 80,
                energy: 40,
                speed: 10,
                attack: 5,
                defense: 5,
                cards: vec![battle_core::Card::new(
                    "splash",
                    "Splash",
                    Element::Water,
                    5,
                    vec![battle_core::CardEffect::new(
                        battle_core::EffectKind::Damage,
                        10,
                        battle_core::TargetSelector::Enemy,
                    )],
                )],
            })
            .unwrap()
        };
        BattleState::new(
            SideState::new(Participant::human(PlayerId::new("alice")), vec![unit("a")]).unwrap(),
            SideState::new(Participant::human(PlayerId::new("bob")), vec![unit("b")]).unwrap(),
        )
    }

    #[test]
    fn view_replaces_state_and_detects_desync() {
        let mut view = BattleView::default();
        let state = state();
        view.apply(&ArenaEvent::MatchStarted {
            session: SessionId(5),
            mode: MatchMode::Ranked,
            state: Box::new(state.clone()),
        });
        assert!(view.in_sync());

        // Turn 1 was skipped; the turn 2 snapshot replaces everything.
        let mut later = state.clone();
        later.turn = 3;
        view.apply(&ArenaEvent::TurnResolved {
            session: SessionId(5),
            turn: 2,
            state: Box::new(later.clone()),
            log: vec!["a plays Splash".into()],
            digest: hex::encode(later.digest()),
        });
        assert_eq!(view.turn(), 2);
        assert_eq!(view.state(), Some(&later));
        assert!(view.in_sync());

        view.apply(&ArenaEvent::TurnResolved {
            session: SessionId(5),
            turn: 3,
            state: Box::new(later),
            log: Vec::new(),
            digest: hex::encode(state.digest()),
        });
        assert!(!view.in_sync());
    }

    #[test]
    fn a_new_session_resets_the_view() {
        let mut view = BattleView::default();
        view.apply(&ArenaEvent::MatchConcluded {
            session: SessionId(1),
            winner: None,
            reason: ConclusionReason::TurnLimit,
            final_state: Box::new(state()),
        });
        assert_eq!(view.winner(), Some(None));

        view.apply(&ArenaEvent::MatchStarted {
            session: SessionId(2),
            mode: MatchMode::Private,
            state: Box::new(state()),
        });
        assert_eq!(view.session(), Some(SessionId(2)));
        assert!(!view.is_concluded());
    }
}
