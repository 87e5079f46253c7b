//! Session worker that owns one authoritative [`BattleSession`].
//!
//! Receives commands from [`ArenaHandle`](crate::api::ArenaHandle), collects
//! both sides' declarations behind a per-turn deadline, resolves the turn and
//! publishes [`ArenaEvent`] notifications. After conclusion it records the
//! match once, waits for acknowledgements, then tears itself down.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    BattleAction, BattleRules, BattleSession, Declaration, ParticipantKind, PlayerId,
    SessionError, SessionPhase, Side, ValidationError,
};
use chrono::Utc;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::api::{
    ArenaError, MatchRecorder, MatchSummary, Result, SessionSnapshot, SubmitAck,
};
use crate::events::{ArenaEvent, EventBus, Topic};
use crate::providers::OpponentPolicy;
use crate::registry::SessionRegistry;

/// Commands a session worker accepts.
pub(crate) enum SessionCommand {
    /// Declare the caller's actions for the current turn.
    Submit {
        identity: PlayerId,
        actions: Vec<BattleAction>,
        reply: oneshot::Sender<Result<SubmitAck>>,
    },
    /// Confirm the conclusion was seen.
    Acknowledge {
        identity: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only view of the session.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Shared collaborators handed to every worker.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub rules: BattleRules,
    pub turn_timeout: Duration,
    pub ack_timeout: Duration,
    pub bus: EventBus,
    pub registry: SessionRegistry,
    pub recorder: Arc<dyn MatchRecorder>,
}

/// Background task driving one session from start to teardown.
pub(crate) struct SessionWorker {
    session: BattleSession,
    ctx: WorkerContext,
    command_rx: mpsc::Receiver<SessionCommand>,
    rng: StdRng,
    /// Declarations for the current turn, indexed by [`Side::index`].
    pending: [Option<Declaration>; 2],
    acknowledged: HashSet<PlayerId>,
}

impl SessionWorker {
    pub(crate) fn new(
        session: BattleSession,
        ctx: WorkerContext,
        command_rx: mpsc::Receiver<SessionCommand>,
        rng: StdRng,
    ) -> Self {
        Self {
            session,
            ctx,
            command_rx,
            rng,
            pending: [None, None],
            acknowledged: HashSet::new(),
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        let id = self.session.id();

        match self.session.start() {
            Ok(()) => self.announce_start().await,
            Err(e) => error!(target: "arena::session", session = %id, error = %e, "session failed to start"),
        }

        while self.session.phase() == SessionPhase::Active {
            if let Err(e) = self.play_turn().await {
                error!(target: "arena::session", session = %id, error = %e, "turn resolution failed");
                break;
            }
        }

        if self.session.is_concluded() {
            self.conclude().await;
            self.await_acknowledgements().await;
        }
        self.teardown().await;
    }

    async fn announce_start(&self) {
        let id = self.session.id();
        let Some(state) = self.session.state() else {
            return;
        };
        let event = ArenaEvent::MatchStarted {
            session: id,
            mode: self.session.mode(),
            state: Box::new(state.clone()),
        };

        for participant in self.session.participants() {
            if participant.kind == ParticipantKind::Human {
                let topic = Topic::Player(participant.identity.clone());
                self.ctx.bus.publish(&topic, event.clone()).await;
            }
        }
        self.ctx.bus.publish(&Topic::Session(id), event).await;

        info!(
            target: "arena::session",
            session = %id,
            mode = ?self.session.mode(),
            stake = %self.session.stake(),
            "match started"
        );
    }

    /// Collects declarations until both sides are in or the deadline passes,
    /// then resolves and broadcasts the turn.
    async fn play_turn(&mut self) -> Result<()> {
        let id = self.session.id();
        let turn = self.session.turn();
        self.pending = [None, None];
        self.declare_automated_sides();

        let deadline = Instant::now() + self.ctx.turn_timeout;
        let mut closing_reply = None;

        while self.pending.iter().any(Option::is_none) {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    closing_reply = self.handle_turn_command(command);
                }
                () = time::sleep_until(deadline) => {
                    let silent: Vec<Side> = Side::BOTH
                        .into_iter()
                        .filter(|side| self.pending[side.index()].is_none())
                        .collect();
                    warn!(target: "arena::session", session = %id, turn, ?silent, "turn deadline elapsed");
                    break;
                }
            }
        }

        let [home, away] = std::mem::take(&mut self.pending)
            .map(|declaration| declaration.unwrap_or(Declaration::Missed));
        let report = self.session.resolve_turn(&self.ctx.rules, &home, &away)?;

        debug!(
            target: "arena::session",
            session = %id,
            turn = report.turn,
            lines = report.log.len(),
            "turn resolved"
        );

        if let Some(state) = self.session.state() {
            let event = ArenaEvent::TurnResolved {
                session: id,
                turn: report.turn,
                state: Box::new(state.clone()),
                log: report.log,
                digest: hex::encode(state.digest()),
            };
            self.ctx.bus.publish(&Topic::Session(id), event).await;
        }

        if let Some(reply) = closing_reply {
            let _ = reply.send(Ok(SubmitAck {
                turn,
                resolved_immediately: true,
            }));
        }
        Ok(())
    }

    fn declare_automated_sides(&mut self) {
        let id = self.session.id();
        let Some(state) = self.session.state() else {
            return;
        };
        for side in Side::BOTH {
            if let ParticipantKind::Automated(difficulty) = state.side(side).participant.kind {
                let actions = OpponentPolicy::new(difficulty).declare(state, side, id, &mut self.rng);
                self.pending[side.index()] = Some(Declaration::Actions(actions));
            }
        }
    }

    /// Handles a command while declarations are open.
    ///
    /// Returns the reply of the submission that completed the turn; it is
    /// answered once the turn has been resolved.
    fn handle_turn_command(
        &mut self,
        command: SessionCommand,
    ) -> Option<oneshot::Sender<Result<SubmitAck>>> {
        match command {
            SessionCommand::Submit {
                identity,
                actions,
                reply,
            } => match self.accept_declaration(&identity, actions) {
                Ok(true) => Some(reply),
                Ok(false) => {
                    let _ = reply.send(Ok(SubmitAck {
                        turn: self.session.turn(),
                        resolved_immediately: false,
                    }));
                    None
                }
                Err(e) => {
                    debug!(target: "arena::session", session = %self.session.id(), %identity, error = %e, "declaration rejected");
                    let _ = reply.send(Err(e));
                    None
                }
            },
            SessionCommand::Acknowledge { reply, .. } => {
                let _ = reply.send(Err(SessionError::InvalidTransition {
                    phase: self.session.phase(),
                    operation: "acknowledge",
                }
                .into()));
                None
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
                None
            }
        }
    }

    /// Stores a validated declaration. Returns whether both sides are now in.
    fn accept_declaration(&mut self, identity: &PlayerId, actions: Vec<BattleAction>) -> Result<bool> {
        let side = self.session.validate_declaration(identity, &actions)?;
        let slot = &mut self.pending[side.index()];
        if slot.is_some() {
            return Err(ArenaError::AlreadySubmitted {
                identity: identity.clone(),
                turn: self.session.turn(),
            });
        }

        debug!(
            target: "arena::session",
            session = %self.session.id(),
            %identity,
            actions = actions.len(),
            "declaration accepted"
        );
        *slot = Some(Declaration::Actions(actions));
        Ok(self.pending.iter().all(Option::is_some))
    }

    /// Broadcasts the outcome and hands the summary to the recorder.
    async fn conclude(&mut self) {
        let id = self.session.id();
        let (Some(outcome), Some(state)) = (self.session.outcome(), self.session.state()) else {
            return;
        };

        let event = ArenaEvent::MatchConcluded {
            session: id,
            winner: outcome.winner.clone(),
            reason: outcome.reason,
            final_state: Box::new(state.clone()),
        };
        self.ctx.bus.publish(&Topic::Session(id), event).await;

        let summary = MatchSummary {
            session: id,
            mode: self.session.mode(),
            stake: self.session.stake(),
            home: state.side(Side::Home).identity().clone(),
            away: state.side(Side::Away).identity().clone(),
            winner: outcome.winner.clone(),
            reason: outcome.reason,
            turns: state.turn,
            concluded_at: Utc::now(),
        };

        info!(
            target: "arena::session",
            session = %id,
            winner = summary.winner.as_ref().map(PlayerId::as_str).unwrap_or("draw"),
            reason = %summary.reason,
            turns = summary.turns,
            "match concluded"
        );

        if let Err(e) = self.ctx.recorder.record(&summary).await {
            error!(target: "arena::session", session = %id, error = %e, "failed to record match");
        }
    }

    /// Waits until every human participant acknowledged or the window closes.
    async fn await_acknowledgements(&mut self) {
        let id = self.session.id();
        let humans: HashSet<PlayerId> = self
            .session
            .participants()
            .into_iter()
            .filter(|p| p.kind == ParticipantKind::Human)
            .map(|p| p.identity.clone())
            .collect();
        let deadline = Instant::now() + self.ctx.ack_timeout;

        while !humans.is_subset(&self.acknowledged) {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    self.handle_concluded_command(command, &humans);
                }
                () = time::sleep_until(deadline) => {
                    debug!(target: "arena::session", session = %id, "acknowledgement window closed");
                    break;
                }
            }
        }
    }

    fn handle_concluded_command(&mut self, command: SessionCommand, humans: &HashSet<PlayerId>) {
        match command {
            SessionCommand::Submit { reply, .. } => {
                let _ = reply.send(Err(ArenaError::SessionConcluded(self.session.id())));
            }
            SessionCommand::Acknowledge { identity, reply } => {
                let result = if humans.contains(&identity) {
                    self.acknowledged.insert(identity);
                    Ok(())
                } else {
                    Err(SessionError::from(ValidationError::UnknownParticipant(identity)).into())
                };
                let _ = reply.send(result);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Unregisters the session, frees its identity pair and closes its channel.
    ///
    /// Commands that raced with teardown are answered before the receiver drops.
    async fn teardown(&mut self) {
        let id = self.session.id();
        self.ctx.registry.remove(id).await;
        self.ctx.bus.close(&Topic::Session(id)).await;
        self.ctx.bus.prune().await;

        self.command_rx.close();
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                SessionCommand::Submit { reply, .. } => {
                    let _ = reply.send(Err(ArenaError::SessionConcluded(id)));
                }
                SessionCommand::Acknowledge { reply, .. } => {
                    let _ = reply.send(Ok(()));
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        info!(target: "arena::session", session = %id, "session torn down");
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&self.session)
    }
}
