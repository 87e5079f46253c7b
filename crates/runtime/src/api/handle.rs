//! Cloneable façade for issuing commands to the arena.
//!
//! [`ArenaHandle`] owns the matchmaking queue and session registry, resolves
//! rosters through the configured [`AssetResolver`], and forwards per-session
//! commands to the owning worker over its channel.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use battle_content::{CardCatalog, TemplateCatalog};
use battle_core::{
    AssetId, BattleAction, BattleSession, BattleState, Combatant, Difficulty, JoinOutcome,
    MatchMode, MatchQueue, Outcome, Participant, PlayerId, PrivateCode, QueueEntry, SessionId,
    SessionPhase, Side, SideState, StakeTier,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};

use super::connection::ArenaConnection;
use super::errors::{ArenaError, Result};
use super::providers::{AssetResolver, MatchRecorder};
use crate::config::ArenaConfig;
use crate::events::{ArenaEvent, EventBus, Topic};
use crate::registry::{self, SessionRegistry};
use crate::workers::{SessionCommand, SessionWorker, WorkerContext};

/// Result of a ranked queue join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinTicket {
    Matched(SessionId),
    Queued,
}

/// Returned once a declaration is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// Turn the declaration counts for.
    pub turn: u32,
    /// True when this declaration completed the turn and it has been resolved.
    pub resolved_immediately: bool,
}

/// Read-only view of a live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionId,
    pub mode: MatchMode,
    pub stake: StakeTier,
    pub phase: SessionPhase,
    pub turn: u32,
    pub state: Option<BattleState>,
    pub outcome: Option<Outcome>,
    /// Hex digest of `state`.
    pub digest: Option<String>,
}

impl SessionSnapshot {
    pub(crate) fn of(session: &BattleSession) -> Self {
        Self {
            session: session.id(),
            mode: session.mode(),
            stake: session.stake(),
            phase: session.phase(),
            turn: session.turn(),
            state: session.state().cloned(),
            outcome: session.outcome().cloned(),
            digest: session.state_digest().map(hex::encode),
        }
    }
}

struct Shared {
    config: ArenaConfig,
    ctx: WorkerContext,
    queue: Mutex<MatchQueue>,
    resolver: Arc<dyn AssetResolver>,
    cards: CardCatalog,
    templates: TemplateCatalog,
    rng: Mutex<StdRng>,
    next_session: AtomicU64,
}

/// Client-facing handle to interact with the arena
#[derive(Clone)]
pub struct ArenaHandle {
    shared: Arc<Shared>,
}

impl ArenaHandle {
    pub(crate) fn new(
        config: ArenaConfig,
        resolver: Arc<dyn AssetResolver>,
        recorder: Arc<dyn MatchRecorder>,
        cards: CardCatalog,
        templates: TemplateCatalog,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ctx = WorkerContext {
            rules: config.rules.clone(),
            turn_timeout: config.turn_timeout,
            ack_timeout: config.ack_timeout,
            bus: EventBus::with_capacity(config.event_buffer_size),
            registry: SessionRegistry::new(),
            recorder,
        };

        Self {
            shared: Arc::new(Shared {
                config,
                ctx,
                queue: Mutex::new(MatchQueue::new()),
                resolver,
                cards,
                templates,
                rng: Mutex::new(rng),
                next_session: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.shared.config
    }

    pub fn cards(&self) -> &CardCatalog {
        &self.shared.cards
    }

    /// Enqueues `identity` for a ranked match, or pairs it right away.
    ///
    /// The older entry takes the home side. Pairs that already share an active
    /// session are not matched again.
    pub async fn join_queue(
        &self,
        identity: PlayerId,
        roster: Vec<AssetId>,
        stake: StakeTier,
    ) -> Result<JoinTicket> {
        let combatants = self.resolve_roster(&identity, &roster).await?;
        let entry = queue_entry(identity, combatants, stake)?;

        let mut queue = self.shared.queue.lock().await;
        let active = self.shared.ctx.registry.active_pairs().await;
        let outcome = queue.join(entry, |a, b| active.contains(&registry::pair(a, b)))?;

        match outcome {
            JoinOutcome::Queued => {
                tracing::debug!(target: "arena::queue", waiting = queue.waiting(), "entry queued");
                Ok(JoinTicket::Queued)
            }
            JoinOutcome::Matched { home, away } => {
                let session = BattleSession::matched(
                    self.next_session_id(),
                    MatchMode::Ranked,
                    stake,
                    side_state(home)?,
                    side_state(away)?,
                )?;
                self.spawn_session(session).await.map(JoinTicket::Matched)
            }
        }
    }

    /// Withdraws every queued entry or open lobby held by `identity`.
    pub async fn cancel_queue(&self, identity: &PlayerId) -> bool {
        self.shared.queue.lock().await.cancel(identity)
    }

    /// Starts a match against a roster synthesized for `difficulty`.
    pub async fn start_automated_match(
        &self,
        identity: PlayerId,
        roster: Vec<AssetId>,
        difficulty: Difficulty,
    ) -> Result<SessionId> {
        let combatants = self.resolve_roster(&identity, &roster).await?;
        let home = SideState::new(Participant::human(identity), combatants)?;

        let specs = {
            let mut rng = self.shared.rng.lock().await;
            self.shared
                .templates
                .synthesize(difficulty, &self.shared.cards, &mut *rng)
                .map_err(|e| ArenaError::Content(e.to_string()))?
        };
        let opponents = specs
            .into_iter()
            .map(Combatant::from_spec)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let away = SideState::new(Participant::automated(difficulty), opponents)?;

        let session = BattleSession::matched(
            self.next_session_id(),
            MatchMode::Automated(difficulty),
            StakeTier::default(),
            home,
            away,
        )?;
        self.spawn_session(session).await
    }

    /// Opens a private lobby and returns the code a guest joins with.
    pub async fn create_private_session(
        &self,
        identity: PlayerId,
        roster: Vec<AssetId>,
        stake: StakeTier,
    ) -> Result<PrivateCode> {
        let combatants = self.resolve_roster(&identity, &roster).await?;
        let entry = queue_entry(identity.clone(), combatants, stake)?;

        let mut queue = self.shared.queue.lock().await;
        let code = loop {
            let candidate = self.generate_code().await;
            if !queue.has_code(&candidate) {
                break candidate;
            }
        };
        queue.open_private(entry, code.clone())?;

        tracing::info!(target: "arena::queue", %code, host = %identity, "private lobby opened");
        Ok(code)
    }

    /// Joins the private lobby behind `code`. Codes are case-insensitive.
    pub async fn join_private_session(
        &self,
        identity: PlayerId,
        roster: Vec<AssetId>,
        code: &str,
    ) -> Result<SessionId> {
        let code = PrivateCode::parse(code);
        if !code.is_well_formed() {
            return Err(ArenaError::InvalidPrivateCode(code.0));
        }
        let combatants = self.resolve_roster(&identity, &roster).await?;
        let guest = SideState::new(Participant::human(identity.clone()), combatants)?;

        let mut queue = self.shared.queue.lock().await;
        let host = queue.claim_private(&code, &identity)?;
        let stake = host.stake;

        let mut session = BattleSession::queued(self.next_session_id(), stake, side_state(host.clone())?);
        session.bind_opponent(guest)?;

        match self.spawn_session(session).await {
            Ok(id) => Ok(id),
            Err(e) => {
                // give the host its lobby back
                let _ = queue.open_private(host, code);
                Err(e)
            }
        }
    }

    /// Declares `identity`'s actions for the current turn of `session`.
    pub async fn submit_actions(
        &self,
        session: SessionId,
        identity: PlayerId,
        actions: Vec<BattleAction>,
    ) -> Result<SubmitAck> {
        let commands = self.commands(session).await?;
        let (reply_tx, reply_rx) = oneshot::channel();

        commands
            .send(SessionCommand::Submit {
                identity,
                actions,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ArenaError::CommandChannelClosed)?;

        reply_rx.await.map_err(ArenaError::ReplyChannelClosed)?
    }

    /// Confirms `identity` has seen the conclusion of `session`.
    pub async fn acknowledge(&self, session: SessionId, identity: PlayerId) -> Result<()> {
        let commands = self.commands(session).await?;
        let (reply_tx, reply_rx) = oneshot::channel();

        commands
            .send(SessionCommand::Acknowledge {
                identity,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ArenaError::CommandChannelClosed)?;

        reply_rx.await.map_err(ArenaError::ReplyChannelClosed)?
    }

    /// Query a live session (read-only snapshot)
    pub async fn session_snapshot(&self, session: SessionId) -> Result<SessionSnapshot> {
        let commands = self.commands(session).await?;
        let (reply_tx, reply_rx) = oneshot::channel();

        commands
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| ArenaError::CommandChannelClosed)?;

        reply_rx.await.map_err(ArenaError::ReplyChannelClosed)
    }

    /// Opens a connection that receives `identity`'s match notifications.
    pub async fn connect(&self, identity: PlayerId) -> ArenaConnection {
        let player_rx = self.subscribe(Topic::Player(identity.clone())).await;
        ArenaConnection::new(self.clone(), identity, player_rx)
    }

    /// Subscribe to events from a specific topic
    pub async fn subscribe(&self, topic: Topic) -> broadcast::Receiver<ArenaEvent> {
        self.shared.ctx.bus.subscribe(topic).await
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.shared.ctx.bus
    }

    /// Whether `session` is still registered.
    pub async fn is_active(&self, session: SessionId) -> bool {
        self.shared.ctx.registry.commands(session).await.is_some()
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.shared.ctx.registry.sessions().await
    }

    async fn commands(&self, session: SessionId) -> Result<mpsc::Sender<SessionCommand>> {
        self.shared
            .ctx
            .registry
            .commands(session)
            .await
            .ok_or(ArenaError::SessionNotFound(session))
    }

    async fn resolve_roster(&self, owner: &PlayerId, assets: &[AssetId]) -> Result<Vec<Combatant>> {
        self.shared.resolver.resolve(owner, assets).await
    }

    /// Registers `session` and spawns its worker.
    async fn spawn_session(&self, session: BattleSession) -> Result<SessionId> {
        let id = session.id();
        let (Some(home), Some(away)) = (session.participant(Side::Home), session.participant(Side::Away))
        else {
            return Err(ArenaError::SessionNotFound(id));
        };

        let (command_tx, command_rx) = mpsc::channel(self.shared.config.command_buffer_size);
        self.shared
            .ctx
            .registry
            .insert(id, &home.identity, &away.identity, command_tx)
            .await?;

        tracing::info!(
            target: "arena::session",
            session = %id,
            home = %home.identity,
            away = %away.identity,
            "session spawned"
        );

        let seed = self.shared.rng.lock().await.r#gen::<u64>();
        let worker = SessionWorker::new(
            session,
            self.shared.ctx.clone(),
            command_rx,
            StdRng::seed_from_u64(seed),
        );
        tokio::spawn(worker.run());
        Ok(id)
    }

    fn next_session_id(&self) -> SessionId {
        SessionId(self.shared.next_session.fetch_add(1, Ordering::Relaxed))
    }

    async fn generate_code(&self) -> PrivateCode {
        let mut rng = self.shared.rng.lock().await;
        let code = (0..PrivateCode::LEN)
            .map(|_| {
                let index = rng.gen_range(0..PrivateCode::ALPHABET.len());
                char::from(PrivateCode::ALPHABET[index])
            })
            .collect();
        PrivateCode(code)
    }
}

/// Builds a queue entry, rejecting rosters that could never field a side.
fn queue_entry(identity: PlayerId, combatants: Vec<Combatant>, stake: StakeTier) -> Result<QueueEntry> {
    let side = SideState::new(Participant::human(identity), combatants)?;
    Ok(QueueEntry::new(side.participant, side.roster.into_iter().collect(), stake))
}

fn side_state(entry: QueueEntry) -> Result<SideState> {
    Ok(SideState::new(entry.participant, entry.roster)?)
}
