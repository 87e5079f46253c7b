//! Battle session state machine.
//!
//! ```text
//! Queued ──bind_opponent──▶ Matched ──start──▶ Active ──resolve_turn*──▶ Concluded
//!                    matched() ──┘
//! ```
//!
//! Transitions are one-directional. A session created by the matchmaking queue
//! or for an automated opponent starts in `Matched`; a private lobby starts in
//! `Queued` until a guest binds. Once `Concluded` the session records its
//! outcome and rejects further declarations.

use crate::action::{BattleAction, Declaration};
use crate::config::BattleRules;
use crate::engine::CombatEngine;
use crate::error::{SessionError, ValidationError};
use crate::ids::{PlayerId, SessionId};
use crate::state::{BattleState, CombatantRef, Participant, Side, SideState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    Queued,
    Matched,
    Active,
    Concluded,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Wagered-value bracket a participant opts into.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StakeTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchMode {
    Ranked,
    Automated(Difficulty),
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ConclusionReason {
    /// Every combatant of the losing side fainted.
    Knockout,
    /// The losing side missed too many consecutive turns.
    Forfeit,
    /// The turn cap was reached; decided on remaining hit points.
    TurnLimit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    /// `None` for a draw.
    pub winner: Option<PlayerId>,
    pub winning_side: Option<Side>,
    pub reason: ConclusionReason,
}

impl Outcome {
    fn victory(state: &BattleState, side: Side, reason: ConclusionReason) -> Self {
        Self {
            winner: Some(state.side(side).identity().clone()),
            winning_side: Some(side),
            reason,
        }
    }

    fn draw(reason: ConclusionReason) -> Self {
        Self {
            winner: None,
            winning_side: None,
            reason,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// What one call to [`BattleSession::resolve_turn`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    /// The turn that was resolved.
    pub turn: u32,
    pub log: Vec<String>,
    /// Set when this turn concluded the match.
    pub outcome: Option<Outcome>,
}

/// Match-level aggregate from pairing through conclusion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSession {
    id: SessionId,
    mode: MatchMode,
    stake: StakeTier,
    phase: SessionPhase,
    /// Host waiting in a private lobby (`Queued` only).
    lobby: Option<SideState>,
    /// Combat state, present from `Matched` on.
    state: Option<BattleState>,
    outcome: Option<Outcome>,
}

impl BattleSession {
    /// Opens a private lobby with only the host bound.
    pub fn queued(id: SessionId, stake: StakeTier, host: SideState) -> Self {
        Self {
            id,
            mode: MatchMode::Private,
            stake,
            phase: SessionPhase::Queued,
            lobby: Some(host),
            state: None,
            outcome: None,
        }
    }

    /// Binds two participants directly and produces the initial snapshots.
    pub fn matched(
        id: SessionId,
        mode: MatchMode,
        stake: StakeTier,
        home: SideState,
        away: SideState,
    ) -> Result<Self, SessionError> {
        if home.identity() == away.identity() {
            return Err(SessionError::SelfMatch);
        }
        Ok(Self {
            id,
            mode,
            stake,
            phase: SessionPhase::Matched,
            lobby: None,
            state: Some(BattleState::new(home, away)),
            outcome: None,
        })
    }

    /// Queued → Matched: the guest takes the away side.
    pub fn bind_opponent(&mut self, guest: SideState) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Queued, "bind an opponent")?;
        let Some(host) = self.lobby.take() else {
            return Err(self.transition_error("bind an opponent"));
        };
        if host.identity() == guest.identity() {
            self.lobby = Some(host);
            return Err(SessionError::SelfMatch);
        }

        self.state = Some(BattleState::new(host, guest));
        self.phase = SessionPhase::Matched;
        Ok(())
    }

    /// Matched → Active.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Matched, "start")?;
        self.phase = SessionPhase::Active;
        Ok(())
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn stake(&self) -> StakeTier {
        self.stake
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> Option<&BattleState> {
        self.state.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_concluded(&self) -> bool {
        self.phase == SessionPhase::Concluded
    }

    /// Digest of the combat state, once there is one.
    #[cfg(feature = "serde")]
    pub fn state_digest(&self) -> Option<[u8; 32]> {
        self.state.as_ref().map(BattleState::digest)
    }

    /// Current turn number; zero before the match has combat state.
    pub fn turn(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.turn)
    }

    /// Bound participants, home first.
    pub fn participants(&self) -> Vec<&Participant> {
        match (&self.state, &self.lobby) {
            (Some(state), _) => Side::BOTH
                .iter()
                .map(|&side| &state.side(side).participant)
                .collect(),
            (None, Some(host)) => vec![&host.participant],
            (None, None) => Vec::new(),
        }
    }

    pub fn participant(&self, side: Side) -> Option<&Participant> {
        self.state.as_ref().map(|s| &s.side(side).participant)
    }

    /// Synchronous submission check; touches no state.
    ///
    /// Returns the declaring side. Energy is checked against the current value;
    /// the engine checks it again when each action executes.
    pub fn validate_declaration(
        &self,
        identity: &PlayerId,
        actions: &[BattleAction],
    ) -> Result<Side, SessionError> {
        if self.phase == SessionPhase::Concluded {
            return Err(SessionError::Concluded(self.id));
        }
        self.expect_phase(SessionPhase::Active, "submit actions")?;
        let state = self.active_state("submit actions")?;

        let side = state
            .side_of(identity)
            .ok_or_else(|| ValidationError::UnknownParticipant(identity.clone()))?;

        let mut seen: Vec<u8> = Vec::with_capacity(actions.len());
        for action in actions {
            if action.session != self.id {
                return Err(ValidationError::WrongSession {
                    expected: self.id,
                    provided: action.session,
                }
                .into());
            }
            if seen.contains(&action.combatant) {
                return Err(ValidationError::DuplicateCombatant(action.combatant).into());
            }
            seen.push(action.combatant);

            let unit = state
                .combatant(CombatantRef::new(side, action.combatant))
                .ok_or(ValidationError::UnknownCombatant(action.combatant))?;
            if !unit.is_alive() {
                return Err(ValidationError::CombatantFainted(action.combatant).into());
            }
            let card = unit.card(action.card).ok_or(ValidationError::UnknownCard {
                combatant: action.combatant,
                card: action.card,
            })?;
            if !unit.can_afford(card) {
                return Err(ValidationError::Unaffordable {
                    card: card.id.clone(),
                    cost: card.cost,
                    available: unit.energy(),
                }
                .into());
            }
        }
        Ok(side)
    }

    /// Resolves one turn from both sides' declarations.
    ///
    /// Runs the engine, updates missed-turn counters, then evaluates in order:
    /// knockout, forfeiture, turn limit. Without a conclusion the turn counter
    /// advances.
    pub fn resolve_turn(
        &mut self,
        rules: &BattleRules,
        home: &Declaration,
        away: &Declaration,
    ) -> Result<TurnReport, SessionError> {
        if self.phase == SessionPhase::Concluded {
            return Err(SessionError::Concluded(self.id));
        }
        self.expect_phase(SessionPhase::Active, "resolve a turn")?;
        let Some(state) = self.state.as_mut() else {
            return Err(self.transition_error("resolve a turn"));
        };

        let turn = state.turn;
        let log = CombatEngine::new(state, rules).run_turn(home.actions(), away.actions());

        for (side, declaration) in [(Side::Home, home), (Side::Away, away)] {
            let side_state = state.side_mut(side);
            if declaration.is_missed() {
                side_state.missed_turns += 1;
            } else {
                side_state.missed_turns = 0;
            }
        }

        let outcome = evaluate(state, rules);
        match &outcome {
            Some(outcome) => {
                self.outcome = Some(outcome.clone());
                self.phase = SessionPhase::Concluded;
            }
            None => state.turn += 1,
        }

        Ok(TurnReport { turn, log, outcome })
    }

    fn expect_phase(
        &self,
        expected: SessionPhase,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.transition_error(operation))
        }
    }

    fn active_state(&self, operation: &'static str) -> Result<&BattleState, SessionError> {
        self.state
            .as_ref()
            .ok_or_else(|| self.transition_error(operation))
    }

    fn transition_error(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            phase: self.phase,
            operation,
        }
    }
}

/// Termination check after a resolved turn.
fn evaluate(state: &BattleState, rules: &BattleRules) -> Option<Outcome> {
    let home_wiped = state.side(Side::Home).is_wiped();
    let away_wiped = state.side(Side::Away).is_wiped();
    match (home_wiped, away_wiped) {
        (true, true) => return Some(Outcome::draw(ConclusionReason::Knockout)),
        (true, false) => {
            return Some(Outcome::victory(state, Side::Away, ConclusionReason::Knockout));
        }
        (false, true) => {
            return Some(Outcome::victory(state, Side::Home, ConclusionReason::Knockout));
        }
        (false, false) => {}
    }

    let limit = rules.forfeit_after_missed_turns;
    if limit > 0 {
        let home_out = state.side(Side::Home).missed_turns >= limit;
        let away_out = state.side(Side::Away).missed_turns >= limit;
        match (home_out, away_out) {
            (true, true) => return Some(Outcome::draw(ConclusionReason::Forfeit)),
            (true, false) => {
                return Some(Outcome::victory(state, Side::Away, ConclusionReason::Forfeit));
            }
            (false, true) => {
                return Some(Outcome::victory(state, Side::Home, ConclusionReason::Forfeit));
            }
            (false, false) => {}
        }
    }

    if rules.max_turns > 0 && state.turn >= rules.max_turns {
        let home = state.side(Side::Home).hp_permille();
        let away = state.side(Side::Away).hp_permille();
        return Some(match home.cmp(&away) {
            core::cmp::Ordering::Greater => {
                Outcome::victory(state, Side::Home, ConclusionReason::TurnLimit)
            }
            core::cmp::Ordering::Less => {
                Outcome::victory(state, Side::Away, ConclusionReason::TurnLimit)
            }
            core::cmp::Ordering::Equal => Outcome::draw(ConclusionReason::TurnLimit),
        });
    }

    None
}
