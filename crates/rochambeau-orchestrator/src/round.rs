//! Round state machine.

use std::time::{Duration, Instant};

use rochambeau_engine::Opponent;
use rochambeau_types::{
    clock::Clock,
    config::RoundConfig,
    events::RoundRecord,
    hud::{HudView, PhaseKind},
    moves::{Command, Move, Outcome},
};
use tracing::{debug, info};

/// Player move committed when no gesture was seen during a countdown.
pub const DEFAULT_MOVE: Move = Move::Rock;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Countdown { started_at: Instant },
    ResultShown(RoundRecord),
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Countdown { .. } => PhaseKind::Countdown,
            Phase::ResultShown(_) => PhaseKind::ResultShown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub phase: Phase,
    pub round: u32,
    pub player_score: u32,
    pub cpu_score: u32,
    pub last_valid_gesture: Option<Move>,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            round: 0,
            player_score: 0,
            cpu_score: 0,
            last_valid_gesture: None,
        }
    }

    pub fn committed_player_move(&self) -> Option<Move> {
        match &self.phase {
            Phase::ResultShown(record) => Some(record.player_move),
            _ => None,
        }
    }

    pub fn committed_cpu_move(&self) -> Option<Move> {
        match &self.phase {
            Phase::ResultShown(record) => Some(record.cpu_move),
            _ => None,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Effect of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The command does not apply in the current phase.
    Ignored,
    RoundStarted(u32),
    Quit,
}

/// Owns the match: phase, scores, countdown timing and the opponent.
pub struct RoundEngine<O, C> {
    state: MatchState,
    opponent: O,
    clock: C,
    step: Duration,
    steps: u8,
}

impl<O: Opponent, C: Clock> RoundEngine<O, C> {
    pub fn new(config: &RoundConfig, opponent: O, clock: C) -> Self {
        Self {
            state: MatchState::new(),
            opponent,
            clock,
            step: config.step(),
            steps: config.countdown_steps.max(1),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn opponent(&self) -> &O {
        &self.opponent
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.state.phase.kind()
    }

    fn total(&self) -> Duration {
        self.step * u32::from(self.steps)
    }

    pub fn handle(&mut self, command: Command) -> Transition {
        match (command, self.phase_kind()) {
            (Command::Quit, _) => Transition::Quit,
            (Command::Start, PhaseKind::Idle) | (Command::NextRound, PhaseKind::ResultShown) => {
                self.begin_countdown()
            }
            (command, phase) => {
                debug!(?command, ?phase, "command ignored");
                Transition::Ignored
            }
        }
    }

    fn begin_countdown(&mut self) -> Transition {
        self.state.round += 1;
        self.state.last_valid_gesture = None;
        self.state.phase = Phase::Countdown {
            started_at: self.clock.now(),
        };
        info!(round = self.state.round, "countdown started");
        Transition::RoundStarted(self.state.round)
    }

    /// Feed the gesture seen in the current frame. Runs in every phase;
    /// frames without a gesture keep the previous one.
    pub fn observe_gesture(&mut self, gesture: Option<Move>) {
        if let Some(mv) = gesture {
            self.state.last_valid_gesture = Some(mv);
        }
    }

    /// Advance timing. Returns the record of a round resolved on this tick.
    pub fn tick(&mut self) -> Option<RoundRecord> {
        let Phase::Countdown { started_at } = self.state.phase else {
            return None;
        };
        if self.clock.now().saturating_duration_since(started_at) < self.total() {
            return None;
        }
        Some(self.resolve())
    }

    fn resolve(&mut self) -> RoundRecord {
        let gesture_seen = self.state.last_valid_gesture.is_some();
        let player_move = self.state.last_valid_gesture.unwrap_or(DEFAULT_MOVE);
        // Choose before observing so the prediction never sees this round.
        let cpu_move = self.opponent.choose();
        self.opponent.observe(player_move);

        let outcome = Outcome::of(player_move, cpu_move);
        match outcome {
            Outcome::PlayerWins => self.state.player_score += 1,
            Outcome::CpuWins => self.state.cpu_score += 1,
            Outcome::Draw => {}
        }
        let record = RoundRecord {
            round: self.state.round,
            player_move,
            cpu_move,
            outcome,
            gesture_seen,
            resolved_at: self.clock.wall(),
        };
        info!(
            round = record.round,
            player = %player_move,
            cpu = %cpu_move,
            ?outcome,
            player_score = self.state.player_score,
            cpu_score = self.state.cpu_score,
            "round resolved"
        );
        self.state.phase = Phase::ResultShown(record.clone());
        record
    }

    /// 3, 2, 1 while counting down; purely cosmetic.
    pub fn countdown_stage(&self) -> Option<u8> {
        let Phase::Countdown { started_at } = self.state.phase else {
            return None;
        };
        let elapsed = self.clock.now().saturating_duration_since(started_at);
        let passed = (elapsed.as_nanos() / self.step.as_nanos().max(1))
            .min(u128::from(self.steps - 1));
        Some(self.steps - passed as u8)
    }

    pub fn hud(&self, gesture: Option<Move>) -> HudView {
        let record = match &self.state.phase {
            Phase::ResultShown(record) => Some(record),
            _ => None,
        };
        HudView {
            phase: self.phase_kind(),
            round: self.state.round,
            player_score: self.state.player_score,
            cpu_score: self.state.cpu_score,
            countdown_stage: self.countdown_stage(),
            player_move: record.map(|r| r.player_move),
            cpu_move: record.map(|r| r.cpu_move),
            outcome: record.map(|r| r.outcome),
            gesture,
            handedness: None,
            wrist: None,
            fresh_result: false,
        }
    }
}
