use serde::{Deserialize, Serialize};

use crate::{
    hand::{Handedness, Landmark},
    moves::{Move, Outcome},
};

/// Coarse phase of the round state machine, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Idle,
    Countdown,
    ResultShown,
}

impl PhaseKind {
    pub fn instruction(self) -> &'static str {
        match self {
            PhaseKind::Idle => "Press 'S' to start  |  'Q' to quit",
            PhaseKind::Countdown => "Hold your gesture at the end",
            PhaseKind::ResultShown => "Press 'D' for the next round  |  'Q' to quit",
        }
    }
}

/// Everything a renderer needs to draw one frame. Carries no game logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudView {
    pub phase: PhaseKind,
    pub round: u32,
    pub player_score: u32,
    pub cpu_score: u32,
    /// 3, 2 or 1 while counting down.
    pub countdown_stage: Option<u8>,
    pub player_move: Option<Move>,
    pub cpu_move: Option<Move>,
    pub outcome: Option<Outcome>,
    /// Gesture recognised in the current frame, if any.
    pub gesture: Option<Move>,
    pub handedness: Option<Handedness>,
    /// Normalized wrist position of the hand in the current frame.
    pub wrist: Option<Landmark>,
    /// Set on the single tick where a round was resolved.
    pub fresh_result: bool,
}

impl HudView {
    pub fn instruction(&self) -> &'static str {
        self.phase.instruction()
    }

    /// Label naming the opponent's committed move, shown in ResultShown only.
    pub fn cpu_label(&self) -> Option<&'static str> {
        match self.phase {
            PhaseKind::ResultShown => self.cpu_move.map(Move::label),
            _ => None,
        }
    }
}

impl Default for HudView {
    fn default() -> Self {
        Self {
            phase: PhaseKind::Idle,
            round: 0,
            player_score: 0,
            cpu_score: 0,
            countdown_stage: None,
            player_move: None,
            cpu_move: None,
            outcome: None,
            gesture: None,
            handedness: None,
            wrist: None,
            fresh_result: false,
        }
    }
}
