use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three hand shapes. A per-frame gesture is an `Option<Move>`;
/// a committed move is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
        }
    }

    /// The move that defeats this one.
    pub fn counter(self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a round from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWins,
    CpuWins,
    Draw,
}

impl Outcome {
    pub fn of(player: Move, cpu: Move) -> Self {
        if player == cpu {
            Outcome::Draw
        } else if player.beats() == cpu {
            Outcome::PlayerWins
        } else {
            Outcome::CpuWins
        }
    }
}

/// Player commands, mapped from single keys by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    NextRound,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_table() {
        assert_eq!(Outcome::of(Move::Rock, Move::Scissors), Outcome::PlayerWins);
        assert_eq!(Outcome::of(Move::Paper, Move::Rock), Outcome::PlayerWins);
        assert_eq!(Outcome::of(Move::Scissors, Move::Paper), Outcome::PlayerWins);
        assert_eq!(Outcome::of(Move::Rock, Move::Paper), Outcome::CpuWins);
        assert_eq!(Outcome::of(Move::Paper, Move::Scissors), Outcome::CpuWins);
        assert_eq!(Outcome::of(Move::Scissors, Move::Rock), Outcome::CpuWins);
    }

    #[test]
    fn equal_moves_draw() {
        for mv in Move::ALL {
            assert_eq!(Outcome::of(mv, mv), Outcome::Draw);
        }
    }

    #[test]
    fn outcomes_are_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL.into_iter().filter(|b| *b != a) {
                let forward = Outcome::of(a, b);
                let backward = Outcome::of(b, a);
                assert_ne!(forward, Outcome::Draw);
                assert_eq!(
                    forward == Outcome::PlayerWins,
                    backward == Outcome::CpuWins,
                    "{a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn counter_beats_its_move() {
        for mv in Move::ALL {
            assert_eq!(Outcome::of(mv.counter(), mv), Outcome::PlayerWins);
            assert_eq!(mv.counter().beats(), mv);
        }
    }
}
