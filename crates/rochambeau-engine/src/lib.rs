//! Opponent strategies.

use std::collections::VecDeque;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rochambeau_types::{config::OpponentConfig, moves::Move};
use tracing::debug;

pub trait Opponent: Send {
    /// Record the player's committed move for a finished round.
    fn observe(&mut self, mv: Move);
    /// Pick the opponent's move for the round being resolved.
    fn choose(&mut self) -> Move;
}

/// Predicts that the player repeats their most frequent recent move and
/// plays its counter. With no history it plays uniformly at random.
pub struct FrequencyOpponent<R = SmallRng> {
    history: VecDeque<Move>,
    capacity: usize,
    rng: R,
}

impl FrequencyOpponent<SmallRng> {
    pub fn from_config(config: &OpponentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::with_rng(config.memory, rng)
    }
}

impl<R: Rng> FrequencyOpponent<R> {
    pub fn with_rng(capacity: usize, rng: R) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Most frequent move in the window. Ties go to the move whose first
    /// occurrence in the window comes earliest.
    pub fn most_frequent(&self) -> Option<Move> {
        let mut counts: Vec<(Move, usize)> = Vec::with_capacity(Move::ALL.len());
        for mv in &self.history {
            match counts.iter_mut().find(|(seen, _)| seen == mv) {
                Some((_, n)) => *n += 1,
                None => counts.push((*mv, 1)),
            }
        }
        let mut best: Option<(Move, usize)> = None;
        for (mv, n) in counts {
            if best.map_or(true, |(_, top)| n > top) {
                best = Some((mv, n));
            }
        }
        best.map(|(mv, _)| mv)
    }
}

impl<R: Rng + Send> Opponent for FrequencyOpponent<R> {
    fn observe(&mut self, mv: Move) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(mv);
    }

    fn choose(&mut self) -> Move {
        match self.most_frequent() {
            Some(predicted) => {
                let reply = predicted.counter();
                debug!(%predicted, %reply, window = self.history.len(), "opponent prediction");
                reply
            }
            None => {
                let reply = Move::ALL[self.rng.random_range(0..Move::ALL.len())];
                debug!(%reply, "opponent opening at random");
                reply
            }
        }
    }
}
