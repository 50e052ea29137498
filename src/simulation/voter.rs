use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::COLS;

/// How a simulated participant picks the column to vote for.
pub trait VotePolicy {
    /// Pick a column given the round's eligibility vector. `None` means the
    /// voter has nothing left to say.
    fn choose_column(&mut self, valid_moves: &[bool; COLS]) -> Option<usize>;

    /// Return the policy's display name.
    fn name(&self) -> &str;
}

/// Votes uniformly at random among the eligible columns.
#[derive(Debug)]
pub struct RandomVoter {
    rng: StdRng,
}

impl RandomVoter {
    pub fn new() -> Self {
        RandomVoter {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible voter for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        RandomVoter {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomVoter {
    fn default() -> Self {
        Self::new()
    }
}

impl VotePolicy for RandomVoter {
    fn choose_column(&mut self, valid_moves: &[bool; COLS]) -> Option<usize> {
        let eligible: Vec<usize> = (0..COLS).filter(|&col| valid_moves[col]).collect();
        if eligible.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..eligible.len());
        Some(eligible[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}

/// Plays back a fixed list of columns, eligible or not.
#[derive(Debug, Clone, Default)]
pub struct ScriptedVoter {
    columns: VecDeque<usize>,
}

impl ScriptedVoter {
    pub fn new(columns: impl IntoIterator<Item = usize>) -> Self {
        ScriptedVoter {
            columns: columns.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.columns.len()
    }
}

impl VotePolicy for ScriptedVoter {
    fn choose_column(&mut self, _valid_moves: &[bool; COLS]) -> Option<usize> {
        self.columns.pop_front()
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}
