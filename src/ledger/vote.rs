use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::game::COLS;
use crate::ids::Participant;

/// Votes for the pending move: one active column per participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    votes: BTreeMap<Participant, usize>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote, replacing any earlier vote by the same participant.
    /// Returns the column that was replaced, if any.
    ///
    /// Column validity is the caller's concern; the ledger only stores.
    pub fn cast_vote(&mut self, participant: Participant, column: usize) -> Option<usize> {
        self.votes.insert(participant, column)
    }

    /// Number of distinct participants with an active vote.
    pub fn voter_count(&self) -> usize {
        self.votes.len()
    }

    pub fn vote_of(&self, participant: &Participant) -> Option<usize> {
        self.votes.get(participant).copied()
    }

    /// Per-column vote counts in column order.
    pub fn tally(&self) -> [u32; COLS] {
        let mut counts = [0u32; COLS];
        for &column in self.votes.values() {
            if let Some(slot) = counts.get_mut(column) {
                *slot += 1;
            }
        }
        counts
    }

    /// Pick the winning column among `valid_columns` and clear the ledger.
    ///
    /// The column with the most votes wins; ties go to the lowest column
    /// index. Votes for columns outside `valid_columns` are ignored. On
    /// `NoVotes` the ledger is left untouched.
    pub fn resolve(&mut self, valid_columns: &[usize]) -> Result<usize, EngineError> {
        let counts = self.tally();

        let mut best: Option<(usize, u32)> = None;
        for &column in valid_columns {
            let count = counts.get(column).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            best = match best {
                Some((best_col, best_count))
                    if best_count > count || (best_count == count && best_col < column) =>
                {
                    Some((best_col, best_count))
                }
                _ => Some((column, count)),
            };
        }

        let (column, _) = best.ok_or(EngineError::NoVotes)?;
        self.votes.clear();
        Ok(column)
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
