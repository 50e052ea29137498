use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Board, DropResult, Side, COLS};
use crate::error::EngineError;
use crate::ids::{Amount, Participant, RoundId};
use crate::ledger::{StakeLedger, VoteLedger};
use crate::payout::Payouts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(Side),
    Draw,
}

/// Lifecycle of a round.
///
/// `Open -> InProgress -> {Won, Drawn} -> Closed`. A closed round keeps its
/// outcome and serves claims but accepts neither stakes nor votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Open,
    InProgress,
    Won(Side),
    Drawn,
    Closed,
}

impl RoundStatus {
    pub fn is_active(self) -> bool {
        matches!(self, RoundStatus::Open | RoundStatus::InProgress)
    }
}

/// A single resolved column drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMove {
    pub side: Side,
    pub drop: DropResult,
    pub outcome: Option<GameOutcome>,
}

/// Read-only summary of a round for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub id: RoundId,
    pub status: RoundStatus,
    pub outcome: Option<GameOutcome>,
    pub turn: Side,
    pub side_totals: [Amount; 2],
    pub total_pool: Amount,
    pub moves_played: u32,
    pub column_votes: [u32; COLS],
    pub outstanding_claims: Amount,
}

/// One game: board, ledgers and, once finished, the cached entitlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    id: RoundId,
    board: Board,
    status: RoundStatus,
    turn: Side,
    stakes: StakeLedger,
    votes: VoteLedger,
    outcome: Option<GameOutcome>,
    claims: BTreeMap<Participant, Amount>,
    moves_played: u32,
}

impl Round {
    /// Create an open round. Side A moves first.
    pub fn new(id: RoundId) -> Self {
        Round {
            id,
            board: Board::new(),
            status: RoundStatus::Open,
            turn: Side::A,
            stakes: StakeLedger::new(),
            votes: VoteLedger::new(),
            outcome: None,
            claims: BTreeMap::new(),
            moves_played: 0,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Side whose piece the next resolved move places.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// Eligibility of every column; all false once the round has ended.
    pub fn valid_moves(&self) -> [bool; COLS] {
        if self.status.is_active() {
            self.board.valid_moves()
        } else {
            [false; COLS]
        }
    }

    /// Record a stake. `allow_in_progress` decides whether stakes are still
    /// taken after the first vote.
    pub fn stake(
        &mut self,
        participant: Participant,
        side: Side,
        amount: Amount,
        allow_in_progress: bool,
    ) -> Result<(), EngineError> {
        let accepting = match self.status {
            RoundStatus::Open => true,
            RoundStatus::InProgress => allow_in_progress,
            _ => false,
        };
        if !accepting {
            return Err(EngineError::RoundNotOpen(self.id));
        }
        self.stakes.stake(participant, side, amount)
    }

    /// Record a vote for the pending move. The first vote starts the game.
    pub fn vote(&mut self, participant: Participant, column: usize) -> Result<Option<usize>, EngineError> {
        if !self.status.is_active() {
            return Err(EngineError::RoundNotVotable(self.id));
        }
        if self.board.is_column_full(column) {
            return Err(EngineError::InvalidColumn { column });
        }
        if self.status == RoundStatus::Open {
            self.status = RoundStatus::InProgress;
        }
        Ok(self.votes.cast_vote(participant, column))
    }

    /// Tally the pending votes, drop the winning column for the side to move
    /// and evaluate the result.
    pub fn resolve_move(&mut self) -> Result<ResolvedMove, EngineError> {
        if self.status != RoundStatus::InProgress {
            return Err(EngineError::RoundNotVotable(self.id));
        }
        let valid = self.board.valid_columns();
        // A full board always ends the round, so an in-progress round has room.
        debug_assert!(!valid.is_empty(), "in-progress round {} has a full board", self.id);

        let column = self.votes.resolve(&valid)?;
        let side = self.turn;
        let drop = self.board.drop_piece(column, side)?;
        self.moves_played += 1;

        let outcome = if drop.triggers_win {
            Some(GameOutcome::Winner(side))
        } else if self.board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(GameOutcome::Winner(winner)) => self.status = RoundStatus::Won(winner),
            Some(GameOutcome::Draw) => self.status = RoundStatus::Drawn,
            None => {}
        }
        self.outcome = outcome;
        self.turn = side.other();

        Ok(ResolvedMove {
            side,
            drop,
            outcome,
        })
    }

    /// Cache the computed entitlements and retire the round.
    pub fn close(&mut self, payouts: &Payouts) {
        debug_assert!(self.is_terminal(), "closing round {} before it ended", self.id);
        self.claims = payouts.amounts.clone();
        self.votes.clear();
        self.status = RoundStatus::Closed;
    }

    /// Outstanding entitlement; zero until the round has been closed.
    pub fn claimable(&self, participant: &Participant) -> Amount {
        self.claims.get(participant).copied().unwrap_or(0)
    }

    /// Hand out the outstanding entitlement and zero it.
    pub fn take_claim(&mut self, participant: &Participant) -> Amount {
        self.claims.remove(participant).unwrap_or(0)
    }

    pub fn outstanding_claims(&self) -> Amount {
        self.claims.values().sum()
    }

    pub fn view(&self) -> RoundView {
        RoundView {
            id: self.id,
            status: self.status,
            outcome: self.outcome,
            turn: self.turn,
            side_totals: [self.stakes.side_total(Side::A), self.stakes.side_total(Side::B)],
            total_pool: self.stakes.total_pool(),
            moves_played: self.moves_played,
            column_votes: self.votes.tally(),
            outstanding_claims: self.outstanding_claims(),
        }
    }
}
