use std::collections::BTreeMap;
use std::mem;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::events::{ClaimReceipt, Notification};
use crate::error::EngineError;
use crate::game::{Board, GameOutcome, Round, RoundView, Side, COLS};
use crate::ids::{Amount, Balance, MoveId, Participant, RoundId};
use crate::payout::{PayoutCalculator, UnbackedPoolPolicy};

/// Engine policy knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Id given to the very first round.
    pub first_round_id: u64,
    /// Distinct voters needed on the pending move before it is resolved.
    pub vote_quorum: usize,
    /// Keep accepting stakes after the first vote of a round.
    pub stakes_while_in_progress: bool,
    pub unbacked_pool: UnbackedPoolPolicy,
    /// Fail a claim batch that pays nothing instead of returning an empty receipt.
    pub reject_empty_claims: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            first_round_id: 1,
            vote_quorum: 1,
            stakes_while_in_progress: true,
            unbacked_pool: UnbackedPoolPolicy::Retain,
            reject_empty_claims: false,
        }
    }
}

/// Owns the current round, the history of closed rounds and the global
/// round/move counters. All transitions happen inside `&mut self` calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoundCoordinator {
    config: EngineConfig,
    current: Round,
    history: BTreeMap<RoundId, Round>,
    next_move: MoveId,
    treasury: Balance,
    #[serde(skip)]
    subscribers: Vec<mpsc::Sender<Notification>>,
}

impl RoundCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        let first = RoundId(config.first_round_id);
        info!(round_id = %first, "opening first round");
        RoundCoordinator {
            config,
            current: Round::new(first),
            history: BTreeMap::new(),
            next_move: MoveId(0),
            treasury: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_round_id(&self) -> RoundId {
        self.current.id()
    }

    /// Id of the pending move. Increments once per resolved move, across rounds.
    pub fn current_move_id(&self) -> MoveId {
        self.next_move
    }

    pub fn current_round(&self) -> &Round {
        &self.current
    }

    /// Closed rounds in id order.
    pub fn closed_rounds(&self) -> impl Iterator<Item = &Round> {
        self.history.values()
    }

    /// Dust and retained pools kept by the engine.
    pub fn treasury(&self) -> Balance {
        self.treasury
    }

    /// Receive every notification emitted from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn round(&self, round_id: RoundId) -> Result<&Round, EngineError> {
        if round_id == self.current.id() {
            return Ok(&self.current);
        }
        self.history
            .get(&round_id)
            .ok_or(EngineError::UnknownRound(round_id))
    }

    fn ensure_current(&self, round_id: RoundId) -> Result<(), EngineError> {
        let current = self.current.id();
        if round_id != current {
            return Err(EngineError::StaleRound {
                requested: round_id,
                current,
            });
        }
        Ok(())
    }

    /// Place a stake on `side` of the current round.
    pub fn stake(
        &mut self,
        round_id: RoundId,
        side: Side,
        amount: Amount,
        participant: Participant,
    ) -> Result<Vec<Notification>, EngineError> {
        self.ensure_current(round_id)?;
        self.current.stake(
            participant.clone(),
            side,
            amount,
            self.config.stakes_while_in_progress,
        )?;

        let side_total = self.current.stakes().side_total(side);
        debug!(%round_id, %participant, %side, amount, side_total, "stake placed");

        let events = vec![Notification::StakePlaced {
            round_id,
            participant,
            side,
            amount,
            side_total,
        }];
        self.publish(&events);
        Ok(events)
    }

    /// Vote for the next column of the current round.
    ///
    /// Once the quorum of distinct voters is reached the move is resolved,
    /// and a finished game is settled and replaced by a fresh round before
    /// this call returns.
    pub fn vote(
        &mut self,
        round_id: RoundId,
        column: usize,
        participant: Participant,
    ) -> Result<Vec<Notification>, EngineError> {
        self.ensure_current(round_id)?;
        let move_id = self.next_move;
        self.current.vote(participant.clone(), column)?;
        debug!(%round_id, %move_id, %participant, column, "vote cast");

        let mut events = vec![Notification::VoteCast {
            round_id,
            move_id,
            participant,
            column,
        }];

        if self.current.votes().voter_count() >= self.config.vote_quorum {
            self.resolve_pending(&mut events)?;
        }

        self.publish(&events);
        Ok(events)
    }

    fn resolve_pending(&mut self, events: &mut Vec<Notification>) -> Result<(), EngineError> {
        let round_id = self.current.id();
        let move_id = self.next_move;
        let resolved = self.current.resolve_move()?;
        self.next_move = move_id.next();

        debug!(
            %round_id,
            %move_id,
            column = resolved.drop.column,
            row = resolved.drop.row,
            side = %resolved.side,
            "move resolved"
        );
        events.push(Notification::MoveResolved {
            round_id,
            move_id,
            column: resolved.drop.column,
            row: resolved.drop.row,
            side: resolved.side,
            terminal: resolved.outcome.is_some(),
        });

        if let Some(outcome) = resolved.outcome {
            events.push(match outcome {
                GameOutcome::Winner(side) => Notification::GameWon {
                    round_id,
                    move_id,
                    side,
                },
                GameOutcome::Draw => Notification::GameDrawn { round_id, move_id },
            });
            self.settle(outcome, events);
        }
        Ok(())
    }

    /// Compute entitlements, close the finished round and open the next one.
    fn settle(&mut self, outcome: GameOutcome, events: &mut Vec<Notification>) {
        let payouts = PayoutCalculator::new(self.config.unbacked_pool)
            .compute(self.current.stakes(), outcome);
        self.current.close(&payouts);

        let next = Round::new(self.current.id().next());
        let closed = mem::replace(&mut self.current, next);
        self.treasury = self
            .treasury
            .saturating_add(Balance::from(payouts.dust))
            .saturating_add(Balance::from(payouts.retained));
        info!(
            round_id = %closed.id(),
            ?outcome,
            pool = closed.stakes().total_pool(),
            paid = payouts.total_paid(),
            dust = payouts.dust,
            retained = payouts.retained,
            "round closed"
        );
        self.history.insert(closed.id(), closed);

        let opened = self.current.id();
        info!(round_id = %opened, "round opened");
        events.push(Notification::RoundOpened { round_id: opened });
    }

    /// Column eligibility for a round; all false once it has ended.
    pub fn valid_moves(&self, round_id: RoundId) -> Result<[bool; COLS], EngineError> {
        Ok(self.round(round_id)?.valid_moves())
    }

    pub fn board(&self, round_id: RoundId) -> Result<Board, EngineError> {
        Ok(*self.round(round_id)?.board())
    }

    /// Vote counts per column for the pending move of a round.
    pub fn column_votes(&self, round_id: RoundId) -> Result<[u32; COLS], EngineError> {
        Ok(self.round(round_id)?.votes().tally())
    }

    pub fn round_view(&self, round_id: RoundId) -> Result<RoundView, EngineError> {
        Ok(self.round(round_id)?.view())
    }

    /// Outstanding entitlement of `participant` in a finished round, else 0.
    pub fn claimable(&self, round_id: RoundId, participant: &Participant) -> Amount {
        self.history
            .get(&round_id)
            .map_or(0, |round| round.claimable(participant))
    }

    /// Pay out every outstanding entitlement of `participant` in `round_ids`.
    ///
    /// Rounds that are unknown, still running or already claimed contribute
    /// nothing. A batch that pays nothing is an empty receipt, or
    /// `NothingToClaim` when `reject_empty_claims` is set.
    pub fn claim(
        &mut self,
        participant: &Participant,
        round_ids: &[RoundId],
    ) -> Result<ClaimReceipt, EngineError> {
        let anything_owed = round_ids
            .iter()
            .any(|id| self.claimable(*id, participant) > 0);
        if !anything_owed && self.config.reject_empty_claims {
            return Err(EngineError::NothingToClaim);
        }

        let mut receipt = ClaimReceipt::default();
        for &round_id in round_ids {
            let Some(round) = self.history.get_mut(&round_id) else {
                continue;
            };
            let amount = round.take_claim(participant);
            if amount == 0 {
                continue;
            }
            info!(%round_id, %participant, amount, "claimed");
            receipt.paid.push((round_id, amount));
            receipt.total += Balance::from(amount);
            receipt.notifications.push(Notification::Claimed {
                round_id,
                participant: participant.clone(),
                amount,
            });
        }

        self.publish(&receipt.notifications);
        Ok(receipt)
    }

    fn publish(&mut self, events: &[Notification]) {
        if events.is_empty() {
            return;
        }
        // Drop subscribers whose receiver is gone.
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }
}

impl Default for RoundCoordinator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
