//! Turns a finished round's stakes into per-participant entitlements.
//!
//! # Won rounds
//!
//! `payout(p) = own_win + floor(losing_pool * own_win / total_win)`
//!
//! where `own_win` is everything `p` staked on the winning side. The floor
//! leaves an integer remainder (dust) smaller than the number of winners; the
//! dust is reported separately so the engine can book it to its treasury.
//! For every outcome `sum(amounts) + dust + retained == total_pool`.
//!
//! # Drawn rounds
//!
//! Every staker gets their own stake back. Nothing is redistributed.
//!
//! # Unbacked wins
//!
//! When nobody staked on the winning side, [`UnbackedPoolPolicy`] decides
//! whether the pool is retained or refunded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{GameOutcome, Side};
use crate::ids::{Amount, Participant};
use crate::ledger::StakeLedger;

/// What happens to the pool when the winning side has no stake at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnbackedPoolPolicy {
    /// No payouts; the whole pool goes to the treasury.
    #[default]
    Retain,
    /// Every staker is refunded as if the round were drawn.
    Refund,
}

/// Entitlements computed for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payouts {
    /// Non-zero amounts owed, keyed by participant.
    pub amounts: BTreeMap<Participant, Amount>,
    /// Rounding remainder of the pro-rata split.
    pub dust: Amount,
    /// Pool kept because the winning side was unbacked.
    pub retained: Amount,
}

impl Payouts {
    pub fn total_paid(&self) -> Amount {
        self.amounts.values().sum()
    }

    pub fn amount_for(&self, participant: &Participant) -> Amount {
        self.amounts.get(participant).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayoutCalculator {
    policy: UnbackedPoolPolicy,
}

impl PayoutCalculator {
    pub fn new(policy: UnbackedPoolPolicy) -> Self {
        PayoutCalculator { policy }
    }

    pub fn compute(&self, stakes: &StakeLedger, outcome: GameOutcome) -> Payouts {
        match outcome {
            GameOutcome::Draw => refund_all(stakes),
            GameOutcome::Winner(side) => {
                if stakes.side_total(side) > 0 {
                    split_pool(stakes, side)
                } else {
                    match self.policy {
                        UnbackedPoolPolicy::Retain => Payouts {
                            retained: stakes.total_pool(),
                            ..Payouts::default()
                        },
                        UnbackedPoolPolicy::Refund => refund_all(stakes),
                    }
                }
            }
        }
    }
}

/// Return every staker's total stake.
fn refund_all(stakes: &StakeLedger) -> Payouts {
    let mut amounts: BTreeMap<Participant, Amount> = BTreeMap::new();
    for entry in stakes.entries() {
        *amounts.entry(entry.participant.clone()).or_default() += entry.amount;
    }
    Payouts {
        amounts,
        ..Payouts::default()
    }
}

/// Principal plus a floored pro-rata share of the losing pool.
fn split_pool(stakes: &StakeLedger, winner: Side) -> Payouts {
    let total_win = stakes.side_total(winner) as u128;
    let losing_pool = stakes.side_total(winner.other()) as u128;

    let mut own_win: BTreeMap<Participant, Amount> = BTreeMap::new();
    for entry in stakes.entries().iter().filter(|e| e.side == winner) {
        *own_win.entry(entry.participant.clone()).or_default() += entry.amount;
    }

    // own <= total_win, so every share is bounded by the losing pool and the
    // sum of payouts is bounded by the total pool.
    let amounts: BTreeMap<Participant, Amount> = own_win
        .into_iter()
        .map(|(participant, own)| {
            let share = losing_pool * own as u128 / total_win;
            (participant, own + share as Amount)
        })
        .collect();

    let paid: Amount = amounts.values().sum();
    Payouts {
        amounts,
        dust: stakes.total_pool() - paid,
        retained: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(stakes: &[(&str, Side, Amount)]) -> StakeLedger {
        let mut ledger = StakeLedger::new();
        for &(who, side, amount) in stakes {
            ledger.stake(who.into(), side, amount).unwrap();
        }
        ledger
    }

    #[test]
    fn test_single_winner_takes_losing_pool() {
        let stakes = ledger(&[("a", Side::A, 100), ("b", Side::B, 300)]);
        let payouts = PayoutCalculator::default().compute(&stakes, GameOutcome::Winner(Side::A));

        assert_eq!(payouts.amount_for(&"a".into()), 400);
        assert_eq!(payouts.amount_for(&"b".into()), 0);
        assert_eq!(payouts.total_paid(), stakes.total_pool());
        assert_eq!(payouts.dust, 0);
    }

    #[test]
    fn test_pro_rata_split_with_dust() {
        let stakes = ledger(&[
            ("a", Side::A, 1),
            ("b", Side::A, 1),
            ("c", Side::A, 1),
            ("d", Side::B, 10),
        ]);
        let payouts = PayoutCalculator::default().compute(&stakes, GameOutcome::Winner(Side::A));

        // 10 / 3 = 3 each, 1 left over
        for who in ["a", "b", "c"] {
            assert_eq!(payouts.amount_for(&who.into()), 4);
        }
        assert_eq!(payouts.dust, 1);
        assert_eq!(payouts.total_paid() + payouts.dust, stakes.total_pool());
    }

    #[test]
    fn test_multiple_entries_aggregate_per_participant() {
        let stakes = ledger(&[
            ("a", Side::A, 100),
            ("a", Side::B, 50),
            ("a", Side::A, 100),
            ("b", Side::A, 200),
            ("c", Side::B, 350),
        ]);
        let payouts = PayoutCalculator::default().compute(&stakes, GameOutcome::Winner(Side::A));

        // losing pool 400 split 200:200
        assert_eq!(payouts.amount_for(&"a".into()), 400);
        assert_eq!(payouts.amount_for(&"b".into()), 400);
        assert!(!payouts.amounts.contains_key(&Participant::from("c")));
        assert_eq!(payouts.total_paid(), 800);
    }

    #[test]
    fn test_draw_refunds_every_stake() {
        let stakes = ledger(&[("a", Side::A, 100), ("b", Side::B, 300), ("a", Side::B, 5)]);
        let payouts = PayoutCalculator::default().compute(&stakes, GameOutcome::Draw);

        assert_eq!(payouts.amount_for(&"a".into()), 105);
        assert_eq!(payouts.amount_for(&"b".into()), 300);
        assert_eq!(payouts.dust, 0);
    }

    #[test]
    fn test_unbacked_win_retained() {
        let stakes = ledger(&[("b", Side::B, 300)]);
        let payouts = PayoutCalculator::new(UnbackedPoolPolicy::Retain)
            .compute(&stakes, GameOutcome::Winner(Side::A));

        assert!(payouts.amounts.is_empty());
        assert_eq!(payouts.retained, 300);
    }

    #[test]
    fn test_unbacked_win_refunded() {
        let stakes = ledger(&[("b", Side::B, 300)]);
        let payouts = PayoutCalculator::new(UnbackedPoolPolicy::Refund)
            .compute(&stakes, GameOutcome::Winner(Side::A));

        assert_eq!(payouts.amount_for(&"b".into()), 300);
        assert_eq!(payouts.retained, 0);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let big = Amount::MAX / 2;
        let stakes = ledger(&[("a", Side::A, big), ("b", Side::B, big)]);
        let payouts = PayoutCalculator::default().compute(&stakes, GameOutcome::Winner(Side::B));
        assert_eq!(payouts.amount_for(&"b".into()), big * 2);
    }
}
