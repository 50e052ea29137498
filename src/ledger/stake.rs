use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::game::Side;
use crate::ids::{Amount, Participant};

/// A single stake as it was placed. Entries are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub participant: Participant,
    pub side: Side,
    pub amount: Amount,
}

/// Ordered record of every stake placed in one round, with running side totals.
///
/// Deserializing replays the entries, so stored totals that disagree with
/// them (or entries that would have been rejected) fail to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredLedger")]
pub struct StakeLedger {
    entries: Vec<StakeEntry>,
    totals: [Amount; 2],
}

#[derive(Deserialize)]
struct StoredLedger {
    entries: Vec<StakeEntry>,
    totals: [Amount; 2],
}

impl TryFrom<StoredLedger> for StakeLedger {
    type Error = String;

    fn try_from(stored: StoredLedger) -> Result<Self, Self::Error> {
        let mut ledger = StakeLedger::new();
        for (i, entry) in stored.entries.into_iter().enumerate() {
            ledger
                .stake(entry.participant, entry.side, entry.amount)
                .map_err(|e| format!("stake entry {i}: {e}"))?;
        }
        if ledger.totals != stored.totals {
            return Err(format!(
                "stored side totals {:?} do not match entries {:?}",
                stored.totals, ledger.totals
            ));
        }
        Ok(ledger)
    }
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stake. Nothing is recorded if the amount is zero or a side
    /// total (or the pool) would overflow.
    pub fn stake(
        &mut self,
        participant: Participant,
        side: Side,
        amount: Amount,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidStake);
        }
        let new_side_total = self.totals[side.index()]
            .checked_add(amount)
            .ok_or(EngineError::StakeOverflow { side, amount })?;
        // The pool must stay representable too, so payouts never overflow.
        self.total_pool()
            .checked_add(amount)
            .ok_or(EngineError::StakeOverflow { side, amount })?;

        self.totals[side.index()] = new_side_total;
        self.entries.push(StakeEntry {
            participant,
            side,
            amount,
        });
        Ok(())
    }

    pub fn side_total(&self, side: Side) -> Amount {
        self.totals[side.index()]
    }

    pub fn total_pool(&self) -> Amount {
        self.totals[0] + self.totals[1]
    }

    pub fn entries(&self) -> &[StakeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of everything `participant` staked on `side`.
    pub fn staked_by(&self, participant: &Participant, side: Side) -> Amount {
        self.entries
            .iter()
            .filter(|e| e.side == side && &e.participant == participant)
            .map(|e| e.amount)
            .sum()
    }
}
