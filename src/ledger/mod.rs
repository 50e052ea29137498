//! Per-round bookkeeping: who staked what on which side, and who voted for
//! which column on the pending move.

mod stake;
mod vote;

pub use stake::{StakeEntry, StakeLedger};
pub use vote::VoteLedger;
