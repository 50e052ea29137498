//! # Crowd Connect Four
//!
//! A Connect Four engine played by a crowd. Participants stake on one of two
//! sides of a round, vote on the column the side to move should play, and
//! claim a pro-rata share of the losing side's pool once the game ends.
//!
//! ## Modules
//!
//! - [`game`]: Board, sides, and the round state machine
//! - [`ledger`]: Stake and vote bookkeeping for a round
//! - [`payout`]: Entitlements of a finished round
//! - [`engine`]: Round coordinator, notifications, thread-safe handle
//! - [`snapshot`]: JSON snapshots of the whole engine
//! - [`simulation`]: Crowd simulation harness driving the public API
//! - [`config`]: TOML configuration loading and validation
//! - [`ids`]: Round, move and participant identifiers
//! - [`error`]: Structured error types

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod ids;
pub mod ledger;
pub mod payout;
pub mod simulation;
pub mod snapshot;

pub use engine::{ClaimReceipt, EngineConfig, Notification, RoundCoordinator, SharedEngine};
pub use error::{EngineError, SimulationError};
pub use game::{Board, Cell, GameOutcome, RoundStatus, Side, COLS, ROWS};
pub use ids::{Amount, Balance, MoveId, Participant, RoundId};
