use std::path::PathBuf;

use crate::game::Side;
use crate::ids::RoundId;

/// Errors surfaced by the engine to its callers.
///
/// Every variant is recoverable: a rejected call leaves the engine exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("column {column} is not a valid move")]
    InvalidColumn { column: usize },

    #[error("stake amount must be > 0")]
    InvalidStake,

    #[error("stake of {amount} on side {side} would overflow the pool")]
    StakeOverflow { side: Side, amount: u64 },

    #[error("round {0} is not accepting stakes")]
    RoundNotOpen(RoundId),

    #[error("round {0} is not accepting votes")]
    RoundNotVotable(RoundId),

    #[error("round {requested} is not the current round ({current})")]
    StaleRound { requested: RoundId, current: RoundId },

    #[error("round {0} does not exist")]
    UnknownRound(RoundId),

    #[error("no votes cast for any valid column")]
    NoVotes,

    #[error("nothing to claim")]
    NothingToClaim,
}

/// Errors that stop a crowd simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("round {0} finished but has no outcome")]
    MissingOutcome(RoundId),
}

/// Errors that can occur when a piece is dropped on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} is out of range")]
    InvalidColumn(usize),
}

impl From<BoardError> for EngineError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::ColumnFull(column) => EngineError::ColumnFull { column },
            BoardError::InvalidColumn(column) => EngineError::InvalidColumn { column },
        }
    }
}

/// Errors that can occur while saving or restoring an engine snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot from {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse snapshot from {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("snapshot format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_round_display() {
        let err = EngineError::StaleRound {
            requested: RoundId(3),
            current: RoundId(4),
        };
        assert_eq!(err.to_string(), "round 3 is not the current round (4)");
    }

    #[test]
    fn test_board_error_converts() {
        assert_eq!(
            EngineError::from(BoardError::ColumnFull(2)),
            EngineError::ColumnFull { column: 2 }
        );
        assert_eq!(
            EngineError::from(BoardError::InvalidColumn(9)),
            EngineError::InvalidColumn { column: 9 }
        );
    }

    #[test]
    fn test_stake_overflow_display() {
        let err = EngineError::StakeOverflow {
            side: Side::B,
            amount: 7,
        };
        assert_eq!(err.to_string(), "stake of 7 on side 1 would overflow the pool");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("engine.vote_quorum must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: engine.vote_quorum must be >= 1"
        );
    }
}
