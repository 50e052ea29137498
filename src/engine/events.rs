use serde::{Deserialize, Serialize};

use crate::game::Side;
use crate::ids::{Amount, Balance, MoveId, Participant, RoundId};

/// State changes emitted by the engine.
///
/// Every mutating call returns the notifications it caused, in order, and the
/// same values are broadcast to subscribers. Each carries enough data to
/// follow the engine without querying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    RoundOpened {
        round_id: RoundId,
    },
    StakePlaced {
        round_id: RoundId,
        participant: Participant,
        side: Side,
        amount: Amount,
        side_total: Amount,
    },
    VoteCast {
        round_id: RoundId,
        move_id: MoveId,
        participant: Participant,
        column: usize,
    },
    MoveResolved {
        round_id: RoundId,
        move_id: MoveId,
        column: usize,
        row: usize,
        side: Side,
        terminal: bool,
    },
    GameWon {
        round_id: RoundId,
        move_id: MoveId,
        side: Side,
    },
    GameDrawn {
        round_id: RoundId,
        move_id: MoveId,
    },
    Claimed {
        round_id: RoundId,
        participant: Participant,
        amount: Amount,
    },
}

impl Notification {
    pub fn round_id(&self) -> RoundId {
        match self {
            Notification::RoundOpened { round_id }
            | Notification::StakePlaced { round_id, .. }
            | Notification::VoteCast { round_id, .. }
            | Notification::MoveResolved { round_id, .. }
            | Notification::GameWon { round_id, .. }
            | Notification::GameDrawn { round_id, .. }
            | Notification::Claimed { round_id, .. } => *round_id,
        }
    }

    /// True for `GameWon` and `GameDrawn`.
    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            Notification::GameWon { .. } | Notification::GameDrawn { .. }
        )
    }
}

/// Result of a claim batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// Rounds that paid out, with the amount paid for each.
    pub paid: Vec<(RoundId, Amount)>,
    /// Sum of `paid`.
    pub total: Balance,
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_tagged() {
        let event = Notification::GameDrawn {
            round_id: RoundId(2),
            move_id: MoveId(41),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"GameDrawn","round_id":2,"move_id":41}"#);
        assert!(event.is_game_over());
        assert_eq!(event.round_id(), RoundId(2));
    }
}
