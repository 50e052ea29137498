//! Identifiers and amounts shared by every layer of the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monetary amount in the smallest currency unit.
pub type Amount = u64;

/// Running total over many rounds or claims, wide enough that adding any
/// number of [`Amount`]s cannot overflow in practice.
pub type Balance = u128;

/// Identifier of a round. Allocated in increasing order by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(pub u64);

impl RoundId {
    pub fn next(self) -> RoundId {
        RoundId(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a move, global across all rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u64);

impl MoveId {
    pub fn next(self) -> MoveId {
        MoveId(self.0 + 1)
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque principal of a participant, as handed to us by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    pub fn new(address: impl Into<String>) -> Self {
        Participant(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Participant {
    fn from(address: &str) -> Self {
        Participant::new(address)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_advance() {
        assert_eq!(RoundId(1).next(), RoundId(2));
        assert_eq!(MoveId(0).next(), MoveId(1));
    }

    #[test]
    fn test_participant_serializes_as_plain_string() {
        let p = Participant::from("0xabc");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"0xabc\"");
        assert_eq!(p.to_string(), "0xabc");
    }
}
