use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use super::coordinator::RoundCoordinator;
use super::events::{ClaimReceipt, Notification};
use crate::error::EngineError;
use crate::game::{Board, RoundView, Side, COLS};
use crate::ids::{Amount, MoveId, Participant, RoundId};

/// Cloneable handle to one engine shared between threads.
///
/// Every call holds the engine lock for its whole duration, so stakes, votes
/// (including any resolution and settlement they trigger) and claims are
/// linearized.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<RoundCoordinator>>,
}

impl SharedEngine {
    pub fn new(engine: RoundCoordinator) -> Self {
        SharedEngine {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Operations never leave a half-applied change behind, so a panic in
    /// another holder does not invalidate the state.
    fn lock(&self) -> MutexGuard<'_, RoundCoordinator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut RoundCoordinator) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn current_round_id(&self) -> RoundId {
        self.lock().current_round_id()
    }

    pub fn current_move_id(&self) -> MoveId {
        self.lock().current_move_id()
    }

    pub fn stake(
        &self,
        round_id: RoundId,
        side: Side,
        amount: Amount,
        participant: Participant,
    ) -> Result<Vec<Notification>, EngineError> {
        self.lock().stake(round_id, side, amount, participant)
    }

    pub fn vote(
        &self,
        round_id: RoundId,
        column: usize,
        participant: Participant,
    ) -> Result<Vec<Notification>, EngineError> {
        self.lock().vote(round_id, column, participant)
    }

    pub fn valid_moves(&self, round_id: RoundId) -> Result<[bool; COLS], EngineError> {
        self.lock().valid_moves(round_id)
    }

    pub fn board(&self, round_id: RoundId) -> Result<Board, EngineError> {
        self.lock().board(round_id)
    }

    pub fn round_view(&self, round_id: RoundId) -> Result<RoundView, EngineError> {
        self.lock().round_view(round_id)
    }

    pub fn claimable(&self, round_id: RoundId, participant: &Participant) -> Amount {
        self.lock().claimable(round_id, participant)
    }

    pub fn claim(
        &self,
        participant: &Participant,
        round_ids: &[RoundId],
    ) -> Result<ClaimReceipt, EngineError> {
        self.lock().claim(participant, round_ids)
    }

    pub fn subscribe(&self) -> mpsc::Receiver<Notification> {
        self.lock().subscribe()
    }

    /// Take the engine back out, e.g. to snapshot it. Returns `None` while
    /// other handles are alive.
    pub fn into_inner(self) -> Option<RoundCoordinator> {
        Arc::try_unwrap(self.inner)
            .ok()
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_stakes_are_all_recorded() {
        let engine = SharedEngine::default();
        let round_id = engine.current_round_id();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let side = if i % 2 == 0 { Side::A } else { Side::B };
                        engine
                            .stake(round_id, side, 3, Participant::new(format!("p{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let view = engine.round_view(round_id).unwrap();
        assert_eq!(view.side_totals, [600, 600]);
        assert_eq!(view.total_pool, 1200);
    }

    #[test]
    fn test_concurrent_votes_advance_move_counter_once_each() {
        let engine = SharedEngine::default();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    let mut accepted = 0u64;
                    for _ in 0..5 {
                        let round_id = engine.current_round_id();
                        let column = engine
                            .valid_moves(round_id)
                            .ok()
                            .and_then(|moves| moves.iter().position(|&ok| ok));
                        let Some(column) = column else { continue };
                        if engine
                            .vote(round_id, column, Participant::new(format!("v{i}")))
                            .is_ok()
                        {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();
        let accepted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(engine.current_move_id(), MoveId(accepted));
    }

    #[test]
    fn test_into_inner_requires_unique_handle() {
        let engine = SharedEngine::default();
        let other = engine.clone();
        assert!(engine.into_inner().is_none());
        assert!(other.into_inner().is_some());
    }
}
