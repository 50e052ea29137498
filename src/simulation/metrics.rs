use crate::game::{GameOutcome, Side};
use crate::ids::{Amount, Balance, RoundId};

/// Result of a single finished round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub round_id: RoundId,
    pub outcome: GameOutcome,
    pub game_length: u32,
    pub pool: Amount,
}

/// Aggregates over every round a simulation finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationMetrics {
    round_results: Vec<RoundResult>,
    total_paid: Balance,
    claims: usize,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_round(&mut self, result: RoundResult) {
        self.round_results.push(result);
    }

    pub fn record_claim(&mut self, amount: Balance) {
        self.total_paid += amount;
        self.claims += 1;
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.round_results
    }

    pub fn rounds_completed(&self) -> usize {
        self.round_results.len()
    }

    pub fn total_paid(&self) -> Balance {
        self.total_paid
    }

    pub fn claims(&self) -> usize {
        self.claims
    }

    /// Share of finished rounds won by `side`.
    pub fn win_rate(&self, side: Side) -> f32 {
        self.rate(|r| r.outcome == GameOutcome::Winner(side))
    }

    pub fn draw_rate(&self) -> f32 {
        self.rate(|r| r.outcome == GameOutcome::Draw)
    }

    /// Average number of moves per finished round.
    pub fn average_game_length(&self) -> f32 {
        let n = self.round_results.len();
        if n == 0 {
            return 0.0;
        }
        let total: u32 = self.round_results.iter().map(|r| r.game_length).sum();
        total as f32 / n as f32
    }

    fn rate(&self, pred: impl Fn(&RoundResult) -> bool) -> f32 {
        let n = self.round_results.len();
        if n == 0 {
            return 0.0;
        }
        let hits = self.round_results.iter().filter(|r| pred(r)).count();
        hits as f32 / n as f32
    }
}
