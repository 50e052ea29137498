use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::metrics::{RoundResult, SimulationMetrics};
use super::voter::VotePolicy;
use crate::engine::{Notification, RoundCoordinator};
use crate::error::SimulationError;
use crate::game::Side;
use crate::ids::{Amount, Balance, Participant, RoundId};

/// A stake placed by participant number `participant` when a round opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningStake {
    pub participant: usize,
    pub side: u8,
    pub amount: Amount,
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub participants: usize,
    pub opening_stakes: Vec<OpeningStake>,
    /// Vote attempts before the simulation stops.
    pub max_votes: usize,
    /// Stop after this many finished rounds; 0 means no limit.
    pub rounds: usize,
    /// Place the opening stakes again on every new round, not only the first.
    pub restake_each_round: bool,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            participants: 20,
            opening_stakes: vec![
                OpeningStake { participant: 0, side: 0, amount: 100_000_000_000_000 },
                OpeningStake { participant: 1, side: 0, amount: 1_000_000_000_000_000 },
                OpeningStake { participant: 2, side: 1, amount: 100_000_000_000_000 },
                OpeningStake { participant: 3, side: 1, amount: 1_000_000_000_000_000 },
            ],
            max_votes: 2000,
            rounds: 0,
            restake_each_round: false,
            seed: None,
        }
    }
}

/// What a simulation run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationReport {
    pub votes_cast: usize,
    pub votes_rejected: usize,
    pub moves_resolved: usize,
    pub total_staked: Balance,
    pub metrics: SimulationMetrics,
}

/// Crowd of participants voting round-robin on whatever round is current,
/// claiming everything they are owed as soon as a game ends.
///
/// Talks to the engine only through its public operations.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    participants: Vec<Participant>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let participants = (0..config.participants)
            .map(|i| Participant::new(format!("participant-{i:02}")))
            .collect();
        Simulation {
            config,
            participants,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn run(
        &self,
        engine: &mut RoundCoordinator,
        voter: &mut dyn VotePolicy,
    ) -> Result<SimulationReport, SimulationError> {
        let mut report = SimulationReport::default();
        if self.participants.is_empty() {
            return Ok(report);
        }

        info!(
            voter = voter.name(),
            participants = self.participants.len(),
            max_votes = self.config.max_votes,
            "starting simulation"
        );
        self.place_opening_stakes(engine, &mut report);

        for i in 0..self.config.max_votes {
            if self.config.rounds > 0 && report.metrics.rounds_completed() >= self.config.rounds {
                break;
            }

            let round_id = engine.current_round_id();
            let valid_moves = engine.valid_moves(round_id)?;
            let Some(column) = voter.choose_column(&valid_moves) else {
                debug!(%round_id, "voter has no column left");
                break;
            };

            let participant = self.participants[i % self.participants.len()].clone();
            let events = match engine.vote(round_id, column, participant) {
                Ok(events) => events,
                Err(err) => {
                    // Rejected votes are skipped, the crowd keeps going.
                    warn!(%round_id, column, error = %err, "vote rejected");
                    report.votes_rejected += 1;
                    continue;
                }
            };
            report.votes_cast += 1;

            for event in &events {
                match event {
                    Notification::MoveResolved { .. } => report.moves_resolved += 1,
                    Notification::GameWon { round_id, .. } | Notification::GameDrawn { round_id, .. } => {
                        self.finish_round(engine, *round_id, &mut report)?;
                    }
                    Notification::RoundOpened { .. } if self.config.restake_each_round => {
                        self.place_opening_stakes(engine, &mut report);
                    }
                    _ => {}
                }
            }
        }

        info!(
            rounds = report.metrics.rounds_completed(),
            votes = report.votes_cast,
            rejected = report.votes_rejected,
            paid = report.metrics.total_paid(),
            "simulation finished"
        );
        Ok(report)
    }

    fn place_opening_stakes(&self, engine: &mut RoundCoordinator, report: &mut SimulationReport) {
        let round_id = engine.current_round_id();
        for stake in &self.config.opening_stakes {
            let (Some(side), Some(participant)) = (
                Side::from_index(stake.side),
                self.participants.get(stake.participant),
            ) else {
                warn!(?stake, "skipping opening stake with unknown side or participant");
                continue;
            };
            match engine.stake(round_id, side, stake.amount, participant.clone()) {
                Ok(_) => report.total_staked += Balance::from(stake.amount),
                Err(err) => warn!(%round_id, %participant, error = %err, "stake rejected"),
            }
        }
    }

    /// Record the finished round and let every participant claim their share.
    fn finish_round(
        &self,
        engine: &mut RoundCoordinator,
        round_id: RoundId,
        report: &mut SimulationReport,
    ) -> Result<(), SimulationError> {
        let view = engine.round_view(round_id)?;
        let outcome = view
            .outcome
            .ok_or(SimulationError::MissingOutcome(round_id))?;
        report.metrics.record_round(RoundResult {
            round_id,
            outcome,
            game_length: view.moves_played,
            pool: view.total_pool,
        });

        for participant in &self.participants {
            if engine.claimable(round_id, participant) == 0 {
                continue;
            }
            let receipt = engine.claim(participant, &[round_id])?;
            report.metrics.record_claim(receipt.total);
        }
        Ok(())
    }
}
