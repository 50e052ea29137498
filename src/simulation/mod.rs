//! Crowd simulation harness: voters that pick columns from the eligibility
//! vector, a driver that replays a crowd of stakers and voters against an
//! engine, and the metrics it collects. Randomness lives here, never in the
//! engine.

mod driver;
mod metrics;
mod voter;

pub use driver::{OpeningStake, Simulation, SimulationConfig, SimulationReport};
pub use metrics::{RoundResult, SimulationMetrics};
pub use voter::{RandomVoter, ScriptedVoter, VotePolicy};
