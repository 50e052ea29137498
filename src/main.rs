use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crowd_connect_four::config::AppConfig;
use crowd_connect_four::engine::RoundCoordinator;
use crowd_connect_four::simulation::{RandomVoter, Simulation};
use crowd_connect_four::snapshot;
use crowd_connect_four::Side;

/// Run a crowd of simulated participants against the Connect Four engine.
#[derive(Parser)]
#[command(name = "crowd-connect-four", about = "Simulate a crowd-played Connect Four engine")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of simulated participants
    #[arg(long)]
    participants: Option<usize>,

    /// Override the number of vote attempts
    #[arg(long)]
    max_votes: Option<usize>,

    /// Stop after this many finished rounds
    #[arg(long)]
    rounds: Option<usize>,

    /// Seed for the random voter
    #[arg(long)]
    seed: Option<u64>,

    /// Continue from the snapshot at `snapshot.path`
    #[arg(long)]
    resume: bool,

    /// Write a snapshot to `snapshot.path` when done
    #[arg(long)]
    save: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if cli.print_default_config {
        println!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(participants) = cli.participants {
        config.simulation.participants = participants;
    }
    if let Some(max_votes) = cli.max_votes {
        config.simulation.max_votes = max_votes;
    }
    if let Some(rounds) = cli.rounds {
        config.simulation.rounds = rounds;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    config.validate().context("validating config")?;

    let mut engine = if cli.resume {
        let engine = snapshot::load(&config.snapshot.path)
            .with_context(|| format!("loading snapshot {}", config.snapshot.path.display()))?;
        tracing::info!(
            round_id = %engine.current_round_id(),
            move_id = %engine.current_move_id(),
            "resumed from snapshot"
        );
        engine
    } else {
        RoundCoordinator::new(config.engine.clone())
    };

    let mut voter = match config.simulation.seed {
        Some(seed) => RandomVoter::with_seed(seed),
        None => RandomVoter::new(),
    };
    let simulation = Simulation::new(config.simulation.clone());
    let report = simulation
        .run(&mut engine, &mut voter)
        .context("running simulation")?;

    let metrics = &report.metrics;
    println!("Rounds finished:  {}", metrics.rounds_completed());
    println!(
        "Side 0 wins: {:.1}% | side 1 wins: {:.1}% | draws: {:.1}% | avg moves: {:.1}",
        metrics.win_rate(Side::A) * 100.0,
        metrics.win_rate(Side::B) * 100.0,
        metrics.draw_rate() * 100.0,
        metrics.average_game_length()
    );
    println!(
        "Votes: {} accepted, {} rejected | moves resolved: {}",
        report.votes_cast, report.votes_rejected, report.moves_resolved
    );
    println!(
        "Staked: {} | paid out: {} in {} claims | treasury: {}",
        report.total_staked,
        metrics.total_paid(),
        metrics.claims(),
        engine.treasury()
    );

    let round_id = engine.current_round_id();
    println!("Board of round {round_id} (move {}):", engine.current_move_id());
    println!("{}", engine.board(round_id)?);

    if cli.save || config.snapshot.save_on_exit {
        snapshot::save(&engine, &config.snapshot.path)
            .with_context(|| format!("saving snapshot {}", config.snapshot.path.display()))?;
        println!("Snapshot written to {}", config.snapshot.path.display());
    }

    Ok(())
}
