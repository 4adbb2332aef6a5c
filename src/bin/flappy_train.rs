//! flappy-train - learn to fly through the pipe course with deep Q-learning
//!
//! Runs the headless course with a DQN agent and logs one line per episode.
//! Set `RUST_LOG=debug` to also see every learning step.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::to_writer_pretty;

use flappy_dqn::agent::DqnAgent;
use flappy_dqn::config::RunConfig;
use flappy_dqn::env::FlappyEnv;
use flappy_dqn::trainer::Trainer;

#[derive(Parser)]
#[command(name = "flappy-train")]
#[command(version, about = "Train a DQN agent on the headless pipe course", long_about = None)]
struct Cli {
    /// JSON run configuration (agent, env and trainer sections)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of episodes (overrides the config file)
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Seed for both the agent and the course
    #[arg(long)]
    seed: Option<u64>,

    /// Tick cap per episode (overrides the config file)
    #[arg(long)]
    max_ticks: Option<usize>,

    /// Write the training summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Write the loss/reward/epsilon history as JSON to this path
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(episodes) = cli.episodes {
        config.trainer.episodes = episodes;
    }
    if let Some(max_ticks) = cli.max_ticks {
        config.trainer.max_ticks_per_episode = max_ticks;
    }
    if let Some(seed) = cli.seed {
        config.agent.seed = Some(seed);
        config.env.seed = Some(seed.wrapping_add(1));
    }
    config.validate()?;

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let agent = DqnAgent::new(config.agent.clone())?;
    let env = FlappyEnv::new(config.env.clone())?;
    let mut trainer = Trainer::new(agent, env, config.trainer.clone())?;

    info!(
        "training for {} episodes (replay {}, batch {}, learn every {} ticks)",
        config.trainer.episodes, config.agent.replay_capacity, config.agent.batch_size, config.agent.learn_every
    );
    let summary = trainer.run(config.trainer.episodes)?;
    info!(
        "done: {} episodes, high score {}, best pipes {}, epsilon {:.3}, {} fits ({} diverged)",
        summary.episodes,
        summary.high_score,
        summary.best_obstacles_passed,
        summary.final_epsilon,
        summary.train_steps,
        summary.diverged_fits
    );

    if let Some(path) = &cli.summary {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
    }
    if let Some(path) = &cli.metrics {
        trainer
            .metrics()
            .save(path)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    Ok(())
}
