//! The control loop tying an [`Environment`] to a [`DqnAgent`].
//!
//! Each tick: observe, select an action, apply it, read back reward, done
//! flag and next state, hand the transition to the agent, and every
//! `learn_every` ticks run one learning step. The loop never touches the
//! agent's value function itself.

use log::info;
use serde::{Deserialize, Serialize};

use crate::agent::{DqnAgent, LearnOutcome, QFunction};
use crate::env::Environment;
use crate::error::{AgentError, Result};
use crate::metrics::MetricsTracker;
use crate::network::NeuralNetwork;
use crate::replay_buffer::Experience;

/// Settings of the control loop itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Episodes run by [`Trainer::run`] when driven from a config file.
    pub episodes: usize,
    /// An episode is cut off after this many ticks even if not done.
    pub max_ticks_per_episode: usize,
    /// Length of the metrics history kept in memory.
    pub metrics_history: usize,
    /// Log an episode line every this many episodes.
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            max_ticks_per_episode: 10_000,
            metrics_history: 1000,
            log_every: 1,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_ticks_per_episode == 0 {
            return Err(AgentError::invalid_parameter("max_ticks_per_episode", "must be at least 1"));
        }
        if self.log_every == 0 {
            return Err(AgentError::invalid_parameter("log_every", "must be at least 1"));
        }
        Ok(())
    }
}

/// What happened during one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    /// 1-based episode number
    pub episode: usize,
    pub ticks: usize,
    /// Ticks survived (the fatal tick is not counted)
    pub score: usize,
    pub obstacles_passed: u64,
    pub total_reward: f32,
    /// Epsilon at the end of the episode
    pub epsilon: f32,
    /// Mean loss of the fits applied during the episode
    pub mean_loss: Option<f32>,
    /// Whether the episode ended by a terminal transition rather than the tick cap
    pub terminated: bool,
}

/// Aggregate of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub total_ticks: usize,
    pub high_score: usize,
    pub best_obstacles_passed: u64,
    pub final_epsilon: f32,
    pub train_steps: usize,
    pub diverged_fits: usize,
    /// Mean episode reward over the last 100 episodes
    pub recent_mean_reward: Option<f32>,
}

pub struct Trainer<E: Environment, Q: QFunction = NeuralNetwork> {
    agent: DqnAgent<Q>,
    env: E,
    config: TrainerConfig,
    metrics: MetricsTracker,
    episode: usize,
    total_ticks: usize,
    high_score: usize,
    best_obstacles_passed: u64,
}

impl<E: Environment, Q: QFunction> Trainer<E, Q> {
    pub fn new(agent: DqnAgent<Q>, env: E, config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        if env.state_size() != agent.config().state_size {
            return Err(AgentError::dimension_mismatch(
                format!("environment state of length {}", agent.config().state_size),
                format!("{}", env.state_size()),
            ));
        }
        if env.action_count() != agent.config().action_count {
            return Err(AgentError::dimension_mismatch(
                format!("environment with {} actions", agent.config().action_count),
                format!("{}", env.action_count()),
            ));
        }
        let metrics = MetricsTracker::new(config.metrics_history);
        Ok(Trainer {
            agent,
            env,
            config,
            metrics,
            episode: 0,
            total_ticks: 0,
            high_score: 0,
            best_obstacles_passed: 0,
        })
    }

    /// Play one episode from a fresh reset, learning as it goes.
    ///
    /// An error abandons the episode without counting it; the next call
    /// starts a fresh one.
    pub fn run_episode(&mut self) -> Result<EpisodeReport> {
        self.env.reset();
        self.metrics.start_episode();

        let batch_size = self.agent.config().batch_size;
        let learn_every = self.agent.config().learn_every;
        let mut loss_sum = 0.0;
        let mut loss_count = 0usize;
        let mut terminated = false;
        let mut state = self.env.observe();

        for _ in 0..self.config.max_ticks_per_episode {
            let action = self.agent.select_action(state.view())?;
            self.env.step(action);
            let reward = self.env.reward();
            let done = self.env.is_done();
            let next_state = self.env.observe();

            self.agent.record_transition(Experience {
                state,
                action,
                reward,
                next_state: next_state.clone(),
                done,
            })?;
            self.metrics.step(reward);
            self.total_ticks += 1;

            if self.total_ticks % learn_every == 0 {
                match self.agent.learn_step(batch_size)? {
                    LearnOutcome::Trained { loss, .. } => {
                        self.metrics.record_loss(loss);
                        loss_sum += loss;
                        loss_count += 1;
                    }
                    LearnOutcome::Diverged { .. } => self.metrics.record_divergence(),
                    LearnOutcome::Skipped { .. } => {}
                }
            }

            if done {
                terminated = true;
                break;
            }
            state = next_state;
        }

        self.episode += 1;
        let ticks = self.metrics.current_episode_length();
        let score = if terminated { ticks - 1 } else { ticks };
        let obstacles_passed = self.env.obstacles_passed();
        let epsilon = self.agent.epsilon();
        self.metrics.end_episode(epsilon);
        self.high_score = self.high_score.max(score);
        self.best_obstacles_passed = self.best_obstacles_passed.max(obstacles_passed);

        let report = EpisodeReport {
            episode: self.episode,
            ticks,
            score,
            obstacles_passed,
            total_reward: self.metrics.current_episode_reward(),
            epsilon,
            mean_loss: (loss_count > 0).then(|| loss_sum / loss_count as f32),
            terminated,
        };

        if self.episode % self.config.log_every == 0 {
            info!(
                "episode {} score {} (high {}) pipes {} reward {:.1} epsilon {:.3}",
                report.episode, report.score, self.high_score, report.obstacles_passed, report.total_reward, report.epsilon
            );
        }
        Ok(report)
    }

    /// Run `episodes` episodes and summarise the run so far.
    pub fn run(&mut self, episodes: usize) -> Result<TrainingSummary> {
        for _ in 0..episodes {
            self.run_episode()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            episodes: self.episode,
            total_ticks: self.total_ticks,
            high_score: self.high_score,
            best_obstacles_passed: self.best_obstacles_passed,
            final_epsilon: self.agent.epsilon(),
            train_steps: self.agent.train_steps(),
            diverged_fits: self.metrics.diverged_fits(),
            recent_mean_reward: self.metrics.avg_episode_reward(100),
        }
    }

    pub fn agent(&self) -> &DqnAgent<Q> {
        &self.agent
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn high_score(&self) -> usize {
        self.high_score
    }

    /// Give back the agent and environment.
    pub fn into_parts(self) -> (DqnAgent<Q>, E) {
        (self.agent, self.env)
    }
}
