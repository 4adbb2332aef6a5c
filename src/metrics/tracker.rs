use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

/// Bounded history of training signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Loss of each applied fit
    pub losses: VecDeque<f32>,

    /// Total reward per episode
    pub episode_rewards: VecDeque<f32>,

    /// Ticks per episode
    pub episode_lengths: VecDeque<usize>,

    /// Epsilon at the end of each episode
    pub epsilons: VecDeque<f32>,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        TrainingMetrics {
            losses: VecDeque::with_capacity(history_size),
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
            epsilons: VecDeque::with_capacity(history_size),
        }
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, limit: usize) {
    if limit == 0 {
        return;
    }
    if queue.len() >= limit {
        queue.pop_front();
    }
    queue.push_back(value);
}

/// Tracks metrics during training
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,

    // Episode tracking
    current_episode_reward: f32,
    current_episode_length: usize,
    episode_count: usize,

    // Step tracking
    total_steps: usize,
    diverged_fits: usize,
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::new(history_size),
            history_size,
            current_episode_reward: 0.0,
            current_episode_length: 0,
            episode_count: 0,
            total_steps: 0,
            diverged_fits: 0,
        }
    }

    /// Record the loss of an applied fit
    pub fn record_loss(&mut self, loss: f32) {
        push_bounded(&mut self.metrics.losses, loss, self.history_size);
    }

    /// Count a fit that was rejected as non-finite
    pub fn record_divergence(&mut self) {
        self.diverged_fits += 1;
    }

    /// Start a new episode
    pub fn start_episode(&mut self) {
        self.current_episode_reward = 0.0;
        self.current_episode_length = 0;
    }

    /// Record a step within an episode
    pub fn step(&mut self, reward: f32) {
        self.current_episode_reward += reward;
        self.current_episode_length += 1;
        self.total_steps += 1;
    }

    /// End the current episode
    pub fn end_episode(&mut self, epsilon: f32) {
        push_bounded(&mut self.metrics.episode_rewards, self.current_episode_reward, self.history_size);
        push_bounded(&mut self.metrics.episode_lengths, self.current_episode_length, self.history_size);
        push_bounded(&mut self.metrics.epsilons, epsilon, self.history_size);
        self.episode_count += 1;
    }

    pub fn current_episode_reward(&self) -> f32 {
        self.current_episode_reward
    }

    pub fn current_episode_length(&self) -> usize {
        self.current_episode_length
    }

    /// Get a reference to the metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn diverged_fits(&self) -> usize {
        self.diverged_fits
    }

    /// Mean of the last `window` losses
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        mean_of_last(self.metrics.losses.iter().copied(), self.metrics.losses.len(), window)
    }

    /// Mean of the last `window` episode rewards
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        mean_of_last(
            self.metrics.episode_rewards.iter().copied(),
            self.metrics.episode_rewards.len(),
            window,
        )
    }

    /// Save metrics to file as JSON
    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}

fn mean_of_last<I>(values: I, len: usize, window: usize) -> Option<f32>
where
    I: DoubleEndedIterator<Item = f32>,
{
    let n = window.min(len);
    if n == 0 {
        return None;
    }
    let sum: f32 = values.rev().take(n).sum();
    Some(sum / n as f32)
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
