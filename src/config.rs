//! Configuration for the agent, the simulated course and the control loop.
//!
//! Every struct has a `Default` holding the tuned values for the pipe course,
//! and deserializes from JSON with missing fields falling back to those
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::env::FlappyConfig;
use crate::error::{AgentError, Result};
use crate::optimizer::OptimizerKind;
use crate::trainer::TrainerConfig;

/// Hyperparameters of a [`DqnAgent`](crate::agent::DqnAgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Length of every state vector. Fixed for the agent's lifetime.
    pub state_size: usize,
    /// Number of discrete actions.
    pub action_count: usize,
    /// Widths of the hidden layers, input side first.
    pub hidden_layers: Vec<usize>,
    /// Nonlinearity of the hidden layers. The output layer is always linear.
    pub hidden_activation: Activation,
    pub optimizer: OptimizerKind,
    pub learning_rate: f32,
    /// Discount factor applied to the bootstrapped next-state value, in [0, 1).
    pub gamma: f32,
    /// Initial exploration rate.
    pub epsilon: f32,
    /// Floor for the exploration rate.
    pub epsilon_min: f32,
    /// Multiplier applied to epsilon after each successful learning step.
    pub epsilon_decay: f32,
    pub replay_capacity: usize,
    /// Default batch size used by the control loop.
    pub batch_size: usize,
    /// Run a learning step every this many ticks.
    pub learn_every: usize,
    /// Seed for weight init, exploration and sampling. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_size: 4,
            action_count: 2,
            hidden_layers: vec![64, 64, 32],
            hidden_activation: Activation::Relu,
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.001,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            replay_capacity: 50_000,
            batch_size: 32,
            learn_every: 1,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Defaults sized for the given state and action spaces.
    pub fn new(state_size: usize, action_count: usize) -> Self {
        Self {
            state_size,
            action_count,
            ..Default::default()
        }
    }

    /// Full layer list including the input and output sizes.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.state_size);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(self.action_count);
        sizes
    }

    /// Activations matching [`AgentConfig::layer_sizes`], linear on the output.
    pub fn activations(&self) -> Vec<Activation> {
        let mut activations = vec![self.hidden_activation; self.hidden_layers.len()];
        activations.push(Activation::Linear);
        activations
    }

    /// Check every precondition the agent relies on.
    pub fn validate(&self) -> Result<()> {
        if self.state_size == 0 {
            return Err(AgentError::invalid_parameter("state_size", "must be at least 1"));
        }
        if self.action_count == 0 {
            return Err(AgentError::invalid_parameter("action_count", "must be at least 1"));
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(AgentError::invalid_parameter("hidden_layers", "every width must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(AgentError::invalid_parameter("gamma", "must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(AgentError::invalid_parameter("epsilon_min", "must be in [0, 1]"));
        }
        if !(self.epsilon_min..=1.0).contains(&self.epsilon) {
            return Err(AgentError::invalid_parameter("epsilon", "must be in [epsilon_min, 1]"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(AgentError::invalid_parameter("epsilon_decay", "must be in (0, 1]"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AgentError::invalid_parameter("learning_rate", "must be a positive number"));
        }
        if self.replay_capacity == 0 {
            return Err(AgentError::invalid_parameter("replay_capacity", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(AgentError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.batch_size > self.replay_capacity {
            return Err(AgentError::invalid_parameter("batch_size", "cannot exceed replay_capacity"));
        }
        if self.learn_every == 0 {
            return Err(AgentError::invalid_parameter("learn_every", "must be at least 1"));
        }
        Ok(())
    }
}

/// Everything a training run needs, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub agent: AgentConfig,
    pub env: FlappyConfig,
    pub trainer: TrainerConfig,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate each section and their agreement on the state/action spaces.
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.env.validate()?;
        self.trainer.validate()?;
        if self.agent.state_size != crate::env::STATE_SIZE {
            return Err(AgentError::invalid_parameter(
                "agent.state_size".to_string(),
                format!("the course produces states of length {}", crate::env::STATE_SIZE),
            ));
        }
        if self.agent.action_count != crate::env::ACTION_COUNT {
            return Err(AgentError::invalid_parameter(
                "agent.action_count".to_string(),
                format!("the course accepts {} actions", crate::env::ACTION_COUNT),
            ));
        }
        Ok(())
    }
}
