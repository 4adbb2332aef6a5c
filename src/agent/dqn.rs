use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::traits::QFunction;
use crate::activations::Activation;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::network::{FitOutcome, NeuralNetwork};
use crate::optimizer::OptimizerKind;
use crate::replay_buffer::{Experience, ReplayBuffer};

/// What a call to [`DqnAgent::learn_step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LearnOutcome {
    /// The replay memory held fewer experiences than requested. Nothing changed.
    Skipped { available: usize, required: usize },
    /// One fit was applied and epsilon decayed to `epsilon`.
    Trained { loss: f32, epsilon: f32 },
    /// The fit produced a non-finite loss or gradient and was rejected.
    /// Parameters and epsilon are unchanged.
    Diverged { loss: f32 },
}

impl LearnOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, LearnOutcome::Trained { .. })
    }

    pub fn loss(&self) -> Option<f32> {
        match self {
            LearnOutcome::Skipped { .. } => None,
            LearnOutcome::Trained { loss, .. } | LearnOutcome::Diverged { loss } => Some(*loss),
        }
    }
}

/// Deep Q-Network agent with experience replay and epsilon-greedy exploration.
///
/// The agent owns its value function, its replay memory and its random number
/// generator. The value function is only reachable through
/// [`DqnAgent::select_action`] and [`DqnAgent::learn_step`] (plus read-only
/// inspection), and every method that touches it takes `&mut self`, so a
/// fit can never overlap an evaluation.
///
/// There is no target network: bootstrapped targets are computed with the
/// same parameters that are being updated. This makes the regression target
/// move with every step and can destabilise training; it is a known
/// limitation of this agent.
///
/// # Example
///
/// ```rust
/// use flappy_dqn::agent::{DqnAgentBuilder, LearnOutcome};
/// use flappy_dqn::replay_buffer::Experience;
/// use ndarray::array;
///
/// let mut agent = DqnAgentBuilder::new()
///     .state_size(4)
///     .action_count(2)
///     .hidden_layers(&[24, 24])
///     .replay_capacity(100)
///     .batch_size(2)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let state = array![0.5, 0.0, 1.0, 0.5];
/// let action = agent.select_action(state.view()).unwrap();
/// agent
///     .record_transition(Experience {
///         state: state.clone(),
///         action,
///         reward: 0.1,
///         next_state: array![0.51, 0.01, 0.99, 0.5],
///         done: false,
///     })
///     .unwrap();
///
/// // Not enough data yet
/// assert!(matches!(agent.learn_step(2).unwrap(), LearnOutcome::Skipped { .. }));
/// ```
pub struct DqnAgent<Q: QFunction = NeuralNetwork> {
    config: AgentConfig,
    q_network: Q,
    memory: ReplayBuffer,
    epsilon: f32,
    train_steps: usize,
    rng: StdRng,
}

impl DqnAgent<NeuralNetwork> {
    /// Create an agent with a freshly initialised network built from `config`.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let q_network = NeuralNetwork::new(
            &config.layer_sizes(),
            &config.activations(),
            config.optimizer,
            &mut rng,
        )?;
        Self::assemble(config, q_network, rng)
    }
}

impl<Q: QFunction> DqnAgent<Q> {
    /// Create an agent around an existing value function.
    pub fn with_q_function(config: AgentConfig, q_function: Q) -> Result<Self> {
        config.validate()?;
        let rng = seeded_rng(config.seed);
        Self::assemble(config, q_function, rng)
    }

    fn assemble(config: AgentConfig, q_network: Q, rng: StdRng) -> Result<Self> {
        if q_network.input_size() != config.state_size {
            return Err(AgentError::dimension_mismatch(
                format!("value function input of {}", config.state_size),
                format!("{}", q_network.input_size()),
            ));
        }
        if q_network.action_count() != config.action_count {
            return Err(AgentError::dimension_mismatch(
                format!("value function output of {}", config.action_count),
                format!("{}", q_network.action_count()),
            ));
        }
        let memory = ReplayBuffer::new(config.replay_capacity)?;
        Ok(DqnAgent {
            epsilon: config.epsilon,
            config,
            q_network,
            memory,
            train_steps: 0,
            rng,
        })
    }

    /// Select an action using the epsilon-greedy policy.
    ///
    /// With probability `epsilon` a uniformly random action is returned and
    /// the value function is not consulted at all. Otherwise the action with
    /// the highest estimate wins, ties going to the lowest index.
    pub fn select_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        AgentError::check_arity(self.config.state_size, state.len())?;

        // gen() can return exactly 0.0, so a zero epsilon must never explore
        if self.epsilon > 0.0 && self.rng.gen::<f32>() <= self.epsilon {
            // Exploration: random action
            Ok(self.rng.gen_range(0..self.config.action_count))
        } else {
            // Exploitation: best action from the value function
            let q_values = self.q_network.predict(state)?;
            Ok(argmax(q_values.view()))
        }
    }

    /// Current value estimates for `state`.
    pub fn q_values(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        AgentError::check_arity(self.config.state_size, state.len())?;
        self.q_network.predict(state)
    }

    /// Store one transition in the replay memory, evicting the oldest
    /// experience when the memory is full.
    pub fn record_transition(&mut self, experience: Experience) -> Result<()> {
        AgentError::check_arity(self.config.state_size, experience.state.len())?;
        AgentError::check_arity(self.config.state_size, experience.next_state.len())?;
        if experience.action >= self.config.action_count {
            return Err(AgentError::InvalidAction {
                action: experience.action,
                action_count: self.config.action_count,
            });
        }
        self.memory.add(experience);
        Ok(())
    }

    /// Sample `batch_size` experiences and fit the value function once
    /// towards their Bellman targets.
    ///
    /// A memory holding fewer than `batch_size` experiences makes this a
    /// no-op. Epsilon decays only after a fit that was actually applied.
    pub fn learn_step(&mut self, batch_size: usize) -> Result<LearnOutcome> {
        if batch_size == 0 {
            return Err(AgentError::invalid_parameter("batch_size", "must be at least 1"));
        }
        let available = self.memory.len();
        if available < batch_size {
            return Ok(LearnOutcome::Skipped { available, required: batch_size });
        }

        let batch = self.memory.sample(batch_size, &mut self.rng);
        let state_size = self.config.state_size;

        // Stack experiences into batches
        let mut states = Array2::zeros((batch.len(), state_size));
        let mut next_states = Array2::zeros((batch.len(), state_size));
        for (i, exp) in batch.iter().enumerate() {
            states.row_mut(i).assign(&exp.state);
            next_states.row_mut(i).assign(&exp.next_state);
        }

        let current_q_values = self.q_network.predict_batch(states.view())?;
        let next_q_values = self.q_network.predict_batch(next_states.view())?;
        let targets = compute_targets(&batch, current_q_values, next_q_values.view(), self.config.gamma);

        match self.q_network.fit(states.view(), targets.view(), self.config.learning_rate)? {
            FitOutcome::Applied { loss } => {
                self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
                self.train_steps += 1;
                debug!(
                    "learn step {}: loss {:.6}, epsilon {:.4}",
                    self.train_steps, loss, self.epsilon
                );
                Ok(LearnOutcome::Trained { loss, epsilon: self.epsilon })
            }
            FitOutcome::Rejected { loss } => {
                warn!("rejected fit after {} steps: loss {}", self.train_steps, loss);
                Ok(LearnOutcome::Diverged { loss })
            }
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override the exploration rate, clamped into [0, 1].
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Read-only view of the replay memory.
    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    /// Number of fits applied so far.
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    /// Copy of the value function's parameters, for diagnostics.
    pub fn parameter_snapshot(&self) -> Vec<f32> {
        self.q_network.parameters()
    }
}

/// Build the regression targets for a sampled batch.
///
/// Row `i` starts as `current[i]`; only the column of the action taken is
/// replaced, by `reward` for terminal transitions and by
/// `reward + gamma * max(next[i])` otherwise. Untaken actions therefore
/// contribute no error to the fit.
pub fn compute_targets(
    experiences: &[&Experience],
    current: Array2<f32>,
    next: ArrayView2<f32>,
    gamma: f32,
) -> Array2<f32> {
    let mut targets = current;
    for (i, exp) in experiences.iter().enumerate() {
        let target = if exp.done {
            exp.reward
        } else {
            let max_next_q = next.row(i).iter().fold(f32::NEG_INFINITY, |max, &val| max.max(val));
            exp.reward + gamma * max_next_q
        };
        targets[[i, exp.action]] = target;
    }
    targets
}

/// Index of the largest value, first index on ties. NaN never wins.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best_index = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &value) in values.iter().enumerate() {
        if value > best_value {
            best_index = i;
            best_value = value;
        }
    }
    best_index
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Builder pattern for DqnAgent
pub struct DqnAgentBuilder {
    config: AgentConfig,
}

impl DqnAgentBuilder {
    pub fn new() -> Self {
        DqnAgentBuilder {
            config: AgentConfig::default(),
        }
    }

    pub fn from_config(config: AgentConfig) -> Self {
        DqnAgentBuilder { config }
    }

    pub fn state_size(mut self, size: usize) -> Self {
        self.config.state_size = size;
        self
    }

    pub fn action_count(mut self, count: usize) -> Self {
        self.config.action_count = count;
        self
    }

    pub fn hidden_layers(mut self, widths: &[usize]) -> Self {
        self.config.hidden_layers = widths.to_vec();
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.config.hidden_activation = activation;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.config.optimizer = optimizer;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    pub fn epsilon_min(mut self, epsilon_min: f32) -> Self {
        self.config.epsilon_min = epsilon_min;
        self
    }

    pub fn epsilon_decay(mut self, decay: f32) -> Self {
        self.config.epsilon_decay = decay;
        self
    }

    pub fn replay_capacity(mut self, capacity: usize) -> Self {
        self.config.replay_capacity = capacity;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn learn_every(mut self, ticks: usize) -> Self {
        self.config.learn_every = ticks;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DqnAgent> {
        DqnAgent::new(self.config)
    }

    /// Build around a caller-supplied value function.
    pub fn build_with<Q: QFunction>(self, q_function: Q) -> Result<DqnAgent<Q>> {
        DqnAgent::with_q_function(self.config, q_function)
    }
}

impl Default for DqnAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
