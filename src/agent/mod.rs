//! # Reinforcement Learning Agent Module
//!
//! The deep Q-learning agent and the [`QFunction`] seam it learns through.
//!
//! ## Core Concepts
//!
//! - **Q-Learning**: learning the value of each action in a state
//! - **Exploration vs Exploitation**: epsilon-greedy action selection, with
//!   epsilon decayed after every applied fit
//! - **Experience Replay**: transitions are stored and sampled at random to
//!   decorrelate updates
//! - **Bellman target**: `reward` for terminal transitions, otherwise
//!   `reward + gamma * max_a Q(next_state, a)`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use flappy_dqn::agent::DqnAgent;
//! use flappy_dqn::config::AgentConfig;
//! use ndarray::array;
//!
//! let mut agent = DqnAgent::new(AgentConfig::new(4, 2)).unwrap();
//! let state = array![0.5, 0.0, 1.0, 0.5];
//! let action = agent.select_action(state.view()).unwrap();
//! assert!(action < 2);
//! ```

pub mod traits;

mod dqn;
pub use dqn::{argmax, compute_targets, DqnAgent, DqnAgentBuilder, LearnOutcome};
pub use traits::QFunction;
