//! # flappy_dqn - Deep Q-Learning for a Scrolling Pipe Course
//!
//! An online reinforcement-learning loop that learns when to flap. A DQN
//! agent observes a small normalised state vector each tick, picks flap or
//! no-flap with an epsilon-greedy policy, stores the transition in a bounded
//! replay memory and periodically fits its Q-network towards one-step
//! Bellman targets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flappy_dqn::agent::DqnAgent;
//! use flappy_dqn::config::RunConfig;
//! use flappy_dqn::env::FlappyEnv;
//! use flappy_dqn::trainer::Trainer;
//!
//! let config = RunConfig::default();
//! let agent = DqnAgent::new(config.agent.clone()).unwrap();
//! let env = FlappyEnv::new(config.env.clone()).unwrap();
//! let mut trainer = Trainer::new(agent, env, config.trainer.clone()).unwrap();
//! let summary = trainer.run(10).unwrap();
//! println!("high score: {}", summary.high_score);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, Sigmoid, Linear)
//! - [`agent`] - The DQN agent and the value-function trait it learns through
//! - [`config`] - Serde configuration for agent, course and control loop
//! - [`env`] - Environment contract and the headless pipe course
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Feed-forward Q-network
//! - [`optimizer`] - SGD and Adam
//! - [`replay_buffer`] - Experience replay
//! - [`trainer`] - The control loop

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
