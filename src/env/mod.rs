//! # Environment Module
//!
//! The contract the control loop drives every tick, and a headless pipe
//! course implementing it.
//!
//! The agent never sees an environment directly: it only receives the state
//! vectors, rewards and done flags the control loop reads from one. Reward
//! shaping is the environment's business.

mod flappy;

pub use flappy::{FlappyConfig, FlappyEnv, Pipe};

use ndarray::Array1;

/// Length of the observation produced by [`FlappyEnv`]: bird height,
/// bird vertical velocity, distance to the next pipe and that pipe's gap
/// centre, each normalised.
pub const STATE_SIZE: usize = 4;

/// Actions accepted by [`FlappyEnv`].
pub const ACTION_COUNT: usize = 2;

/// Do nothing this tick.
pub const NOOP: usize = 0;

/// Give the bird an upward impulse.
pub const FLAP: usize = 1;

/// A single-agent, discrete-action environment advanced one tick at a time.
pub trait Environment {
    /// Length of every vector returned by [`Environment::observe`].
    fn state_size(&self) -> usize;

    /// Number of actions accepted by [`Environment::step`].
    fn action_count(&self) -> usize;

    /// Current normalised observation.
    fn observe(&self) -> Array1<f32>;

    /// Apply `action` and advance the simulation by one tick.
    fn step(&mut self, action: usize);

    /// Reward earned by the last [`Environment::step`].
    fn reward(&self) -> f32;

    /// Whether the last [`Environment::step`] ended the episode.
    fn is_done(&self) -> bool;

    /// Start a new episode.
    fn reset(&mut self);

    /// Obstacles cleared so far in the current episode, if the environment
    /// keeps such a count.
    fn obstacles_passed(&self) -> u64 {
        0
    }
}
