use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::Result;
use crate::network::{FitOutcome, NeuralNetwork};

/// A trainable mapping from a state to one value estimate per action.
///
/// This is the seam between the agent and its function approximator.
/// [`NeuralNetwork`] is the production implementation; tests plug in
/// doubles to observe how the agent drives it.
pub trait QFunction {
    /// Length of the state vectors the function accepts.
    fn input_size(&self) -> usize;

    /// Number of value estimates produced per state.
    fn action_count(&self) -> usize;

    /// Estimates for a single state.
    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// Estimates for a batch of states, one row per state.
    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// One optimization pass over `(states, targets)`. Implementations must
    /// leave their parameters untouched when they return anything other than
    /// `Ok(FitOutcome::Applied { .. })`.
    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>, learning_rate: f32) -> Result<FitOutcome>;

    /// Copy of the current parameters.
    fn parameters(&self) -> Vec<f32>;
}

impl QFunction for NeuralNetwork {
    fn input_size(&self) -> usize {
        NeuralNetwork::input_size(self)
    }

    fn action_count(&self) -> usize {
        self.output_size()
    }

    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        NeuralNetwork::predict(self, state)
    }

    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        NeuralNetwork::predict_batch(self, states)
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>, learning_rate: f32) -> Result<FitOutcome> {
        NeuralNetwork::fit(self, states, targets, learning_rate)
    }

    fn parameters(&self) -> Vec<f32> {
        NeuralNetwork::parameters(self)
    }
}
