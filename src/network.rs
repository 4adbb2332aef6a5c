use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{AgentError, Result};
use crate::layers::{DenseLayer, LayerCache};
use crate::loss::{Loss, MSE};
use crate::optimizer::{Optimizer, OptimizerKind, OptimizerWrapper};

/// Result of a single optimization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    /// Parameters were updated; `loss` is the MSE measured before the update.
    Applied { loss: f32 },
    /// The loss or a gradient was not finite. Parameters and optimizer state
    /// were left exactly as they were.
    Rejected { loss: f32 },
}

impl FitOutcome {
    pub fn loss(&self) -> f32 {
        match self {
            FitOutcome::Applied { loss } | FitOutcome::Rejected { loss } => *loss,
        }
    }
}

/// A feed-forward network of dense layers trained with mean squared error.
///
/// Evaluation (`predict`, `predict_batch`) takes `&self`: every intermediate
/// it produces is a local owned array, dropped before the call returns. Only
/// [`NeuralNetwork::fit`] mutates the parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    layers: Vec<DenseLayer>,
    optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new network with the given layer sizes and one activation per
    /// weight layer (`activations.len() == layer_sizes.len() - 1`).
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerKind,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(AgentError::invalid_parameter(
                "layer_sizes",
                "must contain at least an input and an output size",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(AgentError::invalid_parameter("layer_sizes", "every layer size must be at least 1"));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(AgentError::invalid_parameter(
                "activations".to_string(),
                format!("expected {} activations, got {}", layer_sizes.len() - 1, activations.len()),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new_with_rng(window[0], window[1], activation, &mut *rng))
            .collect::<Vec<_>>();

        Self::from_layers(layers, optimizer)
    }

    /// Build a network from already initialised layers.
    pub fn from_layers(layers: Vec<DenseLayer>, optimizer: OptimizerKind) -> Result<Self> {
        if layers.is_empty() {
            return Err(AgentError::invalid_parameter("layers", "network needs at least one layer"));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(AgentError::dimension_mismatch(
                    format!("layer {} input of {}", i + 1, pair[0].output_size()),
                    format!("{}", pair[1].input_size()),
                ));
            }
        }
        let optimizer = optimizer.build(&layers);
        Ok(NeuralNetwork { layers, optimizer })
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// Evaluate a single input vector.
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.predict_batch(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Evaluate a batch of input rows in one pass.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        AgentError::check_arity(self.input_size(), inputs.ncols())?;
        let mut current = self.layers[0].forward_batch(inputs);
        for layer in &self.layers[1..] {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    /// Run one gradient step over the whole batch towards `targets`.
    ///
    /// The step is all-or-nothing: gradients for every layer are computed and
    /// checked before any parameter is written.
    pub fn fit(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<FitOutcome> {
        AgentError::check_arity(self.input_size(), inputs.ncols())?;
        if targets.dim() != (inputs.nrows(), self.output_size()) {
            return Err(AgentError::dimension_mismatch(
                format!("targets of shape {:?}", (inputs.nrows(), self.output_size())),
                format!("{:?}", targets.dim()),
            ));
        }

        let mut caches: Vec<LayerCache> = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_cached(current.view());
            caches.push(cache);
            current = output;
        }

        let loss = MSE.compute_batch(current.view(), targets);
        let output_errors = MSE.gradient_batch(current.view(), targets);
        let gradients = self.backward(&caches, output_errors);

        let finite = loss.is_finite()
            && gradients
                .iter()
                .all(|(w, b)| w.iter().all(|g| g.is_finite()) && b.iter().all(|g| g.is_finite()));
        if !finite {
            return Ok(FitOutcome::Rejected { loss });
        }

        self.optimizer.begin_step();
        for (index, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
        }
        Ok(FitOutcome::Applied { loss })
    }

    /// Backpropagate `output_errors`; gradients come back in layer order.
    fn backward(&self, caches: &[LayerCache], output_errors: Array2<f32>) -> Vec<(Array2<f32>, Array1<f32>)> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors;

        for i in (0..self.layers.len()).rev() {
            let layer = &self.layers[i];
            let (adjusted_error, weight_gradients, bias_gradients) =
                layer.backward_batch(&caches[i], current_error.view());
            gradients.push((weight_gradients, bias_gradients));
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        gradients
    }

    /// Copy of every weight and bias, layer by layer.
    pub fn parameters(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights.iter().chain(layer.biases.iter()).copied())
            .collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.weights.len() + layer.biases.len()).sum()
    }

    /// Whether any weight or bias is NaN or infinite.
    pub fn has_non_finite_parameters(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| layer.weights.iter().chain(layer.biases.iter()).any(|v| !v.is_finite()))
    }
}
