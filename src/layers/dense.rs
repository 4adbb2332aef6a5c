use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;

/// A fully connected (dense) layer in a neural network
///
/// The layer holds parameters only. Activations needed for backpropagation
/// are returned to the caller as a [`LayerCache`] instead of being stored on
/// the layer, so evaluating the network never leaves anything behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Intermediates of one training forward pass through a [`DenseLayer`].
#[derive(Debug)]
pub struct LayerCache {
    inputs: Array2<f32>,
    pre_activation: Array2<f32>,
}

impl DenseLayer {
    /// Create a new dense layer with Glorot-uniform weights and zero biases.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self::new_with_rng(input_size, output_size, activation, &mut rand::thread_rng())
    }

    /// Same as [`DenseLayer::new`] but drawing the weights from `rng`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let bound = (6.0 / (input_size + output_size) as f32).sqrt();
        let weights = Array2::random_using((input_size, output_size), Uniform::new_inclusive(-bound, bound), rng);
        let biases = Array1::zeros(output_size);
        DenseLayer {
            weights,
            biases,
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass for a batch of rows, keeping nothing.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what [`DenseLayer::backward_batch`] needs.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, LayerCache) {
        let pre_activation = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let cache = LayerCache {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, cache)
    }

    /// Gradients of the layer given the error at its output.
    ///
    /// Returns `(adjusted_error, weight_gradients, bias_gradients)`, where
    /// `adjusted_error` is the error after the activation derivative, ready to
    /// be pushed through `weights.t()` to the previous layer.
    pub fn backward_batch(
        &self,
        cache: &LayerCache,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let activation_deriv = self.activation.derivative_batch(cache.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = cache.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        (adjusted_error, weight_gradients, bias_gradients)
    }
}
