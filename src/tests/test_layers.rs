use ndarray::{arr1, arr2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::layers::DenseLayer;
use crate::activations::Activation;

#[test]
fn test_layer_creation() {
    let layer = DenseLayer::new(3, 2, Activation::Relu);

    assert_eq!(layer.weights.shape(), [3, 2]);
    assert_eq!(layer.biases.shape(), [2]);
    assert_eq!(layer.input_size(), 3);
    assert_eq!(layer.output_size(), 2);
    assert!(layer.biases.iter().all(|&b| b == 0.0));
}

#[test]
fn test_weight_initialization_bounds() {
    let mut rng = StdRng::seed_from_u64(3);
    let layer = DenseLayer::new_with_rng(10, 20, Activation::Relu, &mut rng);
    let limit = (6.0 / 30.0_f32).sqrt();
    for &w in layer.weights.iter() {
        assert!(w >= -limit && w <= limit);
    }
}

#[test]
fn test_seeded_initialization_is_reproducible() {
    let a = DenseLayer::new_with_rng(4, 8, Activation::Tanh, &mut StdRng::seed_from_u64(11));
    let b = DenseLayer::new_with_rng(4, 8, Activation::Tanh, &mut StdRng::seed_from_u64(11));
    assert_eq!(a, b);
}

#[test]
fn test_dense_layer_forward_batch() {
    let layer = DenseLayer::new(2, 2, Activation::Relu)
        .with_weights(arr2(&[[1.0, -1.0], [2.0, 1.0]]))
        .with_biases(arr1(&[0.5, -0.5]));

    let output = layer.forward_batch(arr2(&[[1.0, 1.0], [-1.0, 0.0]]).view());

    // [1+2+0.5, -1+1-0.5] -> relu, [-1+0+0.5, 1+0-0.5] -> relu
    assert_eq!(output, arr2(&[[3.5, 0.0], [0.0, 0.5]]));
}

#[test]
fn test_forward_cached_matches_forward_batch() {
    let layer = DenseLayer::new(3, 4, Activation::Tanh);
    let inputs = arr2(&[[0.1, -0.2, 0.3], [1.0, 0.0, -1.0]]);

    let plain = layer.forward_batch(inputs.view());
    let (cached, _cache) = layer.forward_cached(inputs.view());

    assert_eq!(plain, cached);
}

#[test]
fn test_linear_layer_gradients() {
    let layer = DenseLayer::new(2, 1, Activation::Linear)
        .with_weights(arr2(&[[0.5], [-0.5]]));
    let inputs = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
    let (_, cache) = layer.forward_cached(inputs.view());

    let errors = arr2(&[[1.0], [-1.0]]);
    let (adjusted, weight_gradients, bias_gradients) = layer.backward_batch(&cache, errors.view());

    assert_eq!(adjusted, errors);
    // inputs^T . errors
    assert_eq!(weight_gradients, arr2(&[[-2.0], [-2.0]]));
    assert_eq!(bias_gradients, arr1(&[0.0]));
}
