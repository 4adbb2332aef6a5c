use ndarray::array;
use crate::optimizer::{Optimizer, OptimizerKind, OptimizerWrapper, SGD, Adam};
use crate::layers::DenseLayer;
use crate::activations::Activation;

#[test]
fn test_sgd_update_weights() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [0.3, 0.4]];

    sgd.update_weights(0, &mut weights, &gradients, 0.5);

    let expected = array![[0.95, 0.9], [0.85, 0.8]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-6);
    }
}

#[test]
fn test_sgd_update_biases() {
    let mut sgd = SGD::new();
    let mut biases = array![1.0, 1.0];
    let gradients = array![0.5, -0.5];

    sgd.update_biases(0, &mut biases, &gradients, 0.5);

    assert!((biases[0] - 0.75).abs() < 1e-6);
    assert!((biases[1] - 1.25).abs() < 1e-6);
}

#[test]
fn test_adam_new() {
    let layers = vec![DenseLayer::new(2, 2, Activation::Relu)];
    let adam = Adam::new(&layers, 0.9, 0.999, 1e-8);

    assert_eq!(adam.beta1, 0.9);
    assert_eq!(adam.beta2, 0.999);
    assert_eq!(adam.epsilon, 1e-8);
    assert_eq!(adam.t, 0);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let layers = vec![DenseLayer::new(2, 2, Activation::Relu)];
    let mut adam = Adam::default(&layers);
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, -0.2], [3.0, -40.0]];

    adam.begin_step();
    adam.update_weights(0, &mut weights, &gradients, 0.01);

    // Bias-corrected first step is lr * g / |g| regardless of scale
    let expected = array![[0.99, 1.01], [0.99, 1.01]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-5, "{} vs {}", w, e);
    }
    assert_eq!(adam.t, 1);
}

#[test]
fn test_adam_keeps_separate_state_per_layer() {
    let layers = vec![
        DenseLayer::new(2, 3, Activation::Relu),
        DenseLayer::new(3, 1, Activation::Linear),
    ];
    let mut adam = Adam::default(&layers);
    let mut first = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
    let mut second = array![[0.0], [0.0], [0.0]];
    let mut first_bias = array![0.0, 0.0, 0.0];
    let mut second_bias = array![0.0];

    adam.begin_step();
    adam.update_weights(0, &mut first, &array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]], 0.1);
    adam.update_biases(0, &mut first_bias, &array![1.0, 1.0, 1.0], 0.1);
    adam.update_weights(1, &mut second, &array![[-1.0], [-1.0], [-1.0]], 0.1);
    adam.update_biases(1, &mut second_bias, &array![-1.0], 0.1);

    assert!(first.iter().all(|&w| (w + 0.1).abs() < 1e-5));
    assert!(second.iter().all(|&w| (w - 0.1).abs() < 1e-5));
    assert!((second_bias[0] - 0.1).abs() < 1e-5);
}

#[test]
fn test_optimizer_kind_builds_matching_wrapper() {
    let layers = vec![DenseLayer::new(4, 2, Activation::Linear)];
    assert!(matches!(OptimizerKind::SGD.build(&layers), OptimizerWrapper::SGD(_)));
    assert!(matches!(OptimizerKind::Adam.build(&layers), OptimizerWrapper::Adam(_)));
    assert_eq!(OptimizerKind::default(), OptimizerKind::Adam);
}
