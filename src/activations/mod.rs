//! # Activation Functions Module
//!
//! Element-wise nonlinearities for the dense layers of the Q-network.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Tanh**: hyperbolic tangent, outputs between -1 and 1
//! - **Sigmoid**: `1 / (1 + e^(-x))`, outputs between 0 and 1
//! - **Linear**: identity, required on the output layer
//!
//! ## Usage Example
//!
//! ```rust
//! use flappy_dqn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
