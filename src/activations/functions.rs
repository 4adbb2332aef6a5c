use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// Activation applied element-wise after a dense layer's affine transform.
///
/// Hidden layers use one of the nonlinear variants. The output layer of a
/// Q-network must be [`Activation::Linear`]: action values are unbounded
/// signed scalars, not probabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Sigmoid,
    Tanh,
}

impl Activation {
    /// Apply the activation function to a batch of rows in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => {
                inputs.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Sigmoid => {
                inputs.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::Tanh => {
                inputs.mapv_inplace(|v| v.tanh());
            }
        }
    }

    /// Derivative of the activation, evaluated at the pre-activation values.
    pub fn derivative_batch(&self, pre_activation: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => {
                pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
            }
            Activation::Linear => {
                Array2::ones(pre_activation.dim())
            }
            Activation::Sigmoid => {
                pre_activation.mapv(|v| {
                    let sigmoid = 1.0 / (1.0 + (-v).exp());
                    sigmoid * (1.0 - sigmoid)
                })
            }
            Activation::Tanh => {
                pre_activation.mapv(|v| {
                    let tanh_v = v.tanh();
                    1.0 - tanh_v * tanh_v
                })
            }
        }
    }

    /// Whether the activation squashes its output into a bounded range.
    pub fn is_saturating(&self) -> bool {
        matches!(self, Activation::Sigmoid | Activation::Tanh)
    }
}
