use ndarray::Array2;

use crate::config::Activation;

const SQRT_2_OVER_PI: f32 = 0.797_884_6;

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Applies `activation` elementwise. GELU uses the tanh approximation.
pub fn apply_activation(
    activation: &Activation,
    values: &mut Array2<f32>,
) {
    match *activation {
        Activation::RELU => values.mapv_inplace(|x| x.max(0.0)),
        Activation::GELU => {
            values.mapv_inplace(|x| 0.5 * x * (1.0 + (SQRT_2_OVER_PI * (x + 0.044_715 * x * x * x)).tanh()))
        },
        Activation::SILU {
            alpha,
        } => values.mapv_inplace(|x| x * sigmoid(alpha * x)),
    }
}
