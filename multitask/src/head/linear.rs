use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;

use crate::{
    Error,
    parameters::{NamedArray, ParameterLoaderError, ParameterTree},
};

#[derive(Debug, thiserror::Error)]
pub enum LinearError {
    #[error("Parameter loading error: {0}")]
    ParameterError(#[from] ParameterLoaderError),
    #[error("Unexpected weights shape: got {got:?}, expected [{expected_output_dim}, {expected_input_dim}]")]
    InvalidWeightsShape {
        got: Box<[usize]>,
        expected_output_dim: usize,
        expected_input_dim: usize,
    },
    #[error("Bias shape mismatch: got {got:?}, expected [{expected_output_dim}]")]
    InvalidBiasShape {
        got: Box<[usize]>,
        expected_output_dim: usize,
    },
}

/// Dense projection `y = x · Wᵀ + b` with weights stored as `[output_dim, input_dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weights: Array2<f32>,
    biases: Array1<f32>,
}

impl Linear {
    pub fn new(
        weights: Array2<f32>,
        biases: Array1<f32>,
    ) -> Result<Self, LinearError> {
        if biases.len() != weights.nrows() {
            return Err(LinearError::InvalidBiasShape {
                got: biases.shape().into(),
                expected_output_dim: weights.nrows(),
            });
        }
        Ok(Self {
            weights,
            biases,
        })
    }

    /// Uniform initialization in `±1/sqrt(input_dim)`.
    pub fn random<R: Rng>(
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Self {
        let bound = 1.0 / (input_dim.max(1) as f32).sqrt();
        let weights = Array2::from_shape_fn((output_dim, input_dim), |_| rng.random_range(-bound..bound));
        let biases = Array1::from_shape_fn(output_dim, |_| rng.random_range(-bound..bound));
        Self {
            weights,
            biases,
        }
    }

    pub fn load(
        tree: &ParameterTree<'_>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self, LinearError> {
        let weights = tree.leaf_matrix("weights")?;
        if weights.dim() != (output_dim, input_dim) {
            return Err(LinearError::InvalidWeightsShape {
                got: weights.shape().into(),
                expected_output_dim: output_dim,
                expected_input_dim: input_dim,
            });
        }
        let biases = tree.leaf_vector("biases")?;
        Self::new(weights, biases)
    }

    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut Array2<f32> {
        &mut self.weights
    }

    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut Array1<f32> {
        &mut self.biases
    }

    pub fn forward(
        &self,
        input: ArrayView2<f32>,
    ) -> Result<Array2<f32>, Error> {
        if input.ncols() != self.input_dim() {
            return Err(Error::ShapeMismatch {
                context: "linear projection".to_string(),
                expected: vec![input.nrows(), self.input_dim()],
                actual: input.shape().to_vec(),
            });
        }
        let mut output = input.dot(&self.weights.t());
        output += &self.biases;
        Ok(output)
    }

    pub fn export_parameters(
        &self,
        prefix: &str,
    ) -> Vec<NamedArray> {
        vec![
            NamedArray::from_array(format!("{prefix}.weights"), &self.weights),
            NamedArray::from_array(format!("{prefix}.biases"), &self.biases),
        ]
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_forward_applies_weights_and_biases() {
        let linear = Linear::new(array![[1.0, 0.0], [1.0, 1.0], [0.0, -2.0]], array![0.5, 0.0, 1.0]).unwrap();
        let output = linear.forward(array![[1.0, 2.0], [0.0, 1.0]].view()).unwrap();
        assert_eq!(output, array![[1.5, 3.0, -3.0], [0.5, 1.0, -1.0]]);
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let linear = Linear::random(4, 2, &mut StdRng::seed_from_u64(0));
        let result = linear.forward(Array2::<f32>::zeros((3, 5)).view());
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch { expected, actual, .. }) if expected == vec![3, 4] && actual == vec![3, 5]
        ));
    }

    #[test]
    fn test_random_shapes_and_bounds() {
        let linear = Linear::random(16, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(linear.weights().dim(), (3, 16));
        assert_eq!(linear.biases().len(), 3);
        assert!(linear.weights().iter().all(|w| w.abs() <= 0.25));
    }

    #[test]
    fn test_new_rejects_bias_mismatch() {
        let result = Linear::new(Array2::zeros((2, 3)), Array1::zeros(3));
        assert!(matches!(result, Err(LinearError::InvalidBiasShape { expected_output_dim: 2, .. })));
    }
}
