use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Linear, apply_activation};
use crate::{
    Error,
    config::{Activation, ConfigError, TaskHeadConfig},
    parameters::{NamedArray, ParameterTree},
};

/// Task-specific projection from the shared representation to class logits:
/// `Linear(H → H/2)`, activation, `Linear(H/2 → num_classes)`.
#[derive(Debug, Clone)]
pub struct TaskHead {
    config: TaskHeadConfig,
    dense: Linear,
    readout: Linear,
}

impl TaskHead {
    pub fn new<R: Rng>(
        config: TaskHeadConfig,
        input_dim: usize,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let hidden_dim = Self::validated_hidden_dim(&config, input_dim)?;
        let dense = Linear::random(input_dim, hidden_dim, rng);
        let readout = Linear::random(hidden_dim, config.num_classes, rng);
        Ok(Self {
            config,
            dense,
            readout,
        })
    }

    pub fn load(
        config: TaskHeadConfig,
        input_dim: usize,
        tree: &ParameterTree<'_>,
    ) -> Result<Self, Error> {
        let hidden_dim = Self::validated_hidden_dim(&config, input_dim)?;
        let dense = Linear::load(&tree.subtree("dense")?, input_dim, hidden_dim)?;
        let readout = Linear::load(&tree.subtree("readout")?, hidden_dim, config.num_classes)?;
        Ok(Self {
            config,
            dense,
            readout,
        })
    }

    pub fn from_parts(
        config: TaskHeadConfig,
        dense: Linear,
        readout: Linear,
    ) -> Result<Self, Error> {
        let hidden_dim = Self::validated_hidden_dim(&config, dense.input_dim())?;
        if dense.output_dim() != hidden_dim || readout.input_dim() != hidden_dim {
            return Err(Error::ShapeMismatch {
                context: format!("task head \"{}\" hidden layer", config.name),
                expected: vec![hidden_dim],
                actual: vec![dense.output_dim(), readout.input_dim()],
            });
        }
        if readout.output_dim() != config.num_classes {
            return Err(Error::ShapeMismatch {
                context: format!("task head \"{}\" readout", config.name),
                expected: vec![config.num_classes],
                actual: vec![readout.output_dim()],
            });
        }
        Ok(Self {
            config,
            dense,
            readout,
        })
    }

    fn validated_hidden_dim(
        config: &TaskHeadConfig,
        input_dim: usize,
    ) -> Result<usize, ConfigError> {
        config.validate()?;
        let hidden_dim = TaskHeadConfig::hidden_dim(input_dim);
        if hidden_dim == 0 {
            return Err(ConfigError::InvalidHiddenSize(input_dim));
        }
        Ok(hidden_dim)
    }

    pub fn forward(
        &self,
        shared: ArrayView2<f32>,
    ) -> Result<Array2<f32>, Error> {
        let mut hidden = self.dense.forward(shared)?;
        apply_activation(&self.config.activation, &mut hidden);
        self.readout.forward(hidden.view())
    }

    pub fn config(&self) -> &TaskHeadConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn input_dim(&self) -> usize {
        self.dense.input_dim()
    }

    pub fn hidden_dim(&self) -> usize {
        self.dense.output_dim()
    }

    pub fn num_classes(&self) -> usize {
        self.readout.output_dim()
    }

    pub fn activation(&self) -> Activation {
        self.config.activation
    }

    pub fn output_labels(&self) -> Option<&[String]> {
        self.config.output_labels.as_deref()
    }

    pub fn dense(&self) -> &Linear {
        &self.dense
    }

    pub fn dense_mut(&mut self) -> &mut Linear {
        &mut self.dense
    }

    pub fn readout(&self) -> &Linear {
        &self.readout
    }

    pub fn readout_mut(&mut self) -> &mut Linear {
        &mut self.readout
    }

    pub fn export_parameters(
        &self,
        prefix: &str,
    ) -> Vec<NamedArray> {
        let mut parameters = self.dense.export_parameters(&format!("{prefix}.dense"));
        parameters.extend(self.readout.export_parameters(&format!("{prefix}.readout")));
        parameters
    }
}
