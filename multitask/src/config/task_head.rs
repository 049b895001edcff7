use serde::{Deserialize, Serialize};

use super::{Activation, ConfigError};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TaskHeadConfig {
    pub name: String,
    pub num_classes: usize,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default)]
    pub output_labels: Option<Vec<String>>,
}

impl TaskHeadConfig {
    pub fn new(
        name: impl Into<String>,
        num_classes: usize,
    ) -> Self {
        Self {
            name: name.into(),
            num_classes,
            activation: Activation::default(),
            output_labels: None,
        }
    }

    pub fn with_activation(
        mut self,
        activation: Activation,
    ) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_output_labels(
        mut self,
        output_labels: Vec<String>,
    ) -> Self {
        self.output_labels = Some(output_labels);
        self
    }

    /// Width of the intermediate projection. Integer division: an odd
    /// `hidden_size` rounds down.
    pub fn hidden_dim(hidden_size: usize) -> usize {
        hidden_size / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyTaskName);
        }
        if self.num_classes == 0 {
            return Err(ConfigError::NoClasses(self.name.clone()));
        }
        Ok(())
    }
}
