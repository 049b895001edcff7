use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use super::{ConfigError, DEFAULT_PRETRAINED_MODEL_NAME, EncoderConfig, TaskHeadConfig};

pub const SENTENCE_CLASSIFICATION_TASK: &str = "sentence_classification";
pub const SENTIMENT_TASK: &str = "sentiment";

fn default_pretrained_model_name() -> String {
    DEFAULT_PRETRAINED_MODEL_NAME.to_string()
}

fn default_tasks() -> Vec<TaskHeadConfig> {
    vec![TaskHeadConfig::new(SENTENCE_CLASSIFICATION_TASK, 3), TaskHeadConfig::new(SENTIMENT_TASK, 2)]
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MultiTaskModelConfig {
    #[serde(default = "default_pretrained_model_name")]
    pub pretrained_model_name: String,
    /// Overrides the dimensions looked up from `pretrained_model_name`.
    #[serde(default)]
    pub encoder: Option<EncoderConfig>,
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskHeadConfig>,
    #[serde(default)]
    pub seed: u64,
}

impl Default for MultiTaskModelConfig {
    fn default() -> Self {
        Self {
            pretrained_model_name: default_pretrained_model_name(),
            encoder: None,
            tasks: default_tasks(),
            seed: 0,
        }
    }
}

impl MultiTaskModelConfig {
    /// Sentence classification plus sentiment analysis on top of the named encoder.
    pub fn new(
        pretrained_model_name: impl Into<String>,
        num_classes_task_a: usize,
        num_classes_task_b: usize,
    ) -> Self {
        Self {
            pretrained_model_name: pretrained_model_name.into(),
            encoder: None,
            tasks: vec![
                TaskHeadConfig::new(SENTENCE_CLASSIFICATION_TASK, num_classes_task_a),
                TaskHeadConfig::new(SENTIMENT_TASK, num_classes_task_b),
            ],
            seed: 0,
        }
    }

    pub fn with_encoder(
        mut self,
        encoder: EncoderConfig,
    ) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_tasks(
        mut self,
        tasks: Vec<TaskHeadConfig>,
    ) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_seed(
        mut self,
        seed: u64,
    ) -> Self {
        self.seed = seed;
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(
        &self,
        path: &Path,
    ) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn encoder_config(&self) -> Result<EncoderConfig, ConfigError> {
        match &self.encoder {
            Some(encoder) => Ok(encoder.clone()),
            None => EncoderConfig::pretrained(&self.pretrained_model_name),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks.is_empty() {
            return Err(ConfigError::NoTasks);
        }
        let mut seen = HashSet::new();
        for task in &self.tasks {
            task.validate()?;
            if !seen.insert(task.name.as_str()) {
                return Err(ConfigError::DuplicateTask(task.name.clone()));
            }
        }
        Ok(())
    }
}
