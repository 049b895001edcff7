use serde::{Deserialize, Serialize};

use super::{ConfigError, PoolingType};

pub const DEFAULT_PRETRAINED_MODEL_NAME: &str = "bert-base-uncased";

/// Structural description of a sentence encoder. `hidden_size` is the width
/// of every vector the encoder emits.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct EncoderConfig {
    pub hidden_size: usize,
    pub vocab_size: usize,
    #[serde(default)]
    pub pooling: PoolingType,
    pub context_length: usize,
}

impl EncoderConfig {
    pub fn new(
        hidden_size: usize,
        vocab_size: usize,
        pooling: PoolingType,
        context_length: usize,
    ) -> Self {
        Self {
            hidden_size,
            vocab_size,
            pooling,
            context_length,
        }
    }

    /// Looks up the published dimensions of a known checkpoint.
    pub fn pretrained(name: &str) -> Result<Self, ConfigError> {
        let (hidden_size, vocab_size, context_length) = match name {
            "bert-base-uncased" | "distilbert-base-uncased" => (768, 30522, 512),
            "bert-base-cased" => (768, 28996, 512),
            "bert-large-uncased" => (1024, 30522, 512),
            "sentence-transformers/all-MiniLM-L6-v2" => (384, 30522, 256),
            _ => return Err(ConfigError::UnknownPretrainedModel(name.to_string())),
        };
        Ok(Self::new(hidden_size, vocab_size, PoolingType::Mean, context_length))
    }
}
