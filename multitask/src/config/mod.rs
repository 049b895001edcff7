mod activation;
mod encoder;
mod error;
mod multitask_model;
mod pooling_type;
mod task_head;

pub use activation::Activation;
pub use encoder::{DEFAULT_PRETRAINED_MODEL_NAME, EncoderConfig};
pub use error::ConfigError;
pub use multitask_model::{MultiTaskModelConfig, SENTENCE_CLASSIFICATION_TASK, SENTIMENT_TASK};
pub use pooling_type::PoolingType;
pub use task_head::TaskHeadConfig;
