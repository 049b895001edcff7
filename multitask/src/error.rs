use crate::{
    config::ConfigError,
    encoder::EncoderError,
    head::LinearError,
    parameters::{HeaderLoadingError, ParameterLoaderError, SafetensorsWriteError},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Encoder failed: {0}")]
    Encoder(#[from] EncoderError),
    #[error("Invalid linear layer: {0}")]
    Linear(#[from] LinearError),
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Unknown task: {0}")]
    MissingTask(String),
    #[error("Logits of row {row} are not finite")]
    NonFiniteLogits {
        row: usize,
    },
    #[error("Model folder not found")]
    ModelFolderNotFound,
    #[error("Unable to load tokenizer")]
    UnableToLoadTokenizer,
    #[error("Unable to save tokenizer")]
    UnableToSaveTokenizer,
    #[error("Unable to read parameter header: {0}")]
    ParameterHeader(#[from] HeaderLoadingError),
    #[error("Unable to load parameters: {0}")]
    Parameters(#[from] ParameterLoaderError),
    #[error("Unable to write parameters: {0}")]
    ParameterWrite(#[from] SafetensorsWriteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
