mod multitask_model;
mod output;
mod stats;

pub use multitask_model::{CONFIG_FILE_NAME, MultiTaskModel, PARAMETERS_FILE_NAME, TOKENIZER_FILE_NAME};
pub use output::{MultiTaskOutput, Prediction, predictions, softmax};
pub use stats::ForwardStats;
