use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown pretrained model: {0}")]
    UnknownPretrainedModel(String),
    #[error("Hidden size {0} is too small to build a task head")]
    InvalidHiddenSize(usize),
    #[error("Task \"{0}\" must have at least one class")]
    NoClasses(String),
    #[error("Task name must not be empty")]
    EmptyTaskName,
    #[error("Duplicate task name: {0}")]
    DuplicateTask(String),
    #[error("No tasks configured")]
    NoTasks,
    #[error("Unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
