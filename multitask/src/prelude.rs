//! Commonly used types, importable with `use multitask::prelude::*;`.

pub use crate::{
    Error, VERSION,
    config::{
        Activation, EncoderConfig, MultiTaskModelConfig, PoolingType, SENTENCE_CLASSIFICATION_TASK, SENTIMENT_TASK,
        TaskHeadConfig,
    },
    encoder::{EncoderError, PooledEmbeddingEncoder, SentenceEncoder},
    head::{Linear, TaskHead},
    model::{ForwardStats, MultiTaskModel, MultiTaskOutput, Prediction, predictions, softmax},
};
