mod error;
mod pooled_embedding;
mod sentence_encoder;

pub use error::EncoderError;
pub use pooled_embedding::PooledEmbeddingEncoder;
pub use sentence_encoder::SentenceEncoder;
