use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("Unable to encode text: {0}")]
    Tokenizer(String),
    #[error("Token id {token_id} is outside the vocabulary of size {vocab_size}")]
    TokenOutOfRange {
        token_id: u32,
        vocab_size: usize,
    },
    #[error("Embedding table has shape {got:?}, expected [{expected_vocab_size}, {expected_hidden_size}]")]
    InvalidEmbeddingShape {
        got: Box<[usize]>,
        expected_vocab_size: usize,
        expected_hidden_size: usize,
    },
    #[error("{0}")]
    Custom(String),
}
