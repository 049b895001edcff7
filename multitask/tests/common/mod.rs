#![allow(dead_code)]
use std::{cell::Cell, str::FromStr};

use multitask::{
    EncoderConfig, PoolingType,
    encoder::{EncoderError, SentenceEncoder},
};
use ndarray::Array2;
use tokenizers::Tokenizer;

pub const TOKENIZER_JSON: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": {"type": "Lowercase"},
    "pre_tokenizer": {"type": "Whitespace"},
    "post_processor": null,
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {
            "[UNK]": 0,
            "great": 1,
            "product": 2,
            "terrible": 3,
            "service": 4,
            "the": 5,
            "movie": 6,
            "was": 7
        },
        "unk_token": "[UNK]"
    }
}"#;

pub const TOKENIZER_VOCAB_SIZE: usize = 8;

pub fn word_level_tokenizer() -> Tokenizer {
    Tokenizer::from_str(TOKENIZER_JSON).expect("tokenizer fixture")
}

pub fn small_encoder_config(hidden_size: usize) -> EncoderConfig {
    EncoderConfig::new(hidden_size, TOKENIZER_VOCAB_SIZE, PoolingType::Mean, 32)
}

/// Deterministic encoder that counts how often it runs.
pub struct CountingEncoder {
    hidden_size: usize,
    calls: Cell<usize>,
}

impl CountingEncoder {
    pub fn new(hidden_size: usize) -> Self {
        Self {
            hidden_size,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SentenceEncoder for CountingEncoder {
    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn encode(
        &self,
        sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Array2::from_shape_fn((sentences.len(), self.hidden_size), |(row, col)| {
            let seed = sentences[row].bytes().fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
            let mixed = seed.wrapping_mul(col as u32 + 1).wrapping_add(col as u32 * 7919) % 1000;
            mixed as f32 / 500.0 - 1.0
        }))
    }
}

/// Returns one column too few.
pub struct NarrowEncoder;

impl SentenceEncoder for NarrowEncoder {
    fn hidden_size(&self) -> usize {
        8
    }

    fn encode(
        &self,
        sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError> {
        Ok(Array2::zeros((sentences.len(), 7)))
    }
}

pub struct FailingEncoder;

impl SentenceEncoder for FailingEncoder {
    fn hidden_size(&self) -> usize {
        8
    }

    fn encode(
        &self,
        _sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError> {
        Err(EncoderError::Custom("backbone unavailable".to_string()))
    }
}

pub fn assert_all_close(
    actual: &Array2<f32>,
    expected: &Array2<f32>,
) {
    assert_eq!(actual.dim(), expected.dim());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(is_close::is_close!(*a, *e, abs_tol = 1e-5), "{a} != {e}");
    }
}
