use std::path::Path;

use ndarray::{Array1, Array2};
use rand::Rng;
use tokenizers::{Encoding, Tokenizer};

use super::{EncoderError, SentenceEncoder};
use crate::{
    Error,
    config::{EncoderConfig, PoolingType},
    parameters::{NamedArray, ParameterLoaderError, ParameterTree},
};

const EMBEDDING_WEIGHTS_KEY: &str = "embedding.weights";
const EMBEDDING_INIT_RANGE: f32 = 0.02;

/// Sentence encoder that pools token embeddings into a single vector.
///
/// Tokens beyond `context_length` are dropped. Positions masked out by the
/// tokenizer (padding) are ignored. A sentence without tokens encodes to the
/// zero vector.
pub struct PooledEmbeddingEncoder {
    config: EncoderConfig,
    tokenizer: Tokenizer,
    embeddings: Array2<f32>,
}

impl PooledEmbeddingEncoder {
    pub fn new(
        config: EncoderConfig,
        tokenizer: Tokenizer,
        embeddings: Array2<f32>,
    ) -> Result<Self, EncoderError> {
        if embeddings.dim() != (config.vocab_size, config.hidden_size) {
            return Err(EncoderError::InvalidEmbeddingShape {
                got: embeddings.shape().into(),
                expected_vocab_size: config.vocab_size,
                expected_hidden_size: config.hidden_size,
            });
        }
        Ok(Self {
            config,
            tokenizer,
            embeddings,
        })
    }

    pub fn random<R: Rng>(
        config: EncoderConfig,
        tokenizer: Tokenizer,
        rng: &mut R,
    ) -> Self {
        let embeddings = Array2::from_shape_fn((config.vocab_size, config.hidden_size), |_| {
            rng.random_range(-EMBEDDING_INIT_RANGE..EMBEDDING_INIT_RANGE)
        });
        Self {
            config,
            tokenizer,
            embeddings,
        }
    }

    /// Builds the encoder around the `embedding.weights` stored in `tree`.
    pub fn from_parameters(
        config: EncoderConfig,
        tokenizer: Tokenizer,
        tree: &ParameterTree<'_>,
    ) -> Result<Self, Error> {
        let embeddings = tree.subtree("embedding")?.leaf_matrix("weights")?;
        Ok(Self::new(config, tokenizer, embeddings)?)
    }

    pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, EncoderError> {
        Tokenizer::from_file(path).map_err(|err| EncoderError::Tokenizer(err.to_string()))
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    pub fn embeddings_mut(&mut self) -> &mut Array2<f32> {
        &mut self.embeddings
    }

    fn pool(
        &self,
        encoding: &Encoding,
    ) -> Result<Array1<f32>, EncoderError> {
        let token_ids: Vec<u32> = encoding
            .get_ids()
            .iter()
            .zip(encoding.get_attention_mask())
            .filter(|(_, mask)| **mask != 0)
            .map(|(id, _)| *id)
            .take(self.config.context_length)
            .collect();

        let mut pooled = Array1::<f32>::zeros(self.config.hidden_size);
        let selected = match self.config.pooling {
            PoolingType::Cls => &token_ids[..token_ids.len().min(1)],
            PoolingType::Mean => &token_ids[..],
        };
        for &token_id in selected {
            if token_id as usize >= self.config.vocab_size {
                return Err(EncoderError::TokenOutOfRange {
                    token_id,
                    vocab_size: self.config.vocab_size,
                });
            }
            pooled += &self.embeddings.row(token_id as usize);
        }
        if selected.len() > 1 {
            pooled /= selected.len() as f32;
        }
        Ok(pooled)
    }
}

impl SentenceEncoder for PooledEmbeddingEncoder {
    fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    fn encode(
        &self,
        sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError> {
        let encodings =
            self.tokenizer.encode_batch(sentences.to_vec(), true).map_err(|err| EncoderError::Tokenizer(err.to_string()))?;

        let mut output = Array2::<f32>::zeros((sentences.len(), self.config.hidden_size));
        for (mut row, encoding) in output.rows_mut().into_iter().zip(&encodings) {
            row.assign(&self.pool(encoding)?);
        }
        Ok(output)
    }

    fn export_parameters(&self) -> Vec<NamedArray> {
        vec![NamedArray::from_array(EMBEDDING_WEIGHTS_KEY, &self.embeddings)]
    }

    fn load_parameters(
        &mut self,
        tree: &ParameterTree<'_>,
    ) -> Result<(), ParameterLoaderError> {
        let embeddings = tree.subtree("embedding")?.leaf_matrix("weights")?;
        let expected = [self.config.vocab_size, self.config.hidden_size];
        if embeddings.shape() != expected {
            return Err(ParameterLoaderError::UnexpectedShape {
                key: EMBEDDING_WEIGHTS_KEY.to_string(),
                got: embeddings.shape().into(),
                expected: expected.into(),
            });
        }
        self.embeddings = embeddings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ndarray::array;

    use super::*;

    fn tokenizer() -> Tokenizer {
        let json = r#"{
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
                "vocab": {"[UNK]": 0, "good": 1, "bad": 2, "movie": 3},
                "unk_token": "[UNK]"
            }
        }"#;
        Tokenizer::from_str(json).unwrap()
    }

    fn encoder(
        pooling: PoolingType,
        context_length: usize,
    ) -> PooledEmbeddingEncoder {
        let embeddings = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [2.0, 2.0]];
        PooledEmbeddingEncoder::new(EncoderConfig::new(2, 4, pooling, context_length), tokenizer(), embeddings)
            .unwrap()
    }

    #[test]
    fn test_mean_pooling() {
        let output = encoder(PoolingType::Mean, 16).encode(&["good movie", "Bad"]).unwrap();
        assert_eq!(output, array![[1.5, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_cls_pooling_takes_first_token() {
        let output = encoder(PoolingType::Cls, 16).encode(&["movie good"]).unwrap();
        assert_eq!(output, array![[2.0, 2.0]]);
    }

    #[test]
    fn test_context_length_truncates() {
        let output = encoder(PoolingType::Mean, 1).encode(&["good movie"]).unwrap();
        assert_eq!(output, array![[1.0, 0.0]]);
    }

    #[test]
    fn test_empty_sentence_is_zero_vector() {
        let output = encoder(PoolingType::Mean, 16).encode(&[""]).unwrap();
        assert_eq!(output, array![[0.0, 0.0]]);
    }

    #[test]
    fn test_rejects_mismatched_embeddings() {
        let result =
            PooledEmbeddingEncoder::new(EncoderConfig::new(3, 4, PoolingType::Mean, 8), tokenizer(), Array2::zeros((4, 2)));
        assert!(matches!(result, Err(EncoderError::InvalidEmbeddingShape { .. })));
    }

    #[test]
    fn test_token_out_of_range() {
        let embeddings = array![[0.0, 0.0], [1.0, 0.0]];
        let encoder =
            PooledEmbeddingEncoder::new(EncoderConfig::new(2, 2, PoolingType::Mean, 8), tokenizer(), embeddings).unwrap();
        assert!(matches!(
            encoder.encode(&["movie"]),
            Err(EncoderError::TokenOutOfRange {
                token_id: 3,
                vocab_size: 2
            })
        ));
    }
}
