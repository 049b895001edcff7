use ndarray::Array2;

use super::EncoderError;
use crate::parameters::{NamedArray, ParameterLoaderError, ParameterTree};

/// Shared backbone turning a batch of sentences into one vector per sentence.
///
/// `encode` must return an array of shape `[sentences.len(), hidden_size()]`
/// with row `i` derived from `sentences[i]`.
pub trait SentenceEncoder {
    fn hidden_size(&self) -> usize;

    fn encode(
        &self,
        sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError>;

    /// Parameters to persist next to the task heads. Keys are absolute.
    fn export_parameters(&self) -> Vec<NamedArray> {
        Vec::new()
    }

    fn load_parameters(
        &mut self,
        _tree: &ParameterTree<'_>,
    ) -> Result<(), ParameterLoaderError> {
        Ok(())
    }
}

impl<E: SentenceEncoder + ?Sized> SentenceEncoder for Box<E> {
    fn hidden_size(&self) -> usize {
        (**self).hidden_size()
    }

    fn encode(
        &self,
        sentences: &[&str],
    ) -> Result<Array2<f32>, EncoderError> {
        (**self).encode(sentences)
    }

    fn export_parameters(&self) -> Vec<NamedArray> {
        (**self).export_parameters()
    }

    fn load_parameters(
        &mut self,
        tree: &ParameterTree<'_>,
    ) -> Result<(), ParameterLoaderError> {
        (**self).load_parameters(tree)
    }
}
