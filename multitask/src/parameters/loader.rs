use std::{
    collections::{HashMap, hash_map::Keys},
    fs::File,
    os::unix::fs::FileExt,
};

use ndarray::{Array1, Array2, ArrayD, Ix1, Ix2, IxDyn};
use thiserror::Error;

use super::safetensors_metadata::{Dtype, HashMetadata, HeaderLoadingError, read_metadata};
use crate::DataType;

pub struct ParameterMetadata {
    shape: Box<[usize]>,
    dtype: Dtype,
    offset: usize,
    size: usize,
}

fn metadata_into_index(
    global_offset: usize,
    metadata: HashMetadata,
) -> HashMap<String, ParameterMetadata> {
    metadata
        .tensors
        .into_iter()
        .map(|(key, value)| {
            let (local_begin, local_end) = value.data_offsets;
            let parameter_metadata = ParameterMetadata {
                shape: value.shape.into(),
                dtype: value.dtype,
                offset: global_offset + local_begin,
                size: local_end.saturating_sub(local_begin),
            };
            (key, parameter_metadata)
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ParameterLoaderError {
    #[error("Array with key \"{0}\" not found.")]
    KeyNotFound(String),
    #[error("Couldn't find any arrays with prefix \"{0}\".")]
    SubtreeNotFound(String),
    #[error("Array \"{key}\" has unsupported dtype {dtype:?}.")]
    UnsupportedDataType {
        key: String,
        dtype: Dtype,
    },
    #[error(
        "Size mismatch: array of shape {shape:?} and data type \
        {data_type:?} expected to be {expected_size} bytes, got {actual_size} bytes."
    )]
    SizeMismatch {
        data_type: DataType,
        shape: Box<[usize]>,
        expected_size: usize,
        actual_size: usize,
    },
    #[error("Array \"{key}\" has shape {shape:?}, expected rank {expected_rank}.")]
    InvalidRank {
        key: String,
        shape: Box<[usize]>,
        expected_rank: usize,
    },
    #[error("Array \"{key}\" has shape {got:?}, expected {expected:?}.")]
    UnexpectedShape {
        key: String,
        got: Box<[usize]>,
        expected: Box<[usize]>,
    },
    #[error("Failed to read data")]
    ArrayLoadingError(#[from] std::io::Error),
}

/// Reads `f32` arrays out of a safetensors file. Half precision tensors are
/// widened on load.
pub struct ParameterLoader<'file> {
    index: HashMap<String, ParameterMetadata>,
    file: &'file File,
}

impl<'file> ParameterLoader<'file> {
    pub fn new(file: &'file File) -> Result<Self, HeaderLoadingError> {
        let (global_offset, metadata) = read_metadata(file)?;
        let index = metadata_into_index(global_offset, metadata);
        Ok(ParameterLoader {
            file,
            index,
        })
    }

    pub fn keys(&self) -> Keys<'_, String, ParameterMetadata> {
        self.index.keys()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Result<ArrayD<f32>, ParameterLoaderError> {
        let metadata_entry = self.index.get(key).ok_or(ParameterLoaderError::KeyNotFound(key.to_string()))?;
        let data_type =
            DataType::try_from(metadata_entry.dtype).map_err(|dtype| ParameterLoaderError::UnsupportedDataType {
                key: key.to_string(),
                dtype,
            })?;

        let num_elements: usize = metadata_entry.shape.iter().product();
        let expected_size = num_elements * data_type.size_in_bytes();
        if expected_size != metadata_entry.size {
            return Err(ParameterLoaderError::SizeMismatch {
                data_type,
                shape: metadata_entry.shape.clone(),
                expected_size,
                actual_size: metadata_entry.size,
            });
        }

        let mut buffer = vec![0u8; metadata_entry.size];
        self.file.read_exact_at(&mut buffer, metadata_entry.offset as u64)?;
        let values = data_type.decode_to_f32(&buffer);
        let array = ArrayD::from_shape_vec(IxDyn(&metadata_entry.shape), values).map_err(|_| {
            ParameterLoaderError::SizeMismatch {
                data_type,
                shape: metadata_entry.shape.clone(),
                expected_size,
                actual_size: metadata_entry.size,
            }
        })?;
        Ok(array)
    }

    pub fn get_matrix(
        &self,
        key: &str,
    ) -> Result<Array2<f32>, ParameterLoaderError> {
        let array = self.get(key)?;
        let shape: Box<[usize]> = array.shape().into();
        array.into_dimensionality::<Ix2>().map_err(|_| ParameterLoaderError::InvalidRank {
            key: key.to_string(),
            shape,
            expected_rank: 2,
        })
    }

    pub fn get_vector(
        &self,
        key: &str,
    ) -> Result<Array1<f32>, ParameterLoaderError> {
        let array = self.get(key)?;
        let shape: Box<[usize]> = array.shape().into();
        array.into_dimensionality::<Ix1>().map_err(|_| ParameterLoaderError::InvalidRank {
            key: key.to_string(),
            shape,
            expected_rank: 1,
        })
    }

    pub fn tree(&self) -> ParameterTree<'_> {
        ParameterTree {
            loader: self,
            prefix: None,
        }
    }
}

/// Dotted-path view into a [`ParameterLoader`], e.g. `heads.sentiment.dense`.
pub struct ParameterTree<'loader> {
    loader: &'loader ParameterLoader<'loader>,
    prefix: Option<String>,
}

impl<'loader> ParameterTree<'loader> {
    pub fn path_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn join_prefix(
        &self,
        name: &str,
    ) -> String {
        self.prefix.as_ref().map_or_else(|| name.to_string(), |p| format!("{p}.{name}"))
    }

    pub fn subtree(
        &self,
        name: &str,
    ) -> Result<Self, ParameterLoaderError> {
        let new_prefix = self.join_prefix(name);
        let key_prefix = format!("{new_prefix}.");
        if self.loader.keys().any(|key| key.starts_with(&key_prefix)) {
            Ok(Self {
                loader: self.loader,
                prefix: Some(new_prefix),
            })
        } else {
            Err(ParameterLoaderError::SubtreeNotFound(new_prefix))
        }
    }

    pub fn leaf_matrix(
        &self,
        name: &str,
    ) -> Result<Array2<f32>, ParameterLoaderError> {
        self.loader.get_matrix(&self.join_prefix(name))
    }

    pub fn leaf_vector(
        &self,
        name: &str,
    ) -> Result<Array1<f32>, ParameterLoaderError> {
        self.loader.get_vector(&self.join_prefix(name))
    }
}
