use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

use super::safetensors_metadata::{Dtype, HashMetadata, TensorInfo};
use crate::DataType;

#[derive(Debug, Error)]
pub enum SafetensorsWriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid tensor data for \"{name}\": expected {expected} bytes, got {actual} bytes")]
    InvalidTensorData {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Failed to serialize safetensors header: {0}")]
    HeaderJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct SafetensorView<'a> {
    pub name: &'a str,
    pub dtype: DataType,
    pub shape: &'a [usize],
    pub data: &'a [u8],
}

pub fn write_safetensors(
    path: &Path,
    tensors: &[SafetensorView<'_>],
    metadata: Option<HashMap<String, String>>,
) -> Result<(), SafetensorsWriteError> {
    let mut offset: usize = 0;
    let mut header = HashMetadata {
        metadata,
        tensors: HashMap::new(),
    };

    for tensor in tensors {
        let numel: usize = tensor.shape.iter().product();
        let expected_bytes = numel.saturating_mul(tensor.dtype.size_in_bytes());
        let actual_bytes = tensor.data.len();
        if expected_bytes != actual_bytes {
            return Err(SafetensorsWriteError::InvalidTensorData {
                name: tensor.name.to_string(),
                expected: expected_bytes,
                actual: actual_bytes,
            });
        }

        let begin = offset;
        let end = offset + actual_bytes;
        offset = end;

        header.tensors.insert(
            tensor.name.to_string(),
            TensorInfo {
                dtype: Dtype::from(tensor.dtype),
                shape: tensor.shape.to_vec(),
                data_offsets: (begin, end),
            },
        );
    }

    let mut header_bytes = serde_json::to_vec(&header)?;

    // Pad to 8 bytes so the data section stays aligned.
    let padding = (8 - (header_bytes.len() % 8)) % 8;
    header_bytes.extend(std::iter::repeat_n(b' ', padding));

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&(header_bytes.len() as u64).to_le_bytes())?;
    writer.write_all(&header_bytes)?;
    for tensor in tensors {
        writer.write_all(tensor.data)?;
    }
    writer.flush()?;
    Ok(())
}

/// Owned `f32` tensor queued for writing, stored in logical (row-major) order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArray {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl NamedArray {
    pub fn from_array<D: ndarray::Dimension>(
        name: impl Into<String>,
        array: &ndarray::Array<f32, D>,
    ) -> Self {
        Self {
            name: name.into(),
            shape: array.shape().to_vec(),
            values: array.iter().copied().collect(),
        }
    }

    pub fn view(&self) -> SafetensorView<'_> {
        SafetensorView {
            name: &self.name,
            dtype: DataType::F32,
            shape: &self.shape,
            data: bytemuck::cast_slice(self.values.as_slice()),
        }
    }
}

pub fn write_named_arrays(
    path: &Path,
    arrays: &[NamedArray],
    metadata: Option<HashMap<String, String>>,
) -> Result<(), SafetensorsWriteError> {
    let views: Vec<SafetensorView<'_>> = arrays.iter().map(NamedArray::view).collect();
    write_safetensors(path, &views, metadata)
}
