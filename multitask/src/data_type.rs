use half::{bf16, f16};

/// Element types a stored parameter may use. Everything is widened to `f32`
/// once loaded.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub enum DataType {
    BF16,
    F16,
    F32,
}

impl DataType {
    pub const fn size_in_bits(&self) -> usize {
        match self {
            DataType::BF16 | DataType::F16 => 16,
            DataType::F32 => 32,
        }
    }

    pub const fn size_in_bytes(&self) -> usize {
        self.size_in_bits().div_ceil(8)
    }

    /// Decodes little-endian raw bytes of this type into `f32` values.
    pub fn decode_to_f32(
        &self,
        bytes: &[u8],
    ) -> Vec<f32> {
        match self {
            DataType::F32 => bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
            DataType::F16 => bytes
                .chunks_exact(2)
                .map(|chunk| f16::from_le_bytes([chunk[0], chunk[1]]).to_f32())
                .collect(),
            DataType::BF16 => bytes
                .chunks_exact(2)
                .map(|chunk| bf16::from_le_bytes([chunk[0], chunk[1]]).to_f32())
                .collect(),
        }
    }
}
