mod loader;
mod safetensors_metadata;
mod safetensors_writer;

pub use loader::{ParameterLoader, ParameterLoaderError, ParameterTree};
pub use safetensors_metadata::{
    Dtype, HashMetadata, HeaderLoadingError, TensorInfo, read_metadata as read_safetensors_metadata,
};
pub use safetensors_writer::{
    NamedArray, SafetensorView, SafetensorsWriteError, write_named_arrays, write_safetensors,
};
