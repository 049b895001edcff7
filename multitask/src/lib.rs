pub mod config;
mod data_type;
pub mod encoder;
mod error;
pub mod head;
pub mod model;
pub mod parameters;
pub mod prelude;

pub use config::*;
pub use data_type::DataType;
pub use error::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
