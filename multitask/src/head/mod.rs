mod activation;
mod linear;
mod task_head;

pub use activation::apply_activation;
pub use linear::{Linear, LinearError};
pub use task_head::TaskHead;
