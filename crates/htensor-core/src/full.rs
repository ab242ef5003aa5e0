//! Dense reference tensors

mod creation;
mod ops;
mod types;

pub use types::FullTensor;
