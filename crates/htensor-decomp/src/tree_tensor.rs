//! Tree-based tensor format
//!
//! A [`TreeBasedTensor`] stores one core per active node of a
//! [`DimensionTree`](htensor_tree::DimensionTree). Inactive nodes carry no
//! core; their dimensions are absorbed by the nearest active ancestor.

mod algebra;
mod creation;
pub(crate) mod network;
mod norm;
mod reduce;
mod structure;
mod types;

pub use creation::{ActiveNodes, RandOptions};
pub use reduce::Reduced;
pub use types::{NodeState, TreeBasedTensor};
