//! Error type shared by every htensor crate
//!
//! All fallible operations in the workspace report one of the variants below.
//! Errors are raised synchronously by the call that detects them and no
//! operation mutates its inputs before failing.
//!
//! # Examples
//!
//! ```
//! use htensor_core::{FullTensor, TensorError};
//!
//! let a = FullTensor::zeros(&[2, 3]);
//! let b = FullTensor::zeros(&[3, 2]);
//! assert!(matches!(a.checked_sub(&b), Err(TensorError::ShapeMismatch(_))));
//! ```

use thiserror::Error;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, TensorError>;

/// Errors raised by tree construction, tree-based tensors and truncation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// Malformed construction parameters (orders, permutations, ranks, arities)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operands with incompatible shapes, trees or active-node patterns
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Node index outside the tree
    #[error("Invalid node {node}: tree has {nb_nodes} nodes")]
    InvalidNode {
        /// The offending node index
        node: usize,
        /// Number of nodes in the tree
        nb_nodes: usize,
    },

    /// Core array dimensions disagree with the declared ranks or sizes
    #[error("Rank inconsistency: {0}")]
    RankInconsistency(String),

    /// A dense linear-algebra kernel failed
    #[error("Linear algebra failure: {0}")]
    Linalg(String),
}

impl TensorError {
    /// Shorthand for [`TensorError::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TensorError::InvalidArgument(message.into())
    }

    /// Shorthand for [`TensorError::ShapeMismatch`]
    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        TensorError::ShapeMismatch(message.into())
    }

    /// Shorthand for [`TensorError::RankInconsistency`]
    pub fn rank_inconsistency(message: impl Into<String>) -> Self {
        TensorError::RankInconsistency(message.into())
    }

    /// Check that `node < nb_nodes`
    pub fn check_node(node: usize, nb_nodes: usize) -> Result<()> {
        if node >= nb_nodes {
            return Err(TensorError::InvalidNode { node, nb_nodes });
        }
        Ok(())
    }
}
