//! # htensor - Hierarchical Tensor Formats
//!
//! Low-rank representations of high-order tensors organized by a dimension
//! tree: each node of the tree groups a subset of the dimensions, and an
//! active node stores a small core linking the subspaces of its children.
//!
//! ## Quick Start
//!
//! ```
//! use htensor::prelude::*;
//! use scirs2_core::random::{SeedableRng, StdRng};
//! use std::sync::Arc;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let tree = Arc::new(DimensionTree::balanced(5)?);
//! let x = TreeBasedTensor::rand(tree.clone(), &RandOptions::new(), &mut rng)?;
//!
//! // compress a dense tensor onto the same tree
//! let dense = x.full()?;
//! let y = Truncator::new(1e-10)?.hsvd_full(&dense, tree, &ActiveNodes::All)?;
//! assert!((y.norm()? - dense.norm()).abs() < 1e-8 * dense.norm());
//! # Ok::<(), TensorError>(())
//! ```
//!
//! ## Components
//!
//! ### Dense tensors and kernels ([`core`])
//!
//! [`FullTensor`](core::FullTensor), labeled-mode contractions and the thin
//! SVD used everywhere else.
//!
//! ### Dimension trees ([`tree`])
//!
//! Linear, balanced, trivial and random trees, traversal queries, sub-trees
//! and re-rooting.
//!
//! ### Tree-based tensors and truncation ([`decomp`])
//!
//! Random generation, sums and Hadamard products, inner products, partial
//! sums, node activation, re-rooting and hierarchical SVD.
//!
//! ## Features
//!
//! - `serde`: serialization of trees and truncation settings

pub use htensor_core as core;
pub use htensor_decomp as decomp;
pub use htensor_tree as tree;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use htensor::prelude::*;
    //!
    //! let tree = DimensionTree::linear(4).unwrap();
    //! assert_eq!(tree.nb_nodes(), 7);
    //! ```

    // Dense tensors and errors
    pub use crate::core::{FullTensor, Result, TensorError};

    // Trees
    pub use crate::tree::{ArityInterval, DimensionTree};

    // Tree-based tensors
    pub use crate::decomp::{
        ActiveNodes, RandOptions, Reduced, TreeBasedTensor, TruncationInput, TruncationSweep,
        Truncator,
    };
}
