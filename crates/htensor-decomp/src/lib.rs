//! # htensor-decomp - Tree-based tensors and hierarchical SVD
//!
//! A tree-based tensor represents an order-`d` tensor by a collection of
//! small cores attached to the nodes of a [`DimensionTree`](htensor_tree::DimensionTree).
//! Storage grows linearly with the order for bounded ranks, and most
//! operations (sums, inner products, partial sums, re-rooting) never form the
//! dense tensor.
//!
//! ```text
//! X(i₁,…,i_d) = Σ over bonds of Π_α C_α(children bonds, dimensions, own bond)
//! ```
//!
//! ## Contents
//!
//! - [`TreeBasedTensor`]: storage, random generation, algebra, inner products,
//!   partial sums, node activation, re-rooting and sub-tensor bases
//! - [`Truncator`]: hierarchical SVD of tree-based or dense tensors, with a
//!   relative tolerance, a rank cap and two sweep orders
//!
//! ## Quick Start
//!
//! ```
//! use htensor_decomp::{ActiveNodes, RandOptions, TreeBasedTensor, Truncator};
//! use htensor_tree::DimensionTree;
//! use scirs2_core::random::{SeedableRng, StdRng};
//! use std::sync::Arc;
//!
//! let tree = Arc::new(DimensionTree::linear(6)?);
//! let mut rng = StdRng::seed_from_u64(0);
//! let options = RandOptions::new()
//!     .with_shape(vec![4; 6])
//!     .with_active(ActiveNodes::TensorTrain);
//! let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng)?;
//! let y = TreeBasedTensor::rand(tree, &options, &mut rng)?;
//!
//! let z = (&x + &y)?;
//! let truncated = Truncator::new(1e-4)?.hsvd(&z)?;
//! let dense = z.full()?;
//! let err = (&truncated.full()? - &dense).norm() / dense.norm();
//! assert!(err <= 1e-4);
//! # Ok::<(), htensor_core::TensorError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Truncator`] and
//!   [`TruncationSweep`], and for the tree types

pub mod tree_tensor;
pub mod truncation;

#[cfg(test)]
mod property_tests;

pub use tree_tensor::{ActiveNodes, NodeState, RandOptions, Reduced, TreeBasedTensor};
pub use truncation::{TruncationInput, TruncationSweep, Truncator};
