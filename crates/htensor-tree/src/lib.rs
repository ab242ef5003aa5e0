//! # htensor-tree
//!
//! Dimension trees: hierarchical partitions of the dimensions of a tensor.
//!
//! A [`DimensionTree`] over `{0, .., D-1}` has one leaf per dimension. Each
//! internal node covers the union of its children's dimensions, and the
//! root covers everything. Nodes are stored in a flat arena and identified by
//! `usize` indices, which stay stable for the lifetime of a tree.
//!
//! ## Construction
//!
//! ```
//! use htensor_tree::{ArityInterval, DimensionTree};
//! use scirs2_core::random::{SeedableRng, StdRng};
//!
//! // Caterpillar tree: 2 * 5 - 1 nodes
//! let linear = DimensionTree::linear(5).unwrap();
//! assert_eq!(linear.nb_nodes(), 9);
//!
//! // Balanced binary tree
//! let balanced = DimensionTree::balanced(8).unwrap();
//! assert_eq!(balanced.depth(), 3);
//!
//! // Random tree with 2 or 3 children per internal node
//! let mut rng = StdRng::seed_from_u64(0);
//! let random = DimensionTree::random(10, ArityInterval::new(2, 3).unwrap(), &mut rng).unwrap();
//! assert_eq!(random.order(), 10);
//! ```
//!
//! ## Transformations
//!
//! [`DimensionTree::sub_dimension_tree`] extracts the tree below a node and
//! [`DimensionTree::change_root`] re-orients the tree around another node.
//! Both return a new tree.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`DimensionTree`] and [`ArityInterval`];
//!   decoding runs the same checks as the constructors

pub mod construct;
pub mod transform;
pub mod tree;


pub use construct::ArityInterval;
pub use tree::DimensionTree;
