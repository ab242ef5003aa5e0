//! # htensor-core
//!
//! Dense building blocks for hierarchical tensor formats.
//!
//! - **Dense tensors** ([`FullTensor`]) used as reference values and as the
//!   input of dense-to-tree compression
//! - **Labeled contraction** ([`LabeledTensor`], [`Mode`]) for the small core
//!   arrays stored at the nodes of a dimension tree
//! - **Thin SVD** ([`thin_svd`]) on top of `scirs2-linalg`
//! - **Errors** ([`TensorError`]) shared by every crate of the workspace
//!
//! ## SciRS2 Integration
//!
//! Arrays come from `scirs2_core::ndarray_ext` and random numbers from
//! `scirs2_core::random`. Random constructors take the generator as an
//! argument.
//!
//! ## Quick Start
//!
//! ```
//! use htensor_core::FullTensor;
//! use scirs2_core::random::{SeedableRng, StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let a = FullTensor::randn(&[4, 5, 6], &mut rng);
//! let b = a.scale(2.0);
//! let diff = &b - &a;
//! assert!((diff.norm() - a.norm()).abs() < 1e-12);
//! ```
//!
//! ## Matricization
//!
//! ```
//! use htensor_core::FullTensor;
//!
//! let tensor = FullTensor::ones(&[2, 3, 4]);
//! let m = tensor.matricize(&[0, 2]).unwrap();
//! assert_eq!(m.shape(), &[8, 3]);
//! ```

pub mod contraction;
pub mod error;
pub mod full;
pub mod linalg;

pub use contraction::{LabeledTensor, Mode};
pub use error::{Result, TensorError};
pub use full::FullTensor;
pub use linalg::{thin_svd, ThinSvd};
