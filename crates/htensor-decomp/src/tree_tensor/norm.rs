//! Inner products, norms and orthonormalization without densification

use super::network::CoreNetwork;
use super::types::TreeBasedTensor;
use htensor_core::{Mode, Result, TensorError};
use scirs2_core::ndarray_ext::Array2;

impl TreeBasedTensor {
    /// Inner product with a tensor on the same tree
    ///
    /// For every active node a small Gram matrix between the bases of both
    /// operands is propagated from the leaves to the root. The cost is linear
    /// in the core sizes. Operands with different active nodes are first
    /// brought to the union of their active nodes.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trees or shapes differ.
    pub fn dot(&self, other: &TreeBasedTensor) -> Result<f64> {
        let (a, b) = self.aligned(other)?;
        let left = CoreNetwork::from_tensor(&a)?;
        let right = CoreNetwork::from_tensor(&b)?;
        let tree = a.tree();
        let root = tree.root();

        let mut gram: Vec<Option<Array2<f64>>> = vec![None; left.cores.len()];
        for alpha in tree.post_order() {
            if !left.active[alpha] {
                continue;
            }
            let mut w = left.core(alpha)?.clone();
            for c in left.held_by(alpha) {
                let g = gram[c].take().ok_or_else(|| {
                    TensorError::rank_inconsistency(format!("Gram matrix of node {} missing", c))
                })?;
                w = w.mode_product(Mode::Bond(c), &g.t().to_owned())?;
            }
            let rows = left.in_modes(alpha);
            let lhs = w.matricize(&rows)?;
            let rhs = right.core(alpha)?.matricize(&rows)?;
            if alpha == root {
                return Ok(lhs.iter().zip(rhs.iter()).map(|(x, y)| x * y).sum());
            }
            gram[alpha] = Some(lhs.t().dot(&rhs));
        }
        Err(TensorError::rank_inconsistency("Root not reached"))
    }

    /// Euclidean norm of the represented tensor
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::{RandOptions, TreeBasedTensor};
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    /// use std::sync::Arc;
    ///
    /// let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let x = TreeBasedTensor::rand(tree, &RandOptions::new(), &mut rng).unwrap();
    /// let dense = x.full().unwrap().norm();
    /// assert!((x.norm().unwrap() - dense).abs() < 1e-10 * dense);
    /// ```
    pub fn norm(&self) -> Result<f64> {
        Ok(self.dot(self)?.max(0.0).sqrt())
    }

    /// Same tensor with every non-root active core orthonormal
    ///
    /// Each core, matricized with its outgoing bond as columns, has
    /// orthonormal columns afterwards; the norm of the tensor is carried by
    /// the root core. Ranks larger than the row dimension of a core shrink.
    pub fn orthonormalize(&self) -> Result<TreeBasedTensor> {
        let mut net = CoreNetwork::from_tensor(self)?;
        net.orthonormalize()?;
        net.into_tensor()
    }
}
