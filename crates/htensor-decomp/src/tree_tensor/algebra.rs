//! Sums, differences, Hadamard products and scaling
//!
//! Binary operations require the same tree and shape. Ranks add up under
//! `+`/`-` (block-diagonal cores) and multiply under the Hadamard product
//! (Kronecker cores). Operators on references return `Result` since the
//! operands may be incompatible.

use super::network::core_modes;
use super::types::{NodeState, TreeBasedTensor};
use htensor_core::{Mode, Result, TensorError};
use scirs2_core::ndarray_ext::{Array, ArrayD, IxDyn};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

impl TreeBasedTensor {
    /// Sum of two tensors on the same tree
    ///
    /// The rank of every active node is the sum of the operands' ranks.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trees or shapes differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::{RandOptions, TreeBasedTensor};
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    /// use std::sync::Arc;
    ///
    /// let tree = Arc::new(DimensionTree::linear(3).unwrap());
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let options = RandOptions::new().with_shape(vec![2, 3, 4]);
    /// let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
    /// let y = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();
    /// let z = (&x + &y).unwrap();
    /// assert_eq!(z.ranks()[1], x.ranks()[1] + y.ranks()[1]);
    /// ```
    pub fn checked_add(&self, other: &TreeBasedTensor) -> Result<TreeBasedTensor> {
        self.combine(other, direct_sum)
    }

    /// Difference of two tensors on the same tree
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trees or shapes differ.
    pub fn checked_sub(&self, other: &TreeBasedTensor) -> Result<TreeBasedTensor> {
        self.combine(&other.scale(-1.0), direct_sum)
    }

    /// Entry-wise product of two tensors on the same tree
    ///
    /// The rank of every active node is the product of the operands' ranks.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the trees or shapes differ.
    pub fn hadamard(&self, other: &TreeBasedTensor) -> Result<TreeBasedTensor> {
        self.combine(other, kronecker)
    }

    /// Multiply the tensor by `alpha` (through the root core)
    pub fn scale(&self, alpha: f64) -> TreeBasedTensor {
        let mut out = self.clone();
        if let Some(core) = out.root_core_mut() {
            core.mapv_inplace(|x| alpha * x);
        }
        out
    }

    pub(crate) fn check_compatible(&self, other: &TreeBasedTensor) -> Result<()> {
        if !Arc::ptr_eq(self.tree(), other.tree()) && **self.tree() != **other.tree() {
            return Err(TensorError::shape_mismatch(
                "Operands live on different dimension trees",
            ));
        }
        if self.shape() != other.shape() {
            return Err(TensorError::shape_mismatch(format!(
                "Operands have shapes {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        Ok(())
    }

    /// Both operands with the union of their active nodes
    pub(crate) fn aligned(
        &self,
        other: &TreeBasedTensor,
    ) -> Result<(TreeBasedTensor, TreeBasedTensor)> {
        self.check_compatible(other)?;
        let (mine, theirs) = (self.active_flags(), other.active_flags());
        if mine == theirs {
            return Ok((self.clone(), other.clone()));
        }
        let missing = |have: &[bool], want: &[bool]| -> Vec<usize> {
            (0..have.len()).filter(|&a| want[a] && !have[a]).collect()
        };
        log::debug!("aligning active nodes {:?} and {:?}", mine, theirs);
        Ok((
            self.activate_nodes(&missing(&mine, &theirs))?,
            other.activate_nodes(&missing(&theirs, &mine))?,
        ))
    }

    fn combine<F>(&self, other: &TreeBasedTensor, op: F) -> Result<TreeBasedTensor>
    where
        F: Fn(&ArrayD<f64>, &ArrayD<f64>, &[bool]) -> ArrayD<f64>,
    {
        let (a, b) = self.aligned(other)?;
        let tree = Arc::clone(a.tree());
        let active = a.active_flags();
        let mut nodes = Vec::with_capacity(active.len());
        for alpha in 0..active.len() {
            match (a.core(alpha), b.core(alpha)) {
                (Some(c1), Some(c2)) => {
                    let bond_axes: Vec<bool> = core_modes(&tree, &active, alpha)
                        .iter()
                        .map(|m| matches!(m, Mode::Bond(_)))
                        .collect();
                    nodes.push(NodeState::Active(op(c1, c2, &bond_axes)));
                }
                _ => nodes.push(NodeState::Inactive),
            }
        }
        TreeBasedTensor::from_parts(tree, nodes, a.shape().to_vec())
    }
}

/// Block-diagonal embedding along bond axes; plain sum when there are none
fn direct_sum(c1: &ArrayD<f64>, c2: &ArrayD<f64>, bond_axes: &[bool]) -> ArrayD<f64> {
    if !bond_axes.contains(&true) {
        return c1 + c2;
    }
    let (s1, s2) = (c1.shape(), c2.shape());
    let nd = s1.len();
    let shape: Vec<usize> = (0..nd)
        .map(|ax| if bond_axes[ax] { s1[ax] + s2[ax] } else { s1[ax] })
        .collect();
    Array::from_shape_fn(IxDyn(&shape), |idx| {
        let in_first = (0..nd).all(|ax| !bond_axes[ax] || idx[ax] < s1[ax]);
        let in_second = (0..nd).all(|ax| !bond_axes[ax] || idx[ax] >= s1[ax]);
        if in_first {
            let i: Vec<usize> = (0..nd).map(|ax| idx[ax]).collect();
            c1[IxDyn(&i)]
        } else if in_second {
            let i: Vec<usize> = (0..nd)
                .map(|ax| if bond_axes[ax] { idx[ax] - s1[ax] } else { idx[ax] })
                .collect();
            c2[IxDyn(&i)]
        } else {
            0.0
        }
    })
}

/// Kronecker product along bond axes, diagonal along dimension axes
fn kronecker(c1: &ArrayD<f64>, c2: &ArrayD<f64>, bond_axes: &[bool]) -> ArrayD<f64> {
    let (s1, s2) = (c1.shape(), c2.shape());
    let nd = s1.len();
    let shape: Vec<usize> = (0..nd)
        .map(|ax| if bond_axes[ax] { s1[ax] * s2[ax] } else { s1[ax] })
        .collect();
    Array::from_shape_fn(IxDyn(&shape), |idx| {
        let mut i1 = Vec::with_capacity(nd);
        let mut i2 = Vec::with_capacity(nd);
        for ax in 0..nd {
            if bond_axes[ax] {
                i1.push(idx[ax] / s2[ax]);
                i2.push(idx[ax] % s2[ax]);
            } else {
                i1.push(idx[ax]);
                i2.push(idx[ax]);
            }
        }
        c1[IxDyn(&i1)] * c2[IxDyn(&i2)]
    })
}

impl Add for &TreeBasedTensor {
    type Output = Result<TreeBasedTensor>;

    fn add(self, rhs: &TreeBasedTensor) -> Self::Output {
        self.checked_add(rhs)
    }
}

impl Sub for &TreeBasedTensor {
    type Output = Result<TreeBasedTensor>;

    fn sub(self, rhs: &TreeBasedTensor) -> Self::Output {
        self.checked_sub(rhs)
    }
}

/// Hadamard product
impl Mul for &TreeBasedTensor {
    type Output = Result<TreeBasedTensor>;

    fn mul(self, rhs: &TreeBasedTensor) -> Self::Output {
        self.hadamard(rhs)
    }
}

impl Mul<f64> for &TreeBasedTensor {
    type Output = TreeBasedTensor;

    fn mul(self, alpha: f64) -> TreeBasedTensor {
        self.scale(alpha)
    }
}

impl Neg for &TreeBasedTensor {
    type Output = TreeBasedTensor;

    fn neg(self) -> TreeBasedTensor {
        self.scale(-1.0)
    }
}
