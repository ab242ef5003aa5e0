//! Labeled-mode tensor contraction
//!
//! Cores of a tree-based tensor are small dense arrays whose axes are named
//! either by a physical dimension or by the tree edge they connect to.
//! [`LabeledTensor`] carries those names next to the data so that contracting
//! two cores is a matter of summing over the labels they share. The result
//! keeps the free modes of the left operand followed by those of the right
//! operand, each in their original order.
//!
//! Every kernel reduces to a single matrix product after permuting the shared
//! modes to the inner position.

use crate::error::{Result, TensorError};
use scirs2_core::ndarray_ext::{Array, Array2, ArrayD, Axis, IxDyn};
use std::fmt;

/// Label of a core axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    /// Physical tensor dimension `μ`
    Dim(usize),
    /// Edge between node `β` and the active node holding it
    Bond(usize),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dim(mu) => write!(f, "x{}", mu),
            Mode::Bond(node) => write!(f, "b{}", node),
        }
    }
}

/// Dense array with one [`Mode`] label per axis
///
/// # Invariant
///
/// `modes.len() == data.ndim()` and labels are pairwise distinct.
///
/// # Examples
///
/// ```
/// use htensor_core::{LabeledTensor, Mode};
/// use scirs2_core::ndarray_ext::{ArrayD, IxDyn};
///
/// let a = LabeledTensor::new(ArrayD::ones(IxDyn(&[2, 3])), vec![Mode::Dim(0), Mode::Bond(1)]).unwrap();
/// let b = LabeledTensor::new(ArrayD::ones(IxDyn(&[3, 4])), vec![Mode::Bond(1), Mode::Dim(1)]).unwrap();
/// let c = a.contract(&b).unwrap();
/// assert_eq!(c.modes(), &[Mode::Dim(0), Mode::Dim(1)]);
/// assert_eq!(c.shape(), &[2, 4]);
/// assert_eq!(c.data()[IxDyn(&[0, 0])], 3.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledTensor {
    data: ArrayD<f64>,
    modes: Vec<Mode>,
}

impl LabeledTensor {
    /// Attach labels to an array
    ///
    /// # Errors
    ///
    /// `RankInconsistency` if the number of labels differs from the number of
    /// axes or a label is repeated.
    pub fn new(data: ArrayD<f64>, modes: Vec<Mode>) -> Result<Self> {
        if data.ndim() != modes.len() {
            return Err(TensorError::rank_inconsistency(format!(
                "Array of order {} cannot carry {} mode labels",
                data.ndim(),
                modes.len()
            )));
        }
        for (i, m) in modes.iter().enumerate() {
            if modes[..i].contains(m) {
                return Err(TensorError::rank_inconsistency(format!(
                    "Mode {} appears twice in {:?}",
                    m, modes
                )));
            }
        }
        Ok(Self { data, modes })
    }

    /// Order-0 tensor holding `value`
    pub fn scalar(value: f64) -> Self {
        Self {
            data: Array::from_elem(IxDyn(&[]), value),
            modes: Vec::new(),
        }
    }

    /// Axis labels
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Axis sizes
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Underlying array
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Consume and return the underlying array
    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    /// Axis carrying `mode`, if any
    pub fn position(&self, mode: Mode) -> Option<usize> {
        self.modes.iter().position(|&m| m == mode)
    }

    /// Size of the axis carrying `mode`, if any
    pub fn size(&self, mode: Mode) -> Option<usize> {
        self.position(mode).map(|ax| self.data.shape()[ax])
    }

    /// Value of an order-0 tensor (sum of entries otherwise)
    pub fn value(&self) -> f64 {
        self.data.sum()
    }

    /// Rename every label through `f`
    ///
    /// # Errors
    ///
    /// `RankInconsistency` if two labels collide after renaming.
    pub fn relabel<F>(self, f: F) -> Result<Self>
    where
        F: Fn(Mode) -> Mode,
    {
        let modes = self.modes.iter().map(|&m| f(m)).collect();
        Self::new(self.data, modes)
    }

    /// Contract over every label shared with `other`
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if a shared label has different sizes on both sides.
    pub fn contract(&self, other: &LabeledTensor) -> Result<LabeledTensor> {
        let shared: Vec<Mode> = self
            .modes
            .iter()
            .filter(|m| other.modes.contains(m))
            .copied()
            .collect();
        for &m in &shared {
            let (left, right) = (self.size(m), other.size(m));
            if left != right {
                return Err(TensorError::shape_mismatch(format!(
                    "Mode {} has size {:?} on the left and {:?} on the right",
                    m, left, right
                )));
            }
        }
        let free_left: Vec<Mode> = self
            .modes
            .iter()
            .filter(|m| !shared.contains(m))
            .copied()
            .collect();
        let free_right: Vec<Mode> = other
            .modes
            .iter()
            .filter(|m| !shared.contains(m))
            .copied()
            .collect();

        // (free_left, shared) x (shared, free_right)
        let a = self.matricize(&free_left)?;
        let b = other.matricize(&shared)?;
        log::trace!(
            "contract {:?} x {:?} over {:?}: ({}x{}) * ({}x{})",
            self.modes,
            other.modes,
            shared,
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        );
        let product = a.dot(&b);

        let mut shape: Vec<usize> = free_left
            .iter()
            .filter_map(|&m| self.size(m))
            .collect();
        shape.extend(free_right.iter().filter_map(|&m| other.size(m)));
        let mut modes = free_left;
        modes.extend(free_right);
        let data = Array::from_shape_vec(IxDyn(&shape), product.iter().cloned().collect())
            .map_err(|e| TensorError::shape_mismatch(format!("Contraction reshape failed: {}", e)))?;
        Ok(Self { data, modes })
    }

    /// Sum out the given labels
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a label is not carried by the tensor.
    pub fn sum_modes(&self, modes: &[Mode]) -> Result<LabeledTensor> {
        let mut data = self.data.clone();
        let mut labels = self.modes.clone();
        for &m in modes {
            let ax = labels.iter().position(|&l| l == m).ok_or_else(|| {
                TensorError::invalid_argument(format!("Mode {} not in {:?}", m, self.modes))
            })?;
            data = data.sum_axis(Axis(ax));
            labels.remove(ax);
        }
        Ok(Self { data, modes: labels })
    }

    /// Reorder the axes to follow `order`
    ///
    /// The result is stored in standard (row-major) layout.
    ///
    /// # Errors
    ///
    /// `RankInconsistency` if `order` is not a permutation of the labels.
    pub fn permute_to(&self, order: &[Mode]) -> Result<LabeledTensor> {
        if order.len() != self.modes.len() {
            return Err(self.not_a_permutation(order));
        }
        let mut perm = Vec::with_capacity(order.len());
        for &m in order {
            let ax = self.position(m).ok_or_else(|| self.not_a_permutation(order))?;
            perm.push(ax);
        }
        let permuted = self.data.view().permuted_axes(perm);
        let shape = permuted.shape().to_vec();
        let data = Array::from_shape_vec(IxDyn(&shape), permuted.iter().cloned().collect())
            .map_err(|e| TensorError::shape_mismatch(format!("Permutation failed: {}", e)))?;
        Self::new(data, order.to_vec())
    }

    /// Matricize with `rows` (in the given order) as row modes
    ///
    /// Columns enumerate the remaining labels in their current order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a row label is missing or repeated.
    pub fn matricize(&self, rows: &[Mode]) -> Result<Array2<f64>> {
        for (i, &m) in rows.iter().enumerate() {
            if self.position(m).is_none() || rows[..i].contains(&m) {
                return Err(TensorError::invalid_argument(format!(
                    "Cannot use {:?} as row modes of a tensor with modes {:?}",
                    rows, self.modes
                )));
            }
        }
        let mut perm: Vec<usize> = rows.iter().filter_map(|&m| self.position(m)).collect();
        perm.extend((0..self.modes.len()).filter(|ax| !rows.contains(&self.modes[*ax])));

        let shape = self.data.shape();
        let m: usize = perm[..rows.len()].iter().map(|&ax| shape[ax]).product();
        let n: usize = perm[rows.len()..].iter().map(|&ax| shape[ax]).product();
        let permuted = self.data.view().permuted_axes(perm);
        Array2::from_shape_vec((m, n), permuted.iter().cloned().collect())
            .map_err(|e| TensorError::shape_mismatch(format!("Matricization failed: {}", e)))
    }

    /// Inverse of [`LabeledTensor::matricize`]
    ///
    /// `modes` and `shape` list the row modes followed by the column modes.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the matrix does not hold `shape.iter().product()` entries.
    pub fn from_matrix(matrix: &Array2<f64>, modes: Vec<Mode>, shape: &[usize]) -> Result<Self> {
        let data = Array::from_shape_vec(IxDyn(shape), matrix.iter().cloned().collect())
            .map_err(|e| {
                TensorError::shape_mismatch(format!(
                    "Cannot fold a {}x{} matrix into shape {:?}: {}",
                    matrix.nrows(),
                    matrix.ncols(),
                    shape,
                    e
                ))
            })?;
        Self::new(data, modes)
    }

    /// Apply `matrix` along `mode`
    ///
    /// `new[.., i, ..] = Σ_j matrix[i, j] * old[.., j, ..]`. The mode keeps
    /// its label and position; its size becomes `matrix.nrows()`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the mode is absent, `ShapeMismatch` if
    /// `matrix.ncols()` differs from the mode size.
    pub fn mode_product(&self, mode: Mode, matrix: &Array2<f64>) -> Result<LabeledTensor> {
        let ax = self.position(mode).ok_or_else(|| {
            TensorError::invalid_argument(format!("Mode {} not in {:?}", mode, self.modes))
        })?;
        let size = self.data.shape()[ax];
        if matrix.ncols() != size {
            return Err(TensorError::shape_mismatch(format!(
                "Matrix with {} columns applied to mode {} of size {}",
                matrix.ncols(),
                mode,
                size
            )));
        }
        let unfolded = self.matricize(&[mode])?;
        let product = matrix.dot(&unfolded);

        let mut front_modes = vec![mode];
        front_modes.extend(self.modes.iter().filter(|&&m| m != mode));
        let mut front_shape = vec![matrix.nrows()];
        front_shape.extend(
            self.data
                .shape()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != ax)
                .map(|(_, &s)| s),
        );
        let front = Self::from_matrix(&product, front_modes, &front_shape)?;
        front.permute_to(&self.modes)
    }

    fn not_a_permutation(&self, order: &[Mode]) -> TensorError {
        TensorError::rank_inconsistency(format!(
            "{:?} is not a permutation of {:?}",
            order, self.modes
        ))
    }
}
