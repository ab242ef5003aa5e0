//! Full (dense) tensor type definition and basic accessors
//!
//! `FullTensor` stores every entry of an order-D tensor in a row-major
//! dynamic-dimension array. It is the reference representation that
//! tree-based tensors are compared against and compressed from.

use crate::error::{Result, TensorError};
use scirs2_core::ndarray_ext::{Array, ArrayD, ArrayView, ArrayViewMut, IxDyn};

/// Dense D-dimensional tensor of `f64` entries
///
/// # Invariant
///
/// The number of stored entries equals the product of the per-dimension sizes.
///
/// # Examples
///
/// ```
/// use htensor_core::FullTensor;
///
/// let tensor = FullTensor::zeros(&[2, 3, 4]);
/// assert_eq!(tensor.shape(), &[2, 3, 4]);
/// assert_eq!(tensor.order(), 3);
/// assert_eq!(tensor.len(), 24);
/// ```
#[derive(Clone, PartialEq)]
pub struct FullTensor {
    pub(crate) data: ArrayD<f64>,
}

impl FullTensor {
    /// Wrap an existing dynamic-dimension array
    pub fn from_array(array: ArrayD<f64>) -> Self {
        Self { data: array }
    }

    /// Create a tensor from row-major data
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `vec.len()` differs from the product of `shape`.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_core::FullTensor;
    ///
    /// let tensor = FullTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(tensor[&[1, 0]], 4.0);
    /// ```
    pub fn from_vec(vec: Vec<f64>, shape: &[usize]) -> Result<Self> {
        let total: usize = shape.iter().product();
        if vec.len() != total {
            return Err(TensorError::shape_mismatch(format!(
                "Shape {:?} requires {} elements, but got {}",
                shape,
                total,
                vec.len()
            )));
        }
        let data = Array::from_shape_vec(IxDyn(shape), vec)
            .map_err(|e| TensorError::shape_mismatch(format!("Reshape failed: {}", e)))?;
        Ok(Self { data })
    }

    /// Tensor of zeros
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// Tensor of ones
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// Tensor with every entry equal to `value`
    pub fn full(shape: &[usize], value: f64) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// Number of dimensions
    pub fn order(&self) -> usize {
        self.data.ndim()
    }

    /// Per-dimension sizes
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when some dimension has size zero
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Underlying array
    pub fn as_array(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Consume the tensor and return the underlying array
    pub fn into_array(self) -> ArrayD<f64> {
        self.data
    }

    /// Immutable view
    pub fn view(&self) -> ArrayView<'_, f64, IxDyn> {
        self.data.view()
    }

    /// Mutable view
    pub fn view_mut(&mut self) -> ArrayViewMut<'_, f64, IxDyn> {
        self.data.view_mut()
    }
}
