//! Arithmetic, reductions and matricization for dense tensors

use super::types::FullTensor;
use crate::error::{Result, TensorError};
use scirs2_core::ndarray_ext::{Array, Array2, IxDyn};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

impl FullTensor {
    /// Euclidean (Frobenius) norm over all entries
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Sum of all entries
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    /// Entry-wise inner product with another tensor of the same shape
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the shapes differ.
    pub fn dot(&self, other: &FullTensor) -> Result<f64> {
        self.check_same_shape(other, "dot")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Entry-wise difference
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the shapes differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_core::FullTensor;
    ///
    /// let a = FullTensor::full(&[2, 2], 3.0);
    /// let b = FullTensor::ones(&[2, 2]);
    /// let diff = a.checked_sub(&b).unwrap();
    /// assert_eq!(diff.sum(), 8.0);
    /// ```
    pub fn checked_sub(&self, other: &FullTensor) -> Result<FullTensor> {
        self.check_same_shape(other, "subtract")?;
        Ok(FullTensor::from_array(&self.data - &other.data))
    }

    /// Entry-wise sum
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the shapes differ.
    pub fn checked_add(&self, other: &FullTensor) -> Result<FullTensor> {
        self.check_same_shape(other, "add")?;
        Ok(FullTensor::from_array(&self.data + &other.data))
    }

    /// Multiply every entry by `alpha`
    pub fn scale(&self, alpha: f64) -> FullTensor {
        FullTensor::from_array(self.data.mapv(|x| alpha * x))
    }

    /// Matricize with the given dimensions as rows
    ///
    /// Rows enumerate the listed dimensions in the listed order, columns the
    /// remaining dimensions in increasing order, both in row-major fashion.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `rows` has duplicates or out-of-range entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_core::FullTensor;
    ///
    /// let tensor = FullTensor::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4]).unwrap();
    /// let m = tensor.matricize(&[1]).unwrap();
    /// assert_eq!(m.shape(), &[3, 8]);
    /// assert_eq!(m[[1, 0]], tensor[&[0, 1, 0]]);
    /// ```
    pub fn matricize(&self, rows: &[usize]) -> Result<Array2<f64>> {
        let order = self.order();
        let mut seen = vec![false; order];
        for &d in rows {
            if d >= order || seen[d] {
                return Err(TensorError::invalid_argument(format!(
                    "Row dimensions {:?} are not distinct dimensions of an order-{} tensor",
                    rows, order
                )));
            }
            seen[d] = true;
        }
        let mut perm: Vec<usize> = rows.to_vec();
        perm.extend((0..order).filter(|d| !seen[*d]));

        let shape = self.shape();
        let m: usize = rows.iter().map(|&d| shape[d]).product();
        let n: usize = perm[rows.len()..].iter().map(|&d| shape[d]).product();

        let permuted = self.data.view().permuted_axes(perm);
        let flat: Vec<f64> = permuted.iter().cloned().collect();
        Array2::from_shape_vec((m, n), flat)
            .map_err(|e| TensorError::shape_mismatch(format!("Matricization failed: {}", e)))
    }

    fn check_same_shape(&self, other: &FullTensor, what: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(TensorError::shape_mismatch(format!(
                "Cannot {} tensors of shapes {:?} and {:?}",
                what,
                self.shape(),
                other.shape()
            )));
        }
        Ok(())
    }
}

impl Index<&[usize]> for FullTensor {
    type Output = f64;

    fn index(&self, index: &[usize]) -> &Self::Output {
        &self.data[IxDyn(index)]
    }
}

impl<const N: usize> Index<&[usize; N]> for FullTensor {
    type Output = f64;

    fn index(&self, index: &[usize; N]) -> &Self::Output {
        &self.data[IxDyn(index)]
    }
}

impl IndexMut<&[usize]> for FullTensor {
    fn index_mut(&mut self, index: &[usize]) -> &mut Self::Output {
        &mut self.data[IxDyn(index)]
    }
}

impl<const N: usize> IndexMut<&[usize; N]> for FullTensor {
    fn index_mut(&mut self, index: &[usize; N]) -> &mut Self::Output {
        &mut self.data[IxDyn(index)]
    }
}

impl fmt::Debug for FullTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullTensor")
            .field("shape", &self.shape())
            .field("norm", &self.norm())
            .finish()
    }
}

impl fmt::Display for FullTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FullTensor(shape={:?})\n{}", self.shape(), self.data)
    }
}

impl Sub for &FullTensor {
    type Output = FullTensor;

    /// # Panics
    ///
    /// Panics if the shapes differ. Use [`FullTensor::checked_sub`] to get an error instead.
    fn sub(self, other: &FullTensor) -> FullTensor {
        match self.checked_sub(other) {
            Ok(result) => result,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Sub for FullTensor {
    type Output = FullTensor;

    fn sub(self, other: FullTensor) -> FullTensor {
        &self - &other
    }
}

impl Add for &FullTensor {
    type Output = FullTensor;

    /// # Panics
    ///
    /// Panics if the shapes differ. Use [`FullTensor::checked_add`] to get an error instead.
    fn add(self, other: &FullTensor) -> FullTensor {
        match self.checked_add(other) {
            Ok(result) => result,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Add for FullTensor {
    type Output = FullTensor;

    fn add(self, other: FullTensor) -> FullTensor {
        &self + &other
    }
}

impl Mul<f64> for &FullTensor {
    type Output = FullTensor;

    fn mul(self, alpha: f64) -> FullTensor {
        self.scale(alpha)
    }
}

impl Mul<f64> for FullTensor {
    type Output = FullTensor;

    fn mul(self, alpha: f64) -> FullTensor {
        self.scale(alpha)
    }
}

impl Neg for &FullTensor {
    type Output = FullTensor;

    fn neg(self) -> FullTensor {
        self.scale(-1.0)
    }
}

impl From<Array<f64, IxDyn>> for FullTensor {
    fn from(array: Array<f64, IxDyn>) -> Self {
        FullTensor::from_array(array)
    }
}
