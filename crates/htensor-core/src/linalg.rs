//! Thin singular value decomposition

use crate::error::{Result, TensorError};
use scirs2_core::ndarray_ext::{s, Array1, Array2};
use scirs2_linalg::svd;

/// Thin SVD factors `A = U diag(s) Vᵀ`
///
/// With `k = min(m, n)`: `u` is `m x k` with orthonormal columns, `s` holds
/// `k` non-negative values in decreasing order and `vt` is `k x n`.
#[derive(Debug, Clone)]
pub struct ThinSvd {
    /// Left singular vectors
    pub u: Array2<f64>,
    /// Singular values, decreasing
    pub s: Array1<f64>,
    /// Right singular vectors, transposed
    pub vt: Array2<f64>,
}

impl ThinSvd {
    /// Number of singular values
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// True for an empty decomposition
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Keep the leading `k` triplets
    pub fn truncate(&self, k: usize) -> ThinSvd {
        let k = k.min(self.s.len());
        ThinSvd {
            u: self.u.slice(s![.., ..k]).to_owned(),
            s: self.s.slice(s![..k]).to_owned(),
            vt: self.vt.slice(s![..k, ..]).to_owned(),
        }
    }

    /// `diag(s) Vᵀ`
    pub fn s_vt(&self) -> Array2<f64> {
        let mut out = self.vt.clone();
        for (mut row, &sigma) in out.rows_mut().into_iter().zip(self.s.iter()) {
            row.mapv_inplace(|x| x * sigma);
        }
        out
    }

    /// `U diag(s)`
    pub fn u_s(&self) -> Array2<f64> {
        let mut out = self.u.clone();
        for (mut col, &sigma) in out.columns_mut().into_iter().zip(self.s.iter()) {
            col.mapv_inplace(|x| x * sigma);
        }
        out
    }

    /// Number of singular values above the round-off threshold
    /// `s[0] * max(m, n) * EPSILON`, at least one
    pub fn numerical_rank(&self) -> usize {
        let Some(&s0) = self.s.iter().next() else {
            return 0;
        };
        let dim = self.u.nrows().max(self.vt.ncols()) as f64;
        let threshold = s0 * dim * f64::EPSILON;
        self.s.iter().filter(|&&x| x > threshold).count().max(1)
    }
}

/// Thin SVD of `matrix`
///
/// # Errors
///
/// `Linalg` if the decomposition fails, `InvalidArgument` for an empty matrix.
///
/// # Examples
///
/// ```
/// use htensor_core::thin_svd;
/// use scirs2_core::ndarray_ext::array;
///
/// let m = array![[3.0, 0.0], [0.0, 4.0], [0.0, 0.0]];
/// let svd = thin_svd(&m).unwrap();
/// assert_eq!(svd.u.shape(), &[3, 2]);
/// assert!((svd.s[0] - 4.0).abs() < 1e-12);
/// ```
pub fn thin_svd(matrix: &Array2<f64>) -> Result<ThinSvd> {
    let (m, n) = matrix.dim();
    if m == 0 || n == 0 {
        return Err(TensorError::invalid_argument(format!(
            "SVD of an empty {}x{} matrix",
            m, n
        )));
    }
    let (u, sigma, vt) = svd(&matrix.view(), false, None)
        .map_err(|e| TensorError::Linalg(format!("SVD of a {}x{} matrix failed: {}", m, n, e)))?;

    let k = sigma.len().min(m).min(n);
    if u.ncols() < k || vt.nrows() < k {
        return Err(TensorError::Linalg(format!(
            "SVD returned factors {:?} and {:?} for {} singular values",
            u.shape(),
            vt.shape(),
            k
        )));
    }
    Ok(ThinSvd {
        u: u.slice(s![.., ..k]).to_owned(),
        s: sigma.slice(s![..k]).to_owned(),
        vt: vt.slice(s![..k, ..]).to_owned(),
    })
}
