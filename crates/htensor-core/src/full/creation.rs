//! Random tensor creation
//!
//! Random constructors take the generator explicitly so that callers decide
//! how it is seeded. Nothing here touches a process-wide random source.

use super::types::FullTensor;
use scirs2_core::ndarray_ext::{Array, IxDyn};
use scirs2_core::random::Rng;

impl FullTensor {
    /// Tensor with independent entries uniform in `[0, 1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_core::FullTensor;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let tensor = FullTensor::rand(&[2, 3], &mut rng);
    /// assert!(tensor.view().iter().all(|&x| (0.0..1.0).contains(&x)));
    /// ```
    pub fn rand<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        let total: usize = shape.iter().product();
        let data: Vec<f64> = (0..total).map(|_| rng.random::<f64>()).collect();
        Self::from_flat(shape, data)
    }

    /// Tensor with independent standard-normal entries
    ///
    /// Samples are produced in pairs with the Box-Muller transform.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_core::FullTensor;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let tensor = FullTensor::randn(&[8, 9, 10], &mut rng);
    /// assert_eq!(tensor.shape(), &[8, 9, 10]);
    /// ```
    pub fn randn<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        let total: usize = shape.iter().product();
        let mut data = Vec::with_capacity(total + 1);
        while data.len() < total {
            // u1 in (0, 1] keeps the logarithm finite
            let u1 = 1.0 - rng.random::<f64>();
            let u2 = rng.random::<f64>();
            let radius = (-2.0 * u1.ln()).sqrt();
            let angle = 2.0 * std::f64::consts::PI * u2;
            data.push(radius * angle.cos());
            data.push(radius * angle.sin());
        }
        data.truncate(total);
        Self::from_flat(shape, data)
    }

    fn from_flat(shape: &[usize], data: Vec<f64>) -> Self {
        let mut flat = data.into_iter();
        Self {
            data: Array::from_shape_fn(IxDyn(shape), |_| flat.next().unwrap_or(0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::random::{SeedableRng, StdRng};

    #[test]
    fn test_rand_is_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a = FullTensor::rand(&[3, 4], &mut rng1);
        let b = FullTensor::rand(&[3, 4], &mut rng2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_randn_moments() {
        let mut rng = StdRng::seed_from_u64(3);
        let tensor = FullTensor::randn(&[50, 40], &mut rng);
        let n = tensor.len() as f64;
        let mean = tensor.sum() / n;
        let var = tensor.view().iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.15, "variance {}", var);
    }

    #[test]
    fn test_randn_odd_length() {
        let mut rng = StdRng::seed_from_u64(5);
        let tensor = FullTensor::randn(&[3, 3, 3], &mut rng);
        assert_eq!(tensor.len(), 27);
        assert!(tensor.view().iter().all(|x| x.is_finite()));
    }
}
