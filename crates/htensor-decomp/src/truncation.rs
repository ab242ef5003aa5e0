//! Hierarchical SVD truncation
//!
//! A [`Truncator`] turns a tree-based tensor, or a dense tensor together with
//! a target tree, into a tree-based tensor of reduced ranks. For every active
//! non-root node the singular values of the corresponding matricization are
//! truncated so that
//!
//! ```text
//! ‖x - x̃‖ <= tolerance · ‖x‖
//! ```
//!
//! The tolerance is split evenly over the truncated nodes:
//! `tol_node = tolerance / sqrt(#truncated nodes)`.
//!
//! # Sweeps
//!
//! - [`TruncationSweep::LeavesToRoot`]: every node's subspace is computed from
//!   the input, then all projections are applied at once.
//! - [`TruncationSweep::RootToLeaves`]: nodes are visited in pre-order and
//!   each truncation sees the result of the previous ones.
//!
//! Both sweeps work on an orthonormalized copy: the singular values of a
//! node's matricization are those of a small matrix propagated from the root,
//! so the dense tensor is never formed.

use crate::tree_tensor::network::CoreNetwork;
use crate::tree_tensor::{ActiveNodes, TreeBasedTensor};
use htensor_core::{thin_svd, FullTensor, LabeledTensor, Mode, Result, TensorError, ThinSvd};
use htensor_tree::DimensionTree;
use scirs2_core::ndarray_ext::{Array1, Array2};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order in which nodes are truncated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TruncationSweep {
    /// Top-down, each step on the already truncated tensor
    RootToLeaves,
    /// All subspaces from the input, then projected together
    #[default]
    LeavesToRoot,
}

/// Configuration of a hierarchical SVD
///
/// # Examples
///
/// ```
/// use htensor_decomp::{Truncator, TruncationSweep};
///
/// let truncator = Truncator::new(1e-6)
///     .unwrap()
///     .with_max_rank(10)
///     .unwrap()
///     .with_sweep(TruncationSweep::RootToLeaves);
/// assert_eq!(truncator.max_rank(), Some(10));
/// assert!(Truncator::new(1.5).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "TruncatorRepr", into = "TruncatorRepr")
)]
pub struct Truncator {
    tolerance: f64,
    max_rank: Option<usize>,
    sweep: TruncationSweep,
}

/// Serialized form, checked through the builder methods on the way in
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct TruncatorRepr {
    tolerance: f64,
    #[serde(default)]
    max_rank: Option<usize>,
    #[serde(default)]
    sweep: TruncationSweep,
}

#[cfg(feature = "serde")]
impl TryFrom<TruncatorRepr> for Truncator {
    type Error = TensorError;

    fn try_from(repr: TruncatorRepr) -> Result<Self> {
        let truncator = Truncator::new(repr.tolerance)?.with_sweep(repr.sweep);
        match repr.max_rank {
            Some(max_rank) => truncator.with_max_rank(max_rank),
            None => Ok(truncator),
        }
    }
}

#[cfg(feature = "serde")]
impl From<Truncator> for TruncatorRepr {
    fn from(truncator: Truncator) -> Self {
        TruncatorRepr {
            tolerance: truncator.tolerance,
            max_rank: truncator.max_rank,
            sweep: truncator.sweep,
        }
    }
}

impl Default for Truncator {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_rank: None,
            sweep: TruncationSweep::default(),
        }
    }
}

/// What [`Truncator::compress`] works on
#[derive(Clone, Debug)]
pub enum TruncationInput<'a> {
    /// A tree-based tensor, truncated on its own tree
    Tree(&'a TreeBasedTensor),
    /// A dense tensor compressed onto `tree` with the given active nodes
    Full {
        tensor: &'a FullTensor,
        tree: Arc<DimensionTree>,
        active: ActiveNodes,
    },
}

impl Truncator {
    /// Truncator with relative tolerance `tolerance` and no rank cap
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `0 <= tolerance < 1`.
    pub fn new(tolerance: f64) -> Result<Self> {
        Self::default().with_tolerance(tolerance)
    }

    /// Replace the relative tolerance
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `0 <= tolerance < 1`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || !(0.0..1.0).contains(&tolerance) {
            return Err(TensorError::invalid_argument(format!(
                "Tolerance must lie in [0, 1), got {}",
                tolerance
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Cap every truncated rank at `max_rank`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `max_rank == 0`.
    pub fn with_max_rank(mut self, max_rank: usize) -> Result<Self> {
        if max_rank == 0 {
            return Err(TensorError::invalid_argument("Maximal rank must be at least 1"));
        }
        self.max_rank = Some(max_rank);
        Ok(self)
    }

    /// Choose the sweep order
    pub fn with_sweep(mut self, sweep: TruncationSweep) -> Self {
        self.sweep = sweep;
        self
    }

    /// Relative tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Rank cap, if any
    pub fn max_rank(&self) -> Option<usize> {
        self.max_rank
    }

    /// Sweep order
    pub fn sweep(&self) -> TruncationSweep {
        self.sweep
    }

    /// Truncated SVD of a single matrix
    ///
    /// Keeps the fewest singular triplets whose discarded tail satisfies
    /// `sqrt(Σ_{i>=k} s_i²) <= tolerance · ‖s‖`, then applies the rank cap.
    /// At least one triplet is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::Truncator;
    /// use scirs2_core::ndarray_ext::array;
    ///
    /// let m = array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1e-9]];
    /// let svd = Truncator::new(1e-6).unwrap().trunc_svd(&m).unwrap();
    /// assert_eq!(svd.len(), 2);
    /// ```
    pub fn trunc_svd(&self, matrix: &Array2<f64>) -> Result<ThinSvd> {
        let svd = thin_svd(matrix)?;
        let k = self.select_rank(&svd.s, self.tolerance);
        Ok(svd.truncate(k))
    }

    /// Truncate a tree-based tensor on its own tree
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::{RandOptions, TreeBasedTensor, Truncator};
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    /// use std::sync::Arc;
    ///
    /// let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    /// let mut rng = StdRng::seed_from_u64(9);
    /// let x = TreeBasedTensor::rand(tree, &RandOptions::new(), &mut rng).unwrap();
    /// let sum = (&x + &x).unwrap();
    /// // x + x has doubled ranks; truncation recovers at most the ranks of x
    /// let y = Truncator::new(1e-10).unwrap().hsvd(&sum).unwrap();
    /// assert!(y.ranks().iter().zip(x.ranks()).all(|(&a, b)| a <= b));
    /// ```
    pub fn hsvd(&self, tensor: &TreeBasedTensor) -> Result<TreeBasedTensor> {
        let mut net = CoreNetwork::from_tensor(tensor)?;
        net.orthonormalize()?;
        let Some(tol_node) = self.node_tolerance(&net.active, net.tree.root()) else {
            return net.into_tensor();
        };
        match self.sweep {
            TruncationSweep::LeavesToRoot => self.leaves_to_root(&mut net, tol_node)?,
            TruncationSweep::RootToLeaves => self.root_to_leaves(&mut net, tol_node)?,
        }
        let truncated = net.into_tensor()?;
        log::debug!(
            "hsvd ({:?}, tol {:e}): ranks {:?} -> {:?}",
            self.sweep,
            self.tolerance,
            tensor.ranks(),
            truncated.ranks()
        );
        Ok(truncated)
    }

    /// Compress a dense tensor onto `tree`
    ///
    /// With the leaves-to-root sweep each active non-root node gets the
    /// leading left singular vectors of the matricization of `tensor` along
    /// its dimensions; the cores are the coefficients of these frames in one
    /// another. The root-to-leaves sweep converts exactly first and then
    /// truncates the tree-based result.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the tree order differs from the tensor order,
    /// `InvalidNode` for a custom active node outside the tree.
    pub fn hsvd_full(
        &self,
        tensor: &FullTensor,
        tree: Arc<DimensionTree>,
        active: &ActiveNodes,
    ) -> Result<TreeBasedTensor> {
        if tensor.order() != tree.order() {
            return Err(TensorError::shape_mismatch(format!(
                "Tensor of order {} compressed onto a tree of order {}",
                tensor.order(),
                tree.order()
            )));
        }
        if self.sweep == TruncationSweep::RootToLeaves {
            let exact = Truncator {
                tolerance: 0.0,
                max_rank: None,
                sweep: TruncationSweep::LeavesToRoot,
            };
            let converted = exact.hsvd_full(tensor, tree, active)?;
            return self.hsvd(&converted);
        }

        let flags = active.flags(&tree)?;
        let root = tree.root();
        let nb_nodes = tree.nb_nodes();
        let tol_node = self.node_tolerance(&flags, root).unwrap_or(0.0);

        let mut frames: Vec<Option<LabeledTensor>> = vec![None; nb_nodes];
        for alpha in (0..nb_nodes).filter(|&a| flags[a] && a != root) {
            let dims = tree.dims(alpha);
            let svd = thin_svd(&tensor.matricize(dims)?)?;
            let k = self.select_rank(&svd.s, tol_node);
            let mut modes: Vec<Mode> = dims.iter().map(|&mu| Mode::Dim(mu)).collect();
            modes.push(Mode::Bond(alpha));
            let mut shape: Vec<usize> = dims.iter().map(|&mu| tensor.shape()[mu]).collect();
            shape.push(k);
            frames[alpha] = Some(LabeledTensor::from_matrix(&svd.truncate(k).u, modes, &shape)?);
            log::debug!("node {}: rank {} of {}", alpha, k, svd.len());
        }

        let mut net = CoreNetwork {
            tree: Arc::clone(&tree),
            active: flags,
            cores: vec![None; nb_nodes],
            shape: tensor.shape().to_vec(),
        };
        let active_nodes: Vec<usize> = (0..nb_nodes).filter(|&a| net.active[a]).collect();
        for alpha in active_nodes {
            let mut core = match frames[alpha].clone() {
                Some(frame) => frame,
                None => LabeledTensor::new(
                    tensor.as_array().clone(),
                    (0..tensor.order()).map(Mode::Dim).collect(),
                )?,
            };
            for c in net.held_by(alpha) {
                let frame = frames[c].as_ref().ok_or_else(|| {
                    TensorError::rank_inconsistency(format!("No frame computed for node {}", c))
                })?;
                core = core.contract(frame)?;
            }
            net.cores[alpha] = Some(core);
        }
        net.into_tensor()
    }

    /// Truncate either kind of input
    pub fn compress(&self, input: TruncationInput<'_>) -> Result<TreeBasedTensor> {
        match input {
            TruncationInput::Tree(tensor) => self.hsvd(tensor),
            TruncationInput::Full {
                tensor,
                tree,
                active,
            } => self.hsvd_full(tensor, tree, &active),
        }
    }

    /// Per-node tolerance, `None` when only the root is active
    fn node_tolerance(&self, active: &[bool], root: usize) -> Option<f64> {
        let count = (0..active.len()).filter(|&a| active[a] && a != root).count();
        (count > 0).then(|| self.tolerance / (count as f64).sqrt())
    }

    fn select_rank(&self, s: &Array1<f64>, tolerance: f64) -> usize {
        let len = s.len();
        let total: f64 = s.iter().map(|x| x * x).sum();
        let mut k = if total == 0.0 {
            log::warn!("truncating a zero matrix, keeping rank 1");
            1
        } else if tolerance == 0.0 {
            len
        } else {
            let bound = tolerance * tolerance * total;
            let mut tail = 0.0;
            let mut k = len;
            for i in (0..len).rev() {
                tail += s[i] * s[i];
                if tail > bound {
                    break;
                }
                k = i;
            }
            k
        };
        if let Some(max_rank) = self.max_rank {
            k = k.min(max_rank);
        }
        k.clamp(1, len.max(1))
    }

    fn leaves_to_root(&self, net: &mut CoreNetwork, tol_node: f64) -> Result<()> {
        let svds = complement_svds(net)?;
        for (beta, svd) in svds.into_iter().enumerate() {
            let Some(svd) = svd else { continue };
            let k = self.select_rank(&svd.s, tol_node);
            log::debug!("node {}: rank {} of {}", beta, k, svd.len());
            project(net, beta, &svd.truncate(k).u)?;
        }
        Ok(())
    }

    fn root_to_leaves(&self, net: &mut CoreNetwork, tol_node: f64) -> Result<()> {
        let tree = Arc::clone(&net.tree);
        let root = tree.root();
        let mut complements: Vec<Option<LabeledTensor>> = vec![None; tree.nb_nodes()];
        complements[root] = Some(net.core(root)?.clone());

        for alpha in tree.pre_order() {
            let Some(mut c) = complements[alpha].take() else {
                continue;
            };
            let held = net.held_by(alpha);
            for &beta in &held {
                let svd = thin_svd(&c.matricize(&[Mode::Bond(beta)])?)?;
                let k = self.select_rank(&svd.s, tol_node);
                log::debug!("node {}: rank {} of {}", beta, k, svd.len());
                let u = svd.truncate(k).u;
                c = c.mode_product(Mode::Bond(beta), &u.t().to_owned())?;
                project(net, beta, &u)?;
            }
            for &beta in &held {
                if net.held_by(beta).is_empty() {
                    continue;
                }
                let b = thin_svd(&c.matricize(&[Mode::Bond(beta)])?)?.u_s();
                complements[beta] =
                    Some(net.core(beta)?.mode_product(Mode::Bond(beta), &b.t().to_owned())?);
            }
        }
        Ok(())
    }
}

/// SVD of the complement factor of every active non-root node
///
/// Requires an orthonormalized network. The singular values are those of the
/// matricization of the whole tensor along the node's dimensions.
fn complement_svds(net: &CoreNetwork) -> Result<Vec<Option<ThinSvd>>> {
    let root = net.tree.root();
    let mut svds: Vec<Option<ThinSvd>> = vec![None; net.tree.nb_nodes()];
    for alpha in net.tree.pre_order() {
        if !net.active[alpha] {
            continue;
        }
        let held = net.held_by(alpha);
        if held.is_empty() {
            continue;
        }
        let w = if alpha == root {
            net.core(alpha)?.clone()
        } else {
            let b = svds[alpha]
                .as_ref()
                .ok_or_else(|| {
                    TensorError::rank_inconsistency(format!("Node {} visited before its holder", alpha))
                })?
                .u_s();
            net.core(alpha)?.mode_product(Mode::Bond(alpha), &b.t().to_owned())?
        };
        for beta in held {
            svds[beta] = Some(thin_svd(&w.matricize(&[Mode::Bond(beta)])?)?);
        }
    }
    Ok(svds)
}

/// Restrict the bond above `beta` to the columns of `u`
fn project(net: &mut CoreNetwork, beta: usize, u: &Array2<f64>) -> Result<()> {
    let ut = u.t().to_owned();
    let h = net.holder(beta)?;
    let core_beta = net.take_core(beta)?;
    net.cores[beta] = Some(core_beta.mode_product(Mode::Bond(beta), &ut)?);
    let core_h = net.take_core(h)?;
    net.cores[h] = Some(core_h.mode_product(Mode::Bond(beta), &ut)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_tensor::RandOptions;
    use scirs2_core::ndarray_ext::array;
    use scirs2_core::random::{SeedableRng, StdRng};

    fn random_tree_tensor(seed: u64) -> TreeBasedTensor {
        let tree = Arc::new(DimensionTree::balanced(5).unwrap());
        let mut rng = StdRng::seed_from_u64(seed);
        let options = RandOptions::new().with_shape(vec![3, 4, 3, 4, 3]);
        let x = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
        let y = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();
        (&x - &y.scale(0.5)).unwrap()
    }

    fn relative_error(x: &FullTensor, y: &TreeBasedTensor) -> f64 {
        (x - &y.full().unwrap()).norm() / x.norm()
    }

    #[test]
    fn test_rank_rule() {
        let m = array![
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.5]
        ];
        let len = |t: Truncator| t.trunc_svd(&m).unwrap().len();
        assert_eq!(len(Truncator::new(0.0).unwrap()), 4);
        assert_eq!(len(Truncator::new(0.2).unwrap()), 3);
        assert_eq!(len(Truncator::new(0.3).unwrap()), 2);
        assert_eq!(len(Truncator::new(0.0).unwrap().with_max_rank(2).unwrap()), 2);
        assert_eq!(len(Truncator::new(0.99).unwrap()), 1);
    }

    #[test]
    fn test_zero_matrix_keeps_one() {
        let m = Array2::<f64>::zeros((3, 2));
        assert_eq!(Truncator::new(0.1).unwrap().trunc_svd(&m).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Truncator::new(-0.1).is_err());
        assert!(Truncator::new(1.0).is_err());
        assert!(Truncator::new(f64::NAN).is_err());
        assert!(Truncator::default().with_max_rank(0).is_err());
        let t = Truncator::default();
        assert_eq!(t.tolerance(), 1e-8);
        assert_eq!(t.max_rank(), None);
        assert_eq!(t.sweep(), TruncationSweep::LeavesToRoot);
    }

    #[test]
    fn test_hsvd_error_bound_both_sweeps() {
        let x = random_tree_tensor(1);
        let xf = x.full().unwrap();
        for sweep in [TruncationSweep::LeavesToRoot, TruncationSweep::RootToLeaves] {
            for tol in [1e-1, 1e-2, 1e-4] {
                let t = Truncator::new(tol).unwrap().with_sweep(sweep);
                let y = t.hsvd(&x).unwrap();
                let err = relative_error(&xf, &y);
                assert!(err <= tol * (1.0 + 1e-8), "{:?} tol {}: error {}", sweep, tol, err);
            }
        }
    }

    #[test]
    fn test_hsvd_recovers_low_rank() {
        let x = random_tree_tensor(2);
        let doubled = (&x + &x).unwrap();
        let y = Truncator::new(1e-12).unwrap().hsvd(&doubled).unwrap();
        let expected = x.full().unwrap().scale(2.0);
        assert!(relative_error(&expected, &y) < 1e-10);
        for (&a, b) in y.ranks().iter().zip(x.ranks()) {
            assert!(a <= b);
        }
    }

    #[test]
    fn test_hsvd_respects_max_rank() {
        let x = random_tree_tensor(3);
        for sweep in [TruncationSweep::LeavesToRoot, TruncationSweep::RootToLeaves] {
            let t = Truncator::new(0.0)
                .unwrap()
                .with_max_rank(2)
                .unwrap()
                .with_sweep(sweep);
            let y = t.hsvd(&x).unwrap();
            for alpha in y.active_nodes() {
                assert!(y.ranks()[alpha] <= 2);
            }
        }
    }

    #[test]
    fn test_hsvd_full_exact_and_bounded() {
        let x = random_tree_tensor(4);
        let xf = x.full().unwrap();
        let exact = Truncator::new(0.0)
            .unwrap()
            .hsvd_full(&xf, Arc::clone(x.tree()), &ActiveNodes::All)
            .unwrap();
        assert!(relative_error(&xf, &exact) < 1e-10);

        let mut rng = StdRng::seed_from_u64(5);
        let dense = FullTensor::randn(&[3, 4, 3, 4, 3], &mut rng);
        for sweep in [TruncationSweep::LeavesToRoot, TruncationSweep::RootToLeaves] {
            let t = Truncator::new(0.3).unwrap().with_sweep(sweep);
            let y = t
                .hsvd_full(&dense, Arc::clone(x.tree()), &ActiveNodes::Internal)
                .unwrap();
            assert!(relative_error(&dense, &y) <= 0.3 * (1.0 + 1e-8));
        }
    }

    #[test]
    fn test_hsvd_full_order_mismatch() {
        let tree = Arc::new(DimensionTree::linear(3).unwrap());
        let dense = FullTensor::ones(&[2, 2]);
        assert!(matches!(
            Truncator::default().hsvd_full(&dense, tree, &ActiveNodes::All),
            Err(TensorError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_larger_tolerance_never_larger_ranks() {
        let x = random_tree_tensor(6);
        let xf = x.full().unwrap();
        let tols = [1e-6, 1e-3, 1e-2, 1e-1, 0.5];
        let mut previous: Option<(Vec<usize>, Vec<usize>)> = None;
        for tol in tols {
            let t = Truncator::new(tol).unwrap();
            let from_tree = t.hsvd(&x).unwrap().ranks();
            let from_full = t
                .hsvd_full(&xf, Arc::clone(x.tree()), &ActiveNodes::All)
                .unwrap()
                .ranks();
            if let Some((prev_tree, prev_full)) = &previous {
                assert!(from_tree.iter().zip(prev_tree).all(|(a, b)| a <= b));
                assert!(from_full.iter().zip(prev_full).all(|(a, b)| a <= b));
            }
            previous = Some((from_tree, from_full));
        }
    }

    #[test]
    fn test_smaller_max_rank_never_smaller_error() {
        // one truncated node: root and the leaf of x0
        let tree = Arc::new(DimensionTree::linear(2).unwrap());
        let active = ActiveNodes::Custom(vec![tree.dim2ind()[0]]);
        let mut rng = StdRng::seed_from_u64(7);
        let dense = FullTensor::rand(&[6, 7], &mut rng);
        let mut previous = f64::INFINITY;
        for r in 1..=6 {
            let t = Truncator::new(0.0).unwrap().with_max_rank(r).unwrap();
            let y = t.hsvd_full(&dense, Arc::clone(&tree), &active).unwrap();
            let err = relative_error(&dense, &y);
            assert!(err <= previous + 1e-12);
            previous = err;
        }
        assert!(previous < 1e-10);
    }

    #[test]
    fn test_compress_dispatch() {
        let x = random_tree_tensor(8);
        let t = Truncator::new(1e-10).unwrap();
        let from_tree = t.compress(TruncationInput::Tree(&x)).unwrap();
        let xf = x.full().unwrap();
        let from_full = t
            .compress(TruncationInput::Full {
                tensor: &xf,
                tree: Arc::clone(x.tree()),
                active: ActiveNodes::All,
            })
            .unwrap();
        assert!(relative_error(&xf, &from_tree) < 1e-9);
        assert!(relative_error(&xf, &from_full) < 1e-9);
    }

    #[test]
    fn test_zero_tensor() {
        let x = random_tree_tensor(9).scale(0.0);
        let y = Truncator::new(0.1).unwrap().hsvd(&x).unwrap();
        assert!(y.ranks().iter().enumerate().all(|(a, &r)| !y.is_active(a) || r == 1));
        assert_eq!(y.norm().unwrap(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_settings() {
        let truncator: Truncator =
            serde_json::from_str(r#"{"tolerance":1e-3,"max_rank":4,"sweep":"RootToLeaves"}"#)
                .unwrap();
        assert_eq!(truncator.tolerance(), 1e-3);
        assert_eq!(truncator.max_rank(), Some(4));
        assert_eq!(truncator.sweep(), TruncationSweep::RootToLeaves);

        let json = serde_json::to_string(&truncator).unwrap();
        assert_eq!(serde_json::from_str::<Truncator>(&json).unwrap(), truncator);

        for bad in [
            r#"{"tolerance":1.5}"#,
            r#"{"tolerance":-0.1}"#,
            r#"{"tolerance":1e-3,"max_rank":0}"#,
        ] {
            assert!(serde_json::from_str::<Truncator>(bad).is_err(), "{}", bad);
        }
    }
}
