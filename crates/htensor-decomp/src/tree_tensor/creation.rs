//! Random tree-based tensors and active-node policies

use super::network::core_modes;
use super::types::{NodeState, TreeBasedTensor};
use htensor_core::{Mode, Result, TensorError};
use htensor_tree::DimensionTree;
use scirs2_core::ndarray_ext::{Array, IxDyn};
use scirs2_core::random::Rng;
use std::sync::Arc;

/// Which nodes of a tree store an explicit core
///
/// The root is active under every policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ActiveNodes {
    /// Every node
    #[default]
    All,
    /// Every non-leaf node; leaves are carried by their parents
    Internal,
    /// Every non-leaf node plus the leaf of dimension 0, which gives the
    /// tensor-train layout on a linear tree
    TensorTrain,
    /// An explicit list of nodes
    Custom(Vec<usize>),
}

impl ActiveNodes {
    /// Non-leaf nodes plus each leaf with probability 1/2
    pub fn random<R: Rng + ?Sized>(tree: &DimensionTree, rng: &mut R) -> Self {
        let nodes = (0..tree.nb_nodes())
            .filter(|&a| !tree.is_leaf(a) || rng.random::<f64>() < 0.5)
            .collect();
        ActiveNodes::Custom(nodes)
    }

    /// Per-node active flags on `tree`
    ///
    /// # Errors
    ///
    /// `InvalidNode` if a custom list names a node outside the tree.
    pub fn flags(&self, tree: &DimensionTree) -> Result<Vec<bool>> {
        let nb_nodes = tree.nb_nodes();
        let mut flags = match self {
            ActiveNodes::All => vec![true; nb_nodes],
            ActiveNodes::Internal => (0..nb_nodes).map(|a| !tree.is_leaf(a)).collect(),
            ActiveNodes::TensorTrain => {
                let first_leaf = tree.dim2ind()[0];
                (0..nb_nodes)
                    .map(|a| !tree.is_leaf(a) || a == first_leaf)
                    .collect()
            }
            ActiveNodes::Custom(nodes) => {
                let mut flags = vec![false; nb_nodes];
                for &alpha in nodes {
                    tree.check_node(alpha)?;
                    flags[alpha] = true;
                }
                flags
            }
        };
        flags[tree.root()] = true;
        Ok(flags)
    }
}

/// Optional arguments of [`TreeBasedTensor::rand`]
///
/// Unset ranks are drawn uniformly in `[1, 4]` (the root always has rank 1),
/// unset sizes uniformly in `[2, 5]`, and every node is active by default.
///
/// # Examples
///
/// ```
/// use htensor_decomp::{ActiveNodes, RandOptions};
///
/// let options = RandOptions::new()
///     .with_shape(vec![3; 4])
///     .with_active(ActiveNodes::TensorTrain);
/// assert_eq!(options.shape(), Some(&[3, 3, 3, 3][..]));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RandOptions {
    ranks: Option<Vec<usize>>,
    shape: Option<Vec<usize>>,
    active: ActiveNodes,
}

impl RandOptions {
    /// All defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank of each node, indexed by node (ignored for inactive nodes)
    pub fn with_ranks(mut self, ranks: Vec<usize>) -> Self {
        self.ranks = Some(ranks);
        self
    }

    /// Size of each dimension
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Active-node policy
    pub fn with_active(mut self, active: ActiveNodes) -> Self {
        self.active = active;
        self
    }

    /// Requested ranks
    pub fn ranks(&self) -> Option<&[usize]> {
        self.ranks.as_deref()
    }

    /// Requested shape
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// Active-node policy
    pub fn active(&self) -> &ActiveNodes {
        &self.active
    }
}

impl TreeBasedTensor {
    /// Tensor with core entries uniform in `[0, 1)`
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the shape does not have one entry per dimension
    /// - `InvalidArgument` for ranks of the wrong length, a root rank other
    ///   than 1, or a zero rank or size
    /// - `InvalidNode` for a custom active node outside the tree
    pub fn rand<R: Rng + ?Sized>(
        tree: Arc<DimensionTree>,
        options: &RandOptions,
        rng: &mut R,
    ) -> Result<Self> {
        let nb_nodes = tree.nb_nodes();
        let root = tree.root();

        let shape = match options.shape() {
            Some(shape) if shape.len() != tree.order() => {
                return Err(TensorError::shape_mismatch(format!(
                    "Shape {:?} given for a tree of order {}",
                    shape,
                    tree.order()
                )))
            }
            Some(shape) => shape.to_vec(),
            None => (0..tree.order()).map(|_| rng.random_range(2..=5)).collect(),
        };
        if shape.contains(&0) {
            return Err(TensorError::invalid_argument(format!(
                "Sizes must be positive, got {:?}",
                shape
            )));
        }

        let ranks = match options.ranks() {
            Some(ranks) if ranks.len() != nb_nodes => {
                return Err(TensorError::invalid_argument(format!(
                    "{} ranks given for a tree of {} nodes",
                    ranks.len(),
                    nb_nodes
                )))
            }
            Some(ranks) if ranks[root] != 1 => {
                return Err(TensorError::invalid_argument(format!(
                    "Root rank must be 1, got {}",
                    ranks[root]
                )))
            }
            Some(ranks) => ranks.to_vec(),
            None => (0..nb_nodes)
                .map(|a| if a == root { 1 } else { rng.random_range(1..=4) })
                .collect(),
        };

        let active = options.active().flags(&tree)?;
        if let Some(alpha) = (0..nb_nodes).find(|&a| active[a] && ranks[a] == 0) {
            return Err(TensorError::invalid_argument(format!(
                "Active node {} has rank 0",
                alpha
            )));
        }

        let mut nodes = Vec::with_capacity(nb_nodes);
        for alpha in 0..nb_nodes {
            if !active[alpha] {
                nodes.push(NodeState::Inactive);
                continue;
            }
            let core_shape: Vec<usize> = core_modes(&tree, &active, alpha)
                .into_iter()
                .map(|m| match m {
                    Mode::Dim(mu) => shape[mu],
                    Mode::Bond(c) => ranks[c],
                })
                .collect();
            let core = Array::from_shape_fn(IxDyn(&core_shape), |_| rng.random::<f64>());
            nodes.push(NodeState::Active(core));
        }
        let tensor = Self::from_parts(tree, nodes, shape)?;
        log::debug!("random tree-based tensor: {}", tensor);
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::random::{SeedableRng, StdRng};

    #[test]
    fn test_rand_defaults() {
        let tree = Arc::new(DimensionTree::balanced(6).unwrap());
        let mut rng = StdRng::seed_from_u64(1);
        let tensor = TreeBasedTensor::rand(tree.clone(), &RandOptions::new(), &mut rng).unwrap();
        assert_eq!(tensor.active_nodes().len(), tree.nb_nodes());
        assert!(tensor.shape().iter().all(|&n| (2..=5).contains(&n)));
        let ranks = tensor.ranks();
        assert_eq!(ranks[tree.root()], 1);
        assert!(ranks.iter().all(|&r| (1..=4).contains(&r)));
    }

    #[test]
    fn test_rand_with_explicit_ranks() {
        let tree = Arc::new(DimensionTree::linear(4).unwrap());
        let mut rng = StdRng::seed_from_u64(2);
        let ranks = vec![1, 2, 3, 2, 2, 3, 2];
        let options = RandOptions::new()
            .with_ranks(ranks.clone())
            .with_shape(vec![2, 3, 4, 5]);
        let tensor = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();
        assert_eq!(tensor.ranks(), ranks);
        assert!(tensor
            .core(0)
            .unwrap()
            .iter()
            .all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn test_rand_tensor_train_layout() {
        let tree = Arc::new(DimensionTree::linear(4).unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        let options = RandOptions::new()
            .with_shape(vec![3; 4])
            .with_active(ActiveNodes::TensorTrain);
        let tensor = TreeBasedTensor::rand(tree.clone(), &options, &mut rng).unwrap();
        // root, three internal nodes, and the leaf of x0
        assert_eq!(tensor.active_nodes(), vec![0, 1, 2, 3]);
        assert_eq!(tree.dim2ind()[0], 3);
        // inactive leaves have rank equal to their size
        assert_eq!(tensor.ranks()[4], 3);
    }

    #[test]
    fn test_rand_rejects_bad_options() {
        let tree = Arc::new(DimensionTree::linear(3).unwrap());
        let mut rng = StdRng::seed_from_u64(4);
        let bad_root = RandOptions::new().with_ranks(vec![2, 1, 1, 1, 1]);
        assert!(matches!(
            TreeBasedTensor::rand(tree.clone(), &bad_root, &mut rng),
            Err(TensorError::InvalidArgument(_))
        ));
        let short = RandOptions::new().with_ranks(vec![1, 1]);
        assert!(TreeBasedTensor::rand(tree.clone(), &short, &mut rng).is_err());
        let zero = RandOptions::new().with_ranks(vec![1, 0, 1, 1, 1]);
        assert!(TreeBasedTensor::rand(tree.clone(), &zero, &mut rng).is_err());
        let shape = RandOptions::new().with_shape(vec![2, 2]);
        assert!(matches!(
            TreeBasedTensor::rand(tree.clone(), &shape, &mut rng),
            Err(TensorError::ShapeMismatch(_))
        ));
        let node = RandOptions::new().with_active(ActiveNodes::Custom(vec![0, 17]));
        assert!(matches!(
            TreeBasedTensor::rand(tree, &node, &mut rng),
            Err(TensorError::InvalidNode { node: 17, .. })
        ));
    }

    #[test]
    fn test_active_node_policies() {
        let tree = DimensionTree::linear(3).unwrap();
        assert_eq!(
            ActiveNodes::Internal.flags(&tree).unwrap(),
            vec![true, true, false, false, false]
        );
        assert_eq!(
            ActiveNodes::Custom(vec![3]).flags(&tree).unwrap(),
            vec![true, false, false, true, false]
        );
        let mut rng = StdRng::seed_from_u64(5);
        let flags = ActiveNodes::random(&tree, &mut rng).flags(&tree).unwrap();
        assert!(flags[0] && flags[1]);
    }
}
