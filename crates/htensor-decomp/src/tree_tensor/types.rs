//! Tree-based tensor storage, validation and accessors

use super::network::{core_modes, in_modes};
use htensor_core::{Mode, Result, TensorError};
use htensor_tree::DimensionTree;
use scirs2_core::ndarray_ext::ArrayD;
use std::fmt;
use std::sync::Arc;

/// Per-node state of a tree-based tensor
#[derive(Clone, Debug, PartialEq)]
pub enum NodeState {
    /// The node stores an explicit core
    Active(ArrayD<f64>),
    /// The node is represented through the core of its nearest active ancestor
    Inactive,
}

impl NodeState {
    /// True for [`NodeState::Active`]
    pub fn is_active(&self) -> bool {
        matches!(self, NodeState::Active(_))
    }

    /// Core of an active node
    pub fn core(&self) -> Option<&ArrayD<f64>> {
        match self {
            NodeState::Active(core) => Some(core),
            NodeState::Inactive => None,
        }
    }
}

/// Order-D tensor stored as one small core per active node of a dimension tree
///
/// # Core layout
///
/// The axes of the core of an active node `α` are, in order:
///
/// - for each child `c` of `α`: the bond of `c` if `c` is active, otherwise
///   (recursively) the axes contributed by `c`; a leaf contributes its
///   physical dimension
/// - the outgoing bond of `α`, unless `α` is the root
///
/// The root is always active and its rank is 1. The size of the outgoing
/// bond of an active node is its rank.
///
/// # Examples
///
/// ```
/// use htensor_decomp::{RandOptions, TreeBasedTensor};
/// use htensor_tree::DimensionTree;
/// use scirs2_core::random::{SeedableRng, StdRng};
/// use std::sync::Arc;
///
/// let tree = Arc::new(DimensionTree::linear(5).unwrap());
/// let mut rng = StdRng::seed_from_u64(0);
/// let options = RandOptions::new().with_shape(vec![3; 5]);
/// let tensor = TreeBasedTensor::rand(tree, &options, &mut rng).unwrap();
/// assert_eq!(tensor.full().unwrap().shape(), &[3, 3, 3, 3, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct TreeBasedTensor {
    tree: Arc<DimensionTree>,
    nodes: Vec<NodeState>,
    shape: Vec<usize>,
}

impl TreeBasedTensor {
    /// Build a tensor from per-node cores (`None` for inactive nodes)
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `shape` does not have one entry per dimension,
    /// `RankInconsistency` if a core does not follow the layout above.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::TreeBasedTensor;
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::ndarray_ext::{ArrayD, IxDyn};
    /// use std::sync::Arc;
    ///
    /// // x0 ⊗ x1 with a rank-1 root over two active leaves
    /// let tree = Arc::new(DimensionTree::linear(2).unwrap());
    /// let cores = vec![
    ///     Some(ArrayD::from_elem(IxDyn(&[1, 1]), 2.0)),
    ///     Some(ArrayD::ones(IxDyn(&[3, 1]))),
    ///     Some(ArrayD::ones(IxDyn(&[4, 1]))),
    /// ];
    /// let tensor = TreeBasedTensor::from_cores(tree, cores, vec![3, 4]).unwrap();
    /// assert_eq!(tensor.ranks(), vec![1, 1, 1]);
    /// assert!((tensor.sum().unwrap() - 24.0).abs() < 1e-12);
    /// ```
    pub fn from_cores(
        tree: Arc<DimensionTree>,
        cores: Vec<Option<ArrayD<f64>>>,
        shape: Vec<usize>,
    ) -> Result<Self> {
        let nodes = cores
            .into_iter()
            .map(|core| match core {
                Some(core) => NodeState::Active(core),
                None => NodeState::Inactive,
            })
            .collect();
        Self::from_parts(tree, nodes, shape)
    }

    pub(crate) fn from_parts(
        tree: Arc<DimensionTree>,
        nodes: Vec<NodeState>,
        shape: Vec<usize>,
    ) -> Result<Self> {
        let tensor = Self { tree, nodes, shape };
        tensor.rank_check()?;
        Ok(tensor)
    }

    /// Check that every core agrees with the tree, the shape and the ranks
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` for a shape of the wrong order, `RankInconsistency`
    /// for a missing root core or core axes of the wrong number or size.
    pub fn rank_check(&self) -> Result<()> {
        let nb_nodes = self.tree.nb_nodes();
        if self.nodes.len() != nb_nodes {
            return Err(TensorError::rank_inconsistency(format!(
                "{} node states for a tree of {} nodes",
                self.nodes.len(),
                nb_nodes
            )));
        }
        if self.shape.len() != self.tree.order() {
            return Err(TensorError::shape_mismatch(format!(
                "Shape {:?} given for a tree of order {}",
                self.shape,
                self.tree.order()
            )));
        }
        let root = self.tree.root();
        if !self.nodes[root].is_active() {
            return Err(TensorError::rank_inconsistency(format!(
                "Root {} must be active",
                root
            )));
        }

        let active = self.active_flags();
        for (alpha, state) in self.nodes.iter().enumerate() {
            let Some(core) = state.core() else { continue };
            let modes = core_modes(&self.tree, &active, alpha);
            if core.ndim() != modes.len() {
                return Err(TensorError::rank_inconsistency(format!(
                    "Core of node {} has order {}, expected {} for modes {:?}",
                    alpha,
                    core.ndim(),
                    modes.len(),
                    modes
                )));
            }
            for (ax, &mode) in modes.iter().enumerate() {
                let expected = match mode {
                    Mode::Dim(mu) => self.shape[mu],
                    Mode::Bond(c) if c == alpha => continue,
                    Mode::Bond(c) => self.out_rank(c),
                };
                if core.shape()[ax] != expected {
                    return Err(TensorError::rank_inconsistency(format!(
                        "Core of node {} has size {} along mode {}, expected {}",
                        alpha,
                        core.shape()[ax],
                        mode,
                        expected
                    )));
                }
            }
        }
        Ok(())
    }

    /// Underlying dimension tree
    pub fn tree(&self) -> &Arc<DimensionTree> {
        &self.tree
    }

    /// Size of each dimension
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn order(&self) -> usize {
        self.shape.len()
    }

    /// True when `node` stores a core
    pub fn is_active(&self, node: usize) -> bool {
        self.nodes.get(node).is_some_and(NodeState::is_active)
    }

    /// Active nodes, in increasing index
    pub fn active_nodes(&self) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&a| self.is_active(a)).collect()
    }

    /// State of every node
    pub fn node_states(&self) -> &[NodeState] {
        &self.nodes
    }

    /// Core of an active node
    pub fn core(&self, node: usize) -> Option<&ArrayD<f64>> {
        self.nodes.get(node).and_then(NodeState::core)
    }

    /// Axis labels of the core of `node` (whether or not it is active)
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is out of range.
    pub fn core_modes(&self, node: usize) -> Result<Vec<Mode>> {
        self.tree.check_node(node)?;
        Ok(core_modes(&self.tree, &self.active_flags(), node))
    }

    /// Rank of every node
    ///
    /// The root has rank 1. An active node has the size of its outgoing bond;
    /// an inactive node has the product of the sizes of the axes it
    /// contributes to its holder.
    pub fn ranks(&self) -> Vec<usize> {
        let active = self.active_flags();
        let root = self.tree.root();
        (0..self.nodes.len())
            .map(|alpha| {
                if alpha == root {
                    1
                } else if active[alpha] {
                    self.out_rank(alpha)
                } else {
                    in_modes(&self.tree, &active, alpha)
                        .into_iter()
                        .map(|m| match m {
                            Mode::Dim(mu) => self.shape[mu],
                            Mode::Bond(c) => self.out_rank(c),
                        })
                        .product()
                }
            })
            .collect()
    }

    /// Number of stored core entries
    pub fn storage(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(NodeState::core)
            .map(|core| core.len())
            .sum()
    }

    pub(crate) fn active_flags(&self) -> Vec<bool> {
        self.nodes.iter().map(NodeState::is_active).collect()
    }

    pub(crate) fn root_core_mut(&mut self) -> Option<&mut ArrayD<f64>> {
        match &mut self.nodes[self.tree.root()] {
            NodeState::Active(core) => Some(core),
            NodeState::Inactive => None,
        }
    }

    fn out_rank(&self, node: usize) -> usize {
        self.core(node)
            .and_then(|core| core.shape().last().copied())
            .unwrap_or(0)
    }
}

impl fmt::Display for TreeBasedTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeBasedTensor(order={}, shape={:?}, ranks={:?}, active={:?}, storage={})",
            self.order(),
            self.shape,
            self.ranks(),
            self.active_nodes(),
            self.storage()
        )
    }
}
