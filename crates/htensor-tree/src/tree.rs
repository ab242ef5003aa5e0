//! Dimension tree storage and traversal
//!
//! Nodes live in a flat arena and refer to each other by index. Parent and
//! child links, the dimension set of every node and node levels are computed
//! once at construction and never change afterwards.

use htensor_core::{Result, TensorError};
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hierarchical partition of the dimensions `{0, .., D-1}`
///
/// Every leaf carries exactly one dimension; an internal node covers the
/// union of its children's dimensions and the root covers all of them.
///
/// # Examples
///
/// ```
/// use htensor_tree::DimensionTree;
///
/// let tree = DimensionTree::linear(5).unwrap();
/// assert_eq!(tree.nb_nodes(), 9);
/// assert_eq!(tree.order(), 5);
/// assert_eq!(tree.dims(tree.root()), &[0, 1, 2, 3, 4]);
/// assert_eq!(tree.leaves().len(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "TreeRepr", into = "TreeRepr")
)]
pub struct DimensionTree {
    root: usize,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    dims: Vec<Vec<usize>>,
    leaf_dim: Vec<Option<usize>>,
    dim2ind: Vec<usize>,
    level: Vec<usize>,
    added_leaf: Option<usize>,
}

/// Serialized form: only the arrays `from_children` is built from
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct TreeRepr {
    root: usize,
    children: Vec<Vec<usize>>,
    leaf_dims: Vec<Option<usize>>,
    #[serde(default)]
    added_leaf: Option<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<TreeRepr> for DimensionTree {
    type Error = TensorError;

    fn try_from(repr: TreeRepr) -> Result<Self> {
        let tree = DimensionTree::from_children(repr.root, repr.children, repr.leaf_dims)?;
        match repr.added_leaf {
            Some(leaf) => tree.with_added_leaf(leaf),
            None => Ok(tree),
        }
    }
}

#[cfg(feature = "serde")]
impl From<DimensionTree> for TreeRepr {
    fn from(tree: DimensionTree) -> Self {
        TreeRepr {
            root: tree.root,
            children: tree.children,
            leaf_dims: tree.leaf_dim,
            added_leaf: tree.added_leaf,
        }
    }
}

impl DimensionTree {
    /// Build a tree from explicit child lists
    ///
    /// `children[α]` lists the children of node `α` in order and
    /// `leaf_dims[α]` is the dimension carried by `α` when it is a leaf.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless the lists describe a single connected tree
    /// rooted at `root` whose leaves carry each of `0..D-1` exactly once and
    /// whose internal nodes carry no dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_tree::DimensionTree;
    ///
    /// // root 0 with leaves 1 (dim 1) and 2 (dim 0)
    /// let tree = DimensionTree::from_children(0, vec![vec![1, 2], vec![], vec![]], vec![None, Some(1), Some(0)]).unwrap();
    /// assert_eq!(tree.dim2ind(), &[2, 1]);
    /// ```
    pub fn from_children(
        root: usize,
        children: Vec<Vec<usize>>,
        leaf_dims: Vec<Option<usize>>,
    ) -> Result<Self> {
        let nb_nodes = children.len();
        if nb_nodes == 0 {
            return Err(TensorError::invalid_argument("A tree needs at least one node"));
        }
        if leaf_dims.len() != nb_nodes {
            return Err(TensorError::invalid_argument(format!(
                "{} child lists but {} leaf dimensions",
                nb_nodes,
                leaf_dims.len()
            )));
        }
        if root >= nb_nodes {
            return Err(TensorError::invalid_argument(format!(
                "Root {} outside a tree of {} nodes",
                root, nb_nodes
            )));
        }

        let mut parent = vec![None; nb_nodes];
        for (alpha, kids) in children.iter().enumerate() {
            for &child in kids {
                if child >= nb_nodes || child == root || child == alpha {
                    return Err(TensorError::invalid_argument(format!(
                        "Node {} cannot be a child of node {}",
                        child, alpha
                    )));
                }
                if parent[child].is_some() {
                    return Err(TensorError::invalid_argument(format!(
                        "Node {} has more than one parent",
                        child
                    )));
                }
                parent[child] = Some(alpha);
            }
        }

        // Breadth-first from the root: levels and connectivity
        let mut level = vec![usize::MAX; nb_nodes];
        level[root] = 0;
        let mut queue = VecDeque::from([root]);
        let mut bfs = Vec::with_capacity(nb_nodes);
        while let Some(alpha) = queue.pop_front() {
            bfs.push(alpha);
            for &child in &children[alpha] {
                level[child] = level[alpha] + 1;
                queue.push_back(child);
            }
        }
        if bfs.len() != nb_nodes {
            return Err(TensorError::invalid_argument(format!(
                "Only {} of {} nodes are reachable from root {}",
                bfs.len(),
                nb_nodes,
                root
            )));
        }

        let order = children.iter().filter(|kids| kids.is_empty()).count();
        let mut dim2ind = vec![usize::MAX; order];
        for alpha in 0..nb_nodes {
            match (children[alpha].is_empty(), leaf_dims[alpha]) {
                (true, Some(mu)) if mu < order && dim2ind[mu] == usize::MAX => dim2ind[mu] = alpha,
                (true, Some(mu)) => {
                    return Err(TensorError::invalid_argument(format!(
                        "Leaf {} carries dimension {}, which is repeated or not below the order {}",
                        alpha, mu, order
                    )))
                }
                (true, None) => {
                    return Err(TensorError::invalid_argument(format!(
                        "Leaf {} carries no dimension",
                        alpha
                    )))
                }
                (false, Some(mu)) => {
                    return Err(TensorError::invalid_argument(format!(
                        "Internal node {} cannot carry dimension {}",
                        alpha, mu
                    )))
                }
                (false, None) => {}
            }
        }

        // Reverse breadth-first order visits children before parents
        let mut dims: Vec<Vec<usize>> = vec![Vec::new(); nb_nodes];
        for &alpha in bfs.iter().rev() {
            let mut set: Vec<usize> = match leaf_dims[alpha] {
                Some(mu) => vec![mu],
                None => children[alpha]
                    .iter()
                    .flat_map(|&c| dims[c].iter().copied())
                    .collect(),
            };
            set.sort_unstable();
            dims[alpha] = set;
        }

        Ok(Self {
            root,
            parent,
            children,
            dims,
            leaf_dim: leaf_dims,
            dim2ind,
            level,
            added_leaf: None,
        })
    }

    /// Mark `leaf` as the leaf added under the root by re-rooting at a leaf
    ///
    /// The next re-rooting folds it back into the root, which becomes a leaf
    /// again.
    pub(crate) fn with_added_leaf(mut self, leaf: usize) -> Result<Self> {
        let last = self.nb_nodes() - 1;
        if leaf != last || self.parent[leaf] != Some(self.root) || !self.is_leaf(leaf) {
            return Err(TensorError::invalid_argument(format!(
                "Node {} is not the last node or not a leaf child of root {}",
                leaf, self.root
            )));
        }
        self.added_leaf = Some(leaf);
        Ok(self)
    }

    /// Number of nodes
    pub fn nb_nodes(&self) -> usize {
        self.parent.len()
    }

    /// Number of dimensions (leaves)
    pub fn order(&self) -> usize {
        self.dim2ind.len()
    }

    /// Root node
    pub fn root(&self) -> usize {
        self.root
    }

    /// Parent of `node`, `None` for the root
    ///
    /// # Panics
    ///
    /// Panics if `node >= nb_nodes()`; the same holds for every accessor taking a node.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Ordered children of `node`
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// Sorted dimensions covered by `node`
    pub fn dims(&self, node: usize) -> &[usize] {
        &self.dims[node]
    }

    /// True when `node` has no children
    pub fn is_leaf(&self, node: usize) -> bool {
        self.children[node].is_empty()
    }

    /// Dimension carried by a leaf
    pub fn leaf_dim(&self, node: usize) -> Option<usize> {
        self.leaf_dim[node]
    }

    /// Leaf node of each dimension
    pub fn dim2ind(&self) -> &[usize] {
        &self.dim2ind
    }

    /// Distance from the root
    pub fn level(&self, node: usize) -> usize {
        self.level[node]
    }

    /// Largest level in the tree
    pub fn depth(&self) -> usize {
        self.level.iter().copied().max().unwrap_or(0)
    }

    /// Leaves, in increasing node index
    pub fn leaves(&self) -> Vec<usize> {
        (0..self.nb_nodes()).filter(|&a| self.is_leaf(a)).collect()
    }

    /// Non-leaf nodes, in increasing node index
    pub fn internal_nodes(&self) -> Vec<usize> {
        (0..self.nb_nodes()).filter(|&a| !self.is_leaf(a)).collect()
    }

    /// Depth-first order, parents before children
    pub fn pre_order(&self) -> Vec<usize> {
        self.pre_order_from(self.root)
    }

    /// Depth-first order, children before parents
    pub fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nb_nodes());
        let mut stack = vec![(self.root, false)];
        while let Some((alpha, expanded)) = stack.pop() {
            if expanded {
                order.push(alpha);
            } else {
                stack.push((alpha, true));
                for &c in self.children[alpha].iter().rev() {
                    stack.push((c, false));
                }
            }
        }
        order
    }

    /// Ancestors of `node`, from its parent up to the root
    pub fn ascendants(&self, node: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut current = self.parent[node];
        while let Some(alpha) = current {
            out.push(alpha);
            current = self.parent[alpha];
        }
        out
    }

    /// Descendants of `node` in depth-first order, `node` excluded
    pub fn descendants(&self, node: usize) -> Vec<usize> {
        let mut out = self.pre_order_from(node);
        out.remove(0);
        out
    }

    /// Nodes at the given level, in increasing node index
    pub fn nodes_with_level(&self, level: usize) -> Vec<usize> {
        (0..self.nb_nodes())
            .filter(|&a| self.level[a] == level)
            .collect()
    }

    /// Other children of the parent of `node`
    pub fn sibling(&self, node: usize) -> Vec<usize> {
        match self.parent[node] {
            Some(p) => self.children[p]
                .iter()
                .copied()
                .filter(|&c| c != node)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Position of `node` among its parent's children
    pub fn child_number(&self, node: usize) -> Option<usize> {
        let p = self.parent[node]?;
        self.children[p].iter().position(|&c| c == node)
    }

    /// Leaf added under the root when the tree was re-rooted at a leaf
    ///
    /// It always has the largest node index and carries the dimension of
    /// the former leaf that is now the root.
    pub fn added_leaf(&self) -> Option<usize> {
        self.added_leaf
    }

    /// Check that `node` exists
    ///
    /// # Errors
    ///
    /// `InvalidNode` otherwise.
    pub fn check_node(&self, node: usize) -> Result<()> {
        TensorError::check_node(node, self.nb_nodes())
    }

    pub(crate) fn pre_order_from(&self, node: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(alpha) = stack.pop() {
            order.push(alpha);
            stack.extend(self.children[alpha].iter().rev());
        }
        order
    }

    pub(crate) fn leaf_dims(&self) -> &[Option<usize>] {
        &self.leaf_dim
    }

    pub(crate) fn all_children(&self) -> &[Vec<usize>] {
        &self.children
    }
}
