//! Sub-trees and re-rooting

use crate::tree::DimensionTree;
use htensor_core::{Result, TensorError};

impl DimensionTree {
    /// Sub-tree rooted at `node`
    ///
    /// Returns the new tree together with the original index of each of its
    /// nodes. Nodes are renumbered in pre-order and the dimensions of `node`
    /// are renumbered `0..k` in increasing order.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_tree::DimensionTree;
    ///
    /// let tree = DimensionTree::linear(4).unwrap();
    /// let (sub, nodes) = tree.sub_dimension_tree(2).unwrap();
    /// assert_eq!(sub.order(), 2);
    /// assert_eq!(nodes, vec![2, 3, 4]);
    /// ```
    pub fn sub_dimension_tree(&self, node: usize) -> Result<(DimensionTree, Vec<usize>)> {
        self.check_node(node)?;
        let nodes = self.pre_order_from(node);
        let mut new_index = vec![usize::MAX; self.nb_nodes()];
        for (i, &alpha) in nodes.iter().enumerate() {
            new_index[alpha] = i;
        }
        let dims = self.dims(node);
        let children = nodes
            .iter()
            .map(|&alpha| self.children(alpha).iter().map(|&c| new_index[c]).collect())
            .collect();
        let leaf_dims = nodes
            .iter()
            .map(|&alpha| {
                self.leaf_dim(alpha)
                    .and_then(|mu| dims.binary_search(&mu).ok())
            })
            .collect();
        let sub = DimensionTree::from_children(0, children, leaf_dims)?;
        Ok((sub, nodes))
    }

    /// Re-orient the tree so that `node` becomes the root
    ///
    /// Edges are kept and children are listed in increasing node index. No
    /// node is removed, so a former root with two children becomes a unary
    /// node. When `node` is a leaf it becomes internal and a new leaf with
    /// index `nb_nodes()` takes over its dimension; that leaf is reported by
    /// [`added_leaf`](Self::added_leaf) and folded back into its parent by
    /// the next re-rooting. The result only depends on the undirected tree
    /// and `node`, so successive re-rootings compose, and re-rooting at the
    /// original root gives back the original tree whenever its children were
    /// listed in increasing index (as for every constructor of this crate).
    /// Re-rooting at the added leaf itself leaves the tree unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is out of range, `InvalidArgument` if the
    /// current root has a single child (it would become a leaf without a
    /// dimension).
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_tree::DimensionTree;
    ///
    /// let tree = DimensionTree::linear(3).unwrap();
    /// let rerooted = tree.change_root(2).unwrap();
    /// assert_eq!(rerooted.root(), 2);
    /// assert_eq!(rerooted.nb_nodes(), 6);
    /// assert_eq!(rerooted.leaf_dim(5), Some(0));
    /// assert_eq!(rerooted.added_leaf(), Some(5));
    /// assert_eq!(rerooted.change_root(0).unwrap(), tree);
    /// ```
    pub fn change_root(&self, node: usize) -> Result<DimensionTree> {
        self.check_node(node)?;
        let root = self.root();
        if node == root || self.added_leaf() == Some(node) {
            return Ok(self.clone());
        }
        if self.added_leaf().is_none() && self.children(root).len() == 1 {
            return Err(TensorError::invalid_argument(format!(
                "Cannot move the root away from unary root {}",
                root
            )));
        }

        let (neighbors, mut leaf_dims) = self.undirected();
        let nb_nodes = neighbors.len();
        let mut children = vec![Vec::new(); nb_nodes];
        let mut visited = vec![false; nb_nodes];
        visited[node] = true;
        let mut stack = vec![node];
        while let Some(alpha) = stack.pop() {
            for &beta in &neighbors[alpha] {
                if !visited[beta] {
                    visited[beta] = true;
                    children[alpha].push(beta);
                    stack.push(beta);
                }
            }
        }

        log::debug!("dimension tree re-rooted from node {} to node {}", root, node);
        match leaf_dims[node].take() {
            Some(mu) => {
                leaf_dims.push(Some(mu));
                children.push(Vec::new());
                children[node].push(nb_nodes);
                DimensionTree::from_children(node, children, leaf_dims)?.with_added_leaf(nb_nodes)
            }
            None => DimensionTree::from_children(node, children, leaf_dims),
        }
    }

    /// Sorted adjacency lists and leaf dimensions, with the added leaf
    /// folded back into the root
    fn undirected(&self) -> (Vec<Vec<usize>>, Vec<Option<usize>>) {
        let root = self.root();
        let mut neighbors: Vec<Vec<usize>> = self.all_children().to_vec();
        let mut leaf_dims = self.leaf_dims().to_vec();
        if let Some(leaf) = self.added_leaf() {
            neighbors.truncate(leaf);
            leaf_dims.truncate(leaf);
            neighbors[root].retain(|&c| c != leaf);
            leaf_dims[root] = self.leaf_dim(leaf);
        }
        for (alpha, adjacent) in neighbors.iter_mut().enumerate() {
            if let Some(p) = self.parent(alpha) {
                adjacent.push(p);
            }
            adjacent.sort_unstable();
        }
        (neighbors, leaf_dims)
    }
}
