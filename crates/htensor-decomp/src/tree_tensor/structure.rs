//! Structural transforms that leave the represented tensor unchanged
//!
//! Activation, inactivation and re-rooting build a new tensor; the input is
//! never modified. Densification and subtree bases live here as well since
//! they walk the same holder relations.

use super::network::CoreNetwork;
use super::types::TreeBasedTensor;
use htensor_core::{FullTensor, LabeledTensor, Mode, Result, TensorError};
use scirs2_core::ndarray_ext::Axis;
use std::collections::HashMap;
use std::sync::Arc;

impl TreeBasedTensor {
    /// Dense tensor represented by the cores
    ///
    /// Cores are contracted from the leaves to the root. The cost grows with
    /// the product of the sizes, so this is meant for small tensors.
    pub fn full(&self) -> Result<FullTensor> {
        let net = CoreNetwork::from_tensor(self)?;
        let root = self.tree().root();
        let mut partial: Vec<Option<LabeledTensor>> = vec![None; net.cores.len()];
        for alpha in self.tree().post_order() {
            if !net.active[alpha] {
                continue;
            }
            let mut t = net.core(alpha)?.clone();
            for c in net.held_by(alpha) {
                let below = partial[c].take().ok_or_else(|| {
                    TensorError::rank_inconsistency(format!("Node {} contracted twice", c))
                })?;
                t = t.contract(&below)?;
            }
            partial[alpha] = Some(t);
        }
        let top = partial[root]
            .take()
            .ok_or_else(|| TensorError::rank_inconsistency("Root core missing"))?;
        let dims: Vec<Mode> = (0..self.order()).map(Mode::Dim).collect();
        Ok(FullTensor::from_array(top.permute_to(&dims)?.into_data()))
    }

    /// Give the listed nodes explicit cores
    ///
    /// Nodes are processed from the top of the tree down. The new core of a
    /// node holds the left singular vectors (up to numerical rank) of its
    /// holder's core, matricized along the axes the node contributes.
    /// Already active nodes are left alone.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if a node is out of range.
    pub fn activate_nodes(&self, nodes: &[usize]) -> Result<TreeBasedTensor> {
        let tree = Arc::clone(self.tree());
        for &alpha in nodes {
            tree.check_node(alpha)?;
        }
        let mut order = nodes.to_vec();
        order.sort_by_key(|&a| (tree.level(a), a));
        order.dedup();
        let mut net = CoreNetwork::from_tensor(self)?;
        for alpha in order {
            net.activate(alpha)?;
        }
        net.into_tensor()
    }

    /// Merge the cores of the listed nodes into their holders
    ///
    /// Already inactive nodes are left alone.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if a node is out of range, `InvalidArgument` if the
    /// root is listed.
    pub fn inactivate_nodes(&self, nodes: &[usize]) -> Result<TreeBasedTensor> {
        let tree = Arc::clone(self.tree());
        for &alpha in nodes {
            tree.check_node(alpha)?;
            if alpha == tree.root() {
                return Err(TensorError::invalid_argument(
                    "The root node cannot be inactivated",
                ));
            }
        }
        let mut order = nodes.to_vec();
        order.sort_by_key(|&a| (std::cmp::Reverse(tree.level(a)), a));
        order.dedup();
        let mut net = CoreNetwork::from_tensor(self)?;
        for alpha in order {
            net.inactivate(alpha)?;
        }
        net.into_tensor()
    }

    /// Same tensor on the tree re-rooted at `node`
    ///
    /// A leaf added by an earlier re-rooting is merged into the root first.
    /// Nodes on the path from `node` to the current root are then activated
    /// and the bonds along the path are re-oriented. See
    /// [`DimensionTree::change_root`](htensor_tree::DimensionTree::change_root)
    /// for the numbering of the new tree: re-rooting twice lands on the same
    /// tree as re-rooting once, so the results can be combined.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::{RandOptions, TreeBasedTensor};
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    /// use std::sync::Arc;
    ///
    /// let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let x = TreeBasedTensor::rand(tree, &RandOptions::new(), &mut rng).unwrap();
    /// let y = x.change_root(4).unwrap();
    /// assert_eq!(y.tree().root(), 4);
    /// let z = x.change_root(2).unwrap().change_root(4).unwrap();
    /// assert!((&y - &z).unwrap().norm().unwrap() < 1e-6 * y.norm().unwrap());
    /// ```
    pub fn change_root(&self, node: usize) -> Result<TreeBasedTensor> {
        let tree = self.tree();
        tree.check_node(node)?;
        if node == tree.root() || tree.added_leaf() == Some(node) {
            return Ok(self.clone());
        }
        let new_tree = Arc::new(tree.change_root(node)?);

        let mut net = CoreNetwork::from_tensor(self)?;
        if let Some(leaf) = tree.added_leaf() {
            net.inactivate(leaf)?;
        }
        let mut path = vec![node];
        path.extend(tree.ascendants(node));
        for &alpha in path.iter().rev() {
            net.activate(alpha)?;
        }

        // The bond of path[j] now belongs to path[j + 1]
        let remap: HashMap<usize, usize> = path.windows(2).map(|w| (w[0], w[1])).collect();
        let rename = |m: Mode| match m {
            Mode::Bond(b) => Mode::Bond(remap.get(&b).copied().unwrap_or(b)),
            dim => dim,
        };
        let mut cores = Vec::with_capacity(new_tree.nb_nodes());
        for core in net.cores {
            cores.push(core.map(|c| c.relabel(rename)).transpose()?);
        }
        let mut active = net.active;
        // Slots past the folded leaf are empty; a new added leaf starts inactive
        cores.resize(new_tree.nb_nodes(), None);
        active.resize(new_tree.nb_nodes(), false);

        log::debug!(
            "tree-based tensor re-rooted from node {} to node {}",
            tree.root(),
            node
        );
        CoreNetwork {
            tree: new_tree,
            active,
            cores,
            shape: net.shape,
        }
        .into_tensor()
    }

    /// Basis functions of the subspace of an active node
    ///
    /// Returns one tensor per rank index of `node`, each living on
    /// [`sub_dimension_tree(node)`](htensor_tree::DimensionTree::sub_dimension_tree)
    /// with the dimensions of `node` renumbered in increasing order. For the
    /// root this is the tensor itself on the renumbered tree.
    ///
    /// # Errors
    ///
    /// `InvalidNode` if `node` is out of range, `InvalidArgument` if it is inactive.
    pub fn subtree_basis(&self, node: usize) -> Result<Vec<TreeBasedTensor>> {
        let tree = self.tree();
        tree.check_node(node)?;
        if !self.is_active(node) {
            return Err(TensorError::invalid_argument(format!(
                "Node {} is inactive and has no basis",
                node
            )));
        }
        let (sub_tree, nodes) = tree.sub_dimension_tree(node)?;
        let sub_tree = Arc::new(sub_tree);
        let new_index: HashMap<usize, usize> =
            nodes.iter().enumerate().map(|(i, &o)| (o, i)).collect();
        let dims = tree.dims(node);
        let rename = |m: Mode| match m {
            Mode::Dim(mu) => Mode::Dim(dims.binary_search(&mu).unwrap_or(mu)),
            Mode::Bond(b) => Mode::Bond(new_index.get(&b).copied().unwrap_or(b)),
        };

        let net = CoreNetwork::from_tensor(self)?;
        let active: Vec<bool> = nodes.iter().map(|&o| net.active[o]).collect();
        let mut cores = Vec::with_capacity(nodes.len());
        cores.push(None);
        for &o in &nodes[1..] {
            cores.push(net.cores[o].clone().map(|c| c.relabel(rename)).transpose()?);
        }
        let shape: Vec<usize> = dims.iter().map(|&mu| self.shape()[mu]).collect();

        let top = net.core(node)?;
        let slices: Vec<LabeledTensor> = match top.position(Mode::Bond(node)) {
            None => vec![top.clone()],
            Some(ax) => {
                let modes: Vec<Mode> = top
                    .modes()
                    .iter()
                    .filter(|&&m| m != Mode::Bond(node))
                    .copied()
                    .collect();
                (0..top.shape()[ax])
                    .map(|j| {
                        let data = top.data().index_axis(Axis(ax), j).to_owned();
                        LabeledTensor::new(data, modes.clone())
                    })
                    .collect::<Result<_>>()?
            }
        };

        slices
            .into_iter()
            .map(|slice| {
                let mut sub_cores = cores.clone();
                sub_cores[0] = Some(slice.relabel(rename)?);
                CoreNetwork {
                    tree: Arc::clone(&sub_tree),
                    active: active.clone(),
                    cores: sub_cores,
                    shape: shape.clone(),
                }
                .into_tensor()
            })
            .collect()
    }
}
