//! Labeled working form of a tree-based tensor
//!
//! Structural transforms operate on a [`CoreNetwork`]: the tree, the active
//! flags and one [`LabeledTensor`] per active node. Labels make the axis
//! order of intermediate cores irrelevant; [`CoreNetwork::into_tensor`]
//! restores the canonical order and validates the result.

use super::types::{NodeState, TreeBasedTensor};
use htensor_core::{thin_svd, LabeledTensor, Mode, Result, TensorError};
use htensor_tree::DimensionTree;
use std::sync::Arc;

/// Modes of the expansion of `node`: what its core contracts against below it
pub(crate) fn in_modes(tree: &DimensionTree, active: &[bool], node: usize) -> Vec<Mode> {
    let mut modes = Vec::new();
    push_in_modes(tree, active, node, &mut modes);
    modes
}

fn push_in_modes(tree: &DimensionTree, active: &[bool], node: usize, out: &mut Vec<Mode>) {
    if let Some(mu) = tree.leaf_dim(node) {
        out.push(Mode::Dim(mu));
        return;
    }
    for &c in tree.children(node) {
        if active[c] {
            out.push(Mode::Bond(c));
        } else {
            push_in_modes(tree, active, c, out);
        }
    }
}

/// Canonical core modes: `in_modes` followed by the outgoing bond (non-root only)
pub(crate) fn core_modes(tree: &DimensionTree, active: &[bool], node: usize) -> Vec<Mode> {
    let mut modes = in_modes(tree, active, node);
    if node != tree.root() {
        modes.push(Mode::Bond(node));
    }
    modes
}

/// Nearest active strict ancestor
pub(crate) fn holder(tree: &DimensionTree, active: &[bool], node: usize) -> Option<usize> {
    let mut current = tree.parent(node);
    while let Some(alpha) = current {
        if active[alpha] {
            return Some(alpha);
        }
        current = tree.parent(alpha);
    }
    None
}

/// Sizes of `modes` in `tensor`
pub(crate) fn sizes_of(tensor: &LabeledTensor, modes: &[Mode]) -> Result<Vec<usize>> {
    modes
        .iter()
        .map(|&m| {
            tensor.size(m).ok_or_else(|| {
                TensorError::rank_inconsistency(format!(
                    "Mode {} missing from core with modes {:?}",
                    m,
                    tensor.modes()
                ))
            })
        })
        .collect()
}

#[derive(Clone, Debug)]
pub(crate) struct CoreNetwork {
    pub(crate) tree: Arc<DimensionTree>,
    pub(crate) active: Vec<bool>,
    pub(crate) cores: Vec<Option<LabeledTensor>>,
    pub(crate) shape: Vec<usize>,
}

impl CoreNetwork {
    pub(crate) fn from_tensor(tensor: &TreeBasedTensor) -> Result<Self> {
        let tree = Arc::clone(tensor.tree());
        let active: Vec<bool> = (0..tree.nb_nodes()).map(|a| tensor.is_active(a)).collect();
        let mut cores = Vec::with_capacity(tree.nb_nodes());
        for (alpha, state) in tensor.node_states().iter().enumerate() {
            cores.push(match state {
                NodeState::Active(core) => Some(LabeledTensor::new(
                    core.clone(),
                    core_modes(&tree, &active, alpha),
                )?),
                NodeState::Inactive => None,
            });
        }
        Ok(Self {
            tree,
            active,
            cores,
            shape: tensor.shape().to_vec(),
        })
    }

    pub(crate) fn holder(&self, node: usize) -> Result<usize> {
        holder(&self.tree, &self.active, node).ok_or_else(|| {
            TensorError::invalid_argument(format!("Node {} has no active ancestor", node))
        })
    }

    pub(crate) fn in_modes(&self, node: usize) -> Vec<Mode> {
        in_modes(&self.tree, &self.active, node)
    }

    pub(crate) fn core(&self, node: usize) -> Result<&LabeledTensor> {
        self.cores[node]
            .as_ref()
            .ok_or_else(|| missing_core(node))
    }

    pub(crate) fn take_core(&mut self, node: usize) -> Result<LabeledTensor> {
        self.cores[node].take().ok_or_else(|| missing_core(node))
    }

    /// Active non-root nodes whose holder is `node`, in tree order
    pub(crate) fn held_by(&self, node: usize) -> Vec<usize> {
        self.in_modes(node)
            .into_iter()
            .filter_map(|m| match m {
                Mode::Bond(c) => Some(c),
                Mode::Dim(_) => None,
            })
            .collect()
    }

    /// Give `beta` an explicit core split off its holder
    ///
    /// The holder core is matricized with the expansion modes of `beta` as
    /// rows; the left singular vectors up to numerical rank become the core
    /// of `beta` and the remaining factor stays with the holder.
    pub(crate) fn activate(&mut self, beta: usize) -> Result<()> {
        if self.active[beta] {
            return Ok(());
        }
        let h = self.holder(beta)?;
        let rows = self.in_modes(beta);
        let core_h = self.take_core(h)?;
        let matrix = core_h.matricize(&rows)?;
        let svd = thin_svd(&matrix)?;
        let k = svd.numerical_rank();
        let svd = svd.truncate(k);

        let cols: Vec<Mode> = core_h
            .modes()
            .iter()
            .filter(|m| !rows.contains(m))
            .copied()
            .collect();
        let mut beta_shape = sizes_of(&core_h, &rows)?;
        beta_shape.push(k);
        let mut beta_modes = rows;
        beta_modes.push(Mode::Bond(beta));
        let mut h_shape = vec![k];
        h_shape.extend(sizes_of(&core_h, &cols)?);
        let mut h_modes = vec![Mode::Bond(beta)];
        h_modes.extend(cols);

        self.cores[beta] = Some(LabeledTensor::from_matrix(&svd.u, beta_modes, &beta_shape)?);
        self.cores[h] = Some(LabeledTensor::from_matrix(&svd.s_vt(), h_modes, &h_shape)?);
        self.active[beta] = true;
        log::debug!("activated node {} (holder {}) with rank {}", beta, h, k);
        Ok(())
    }

    /// Merge the core of `beta` into its holder
    pub(crate) fn inactivate(&mut self, beta: usize) -> Result<()> {
        if !self.active[beta] {
            return Ok(());
        }
        if beta == self.tree.root() {
            return Err(TensorError::invalid_argument("The root node cannot be inactivated"));
        }
        let h = self.holder(beta)?;
        let core_beta = self.take_core(beta)?;
        let core_h = self.take_core(h)?;
        self.cores[h] = Some(core_h.contract(&core_beta)?);
        self.active[beta] = false;
        log::debug!("inactivated node {} into holder {}", beta, h);
        Ok(())
    }

    /// Make every active non-root core orthonormal, leaves first
    ///
    /// The `R` factor of each core moves to its holder, so the norm ends up in
    /// the root core. Ranks may shrink to the row dimension of a core.
    pub(crate) fn orthonormalize(&mut self) -> Result<()> {
        let root = self.tree.root();
        for alpha in self.tree.post_order() {
            if alpha == root || !self.active[alpha] {
                continue;
            }
            let h = self.holder(alpha)?;
            let rows = self.in_modes(alpha);
            let core = self.take_core(alpha)?;
            let svd = thin_svd(&core.matricize(&rows)?)?;
            let mut shape = sizes_of(&core, &rows)?;
            shape.push(svd.len());
            let mut modes = rows;
            modes.push(Mode::Bond(alpha));
            self.cores[alpha] = Some(LabeledTensor::from_matrix(&svd.u, modes, &shape)?);
            let core_h = self.take_core(h)?;
            self.cores[h] = Some(core_h.mode_product(Mode::Bond(alpha), &svd.s_vt())?);
        }
        Ok(())
    }

    /// Permute every core to its canonical modes and validate
    pub(crate) fn into_tensor(self) -> Result<TreeBasedTensor> {
        let mut nodes = Vec::with_capacity(self.cores.len());
        for (alpha, core) in self.cores.into_iter().enumerate() {
            nodes.push(match (self.active[alpha], core) {
                (true, Some(core)) => {
                    let canonical = core_modes(&self.tree, &self.active, alpha);
                    NodeState::Active(core.permute_to(&canonical)?.into_data())
                }
                (true, None) => return Err(missing_core(alpha)),
                (false, _) => NodeState::Inactive,
            });
        }
        TreeBasedTensor::from_parts(self.tree, nodes, self.shape)
    }
}

fn missing_core(node: usize) -> TensorError {
    TensorError::rank_inconsistency(format!("Active node {} has no core", node))
}
