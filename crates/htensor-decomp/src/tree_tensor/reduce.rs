//! Partial and total sums over dimensions
//!
//! Summing a dimension contracts it with the all-ones vector. Nodes whose
//! dimensions are all summed disappear, and their cores collapse into a
//! vector absorbed by the holder. Nodes left with a single child are then
//! spliced out so that the result lives on a proper dimension tree over the
//! remaining dimensions.

use super::network::CoreNetwork;
use super::types::TreeBasedTensor;
use htensor_core::{LabeledTensor, Mode, Result, TensorError};
use htensor_tree::DimensionTree;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of [`TreeBasedTensor::reduce_sum`]
#[derive(Clone, Debug)]
pub enum Reduced {
    /// Some dimensions remain
    Tensor(TreeBasedTensor),
    /// Every dimension was summed
    Scalar(f64),
}

impl Reduced {
    /// Value when every dimension was summed
    pub fn into_scalar(self) -> Option<f64> {
        match self {
            Reduced::Scalar(v) => Some(v),
            Reduced::Tensor(_) => None,
        }
    }

    /// Remaining tensor when some dimensions were kept
    pub fn into_tensor(self) -> Option<TreeBasedTensor> {
        match self {
            Reduced::Tensor(t) => Some(t),
            Reduced::Scalar(_) => None,
        }
    }
}

impl TreeBasedTensor {
    /// Sum over the given dimensions (all of them for `None`)
    ///
    /// The remaining dimensions are renumbered `0..k` in increasing order and
    /// the surviving nodes in depth-first pre-order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a repeated dimension or one outside `0..order`.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_decomp::{RandOptions, Reduced, TreeBasedTensor};
    /// use htensor_tree::DimensionTree;
    /// use scirs2_core::random::{SeedableRng, StdRng};
    /// use std::sync::Arc;
    ///
    /// let tree = Arc::new(DimensionTree::balanced(4).unwrap());
    /// let mut rng = StdRng::seed_from_u64(2);
    /// let x = TreeBasedTensor::rand(tree, &RandOptions::new(), &mut rng).unwrap();
    /// let partial = x.reduce_sum(Some(&[1, 2])).unwrap().into_tensor().unwrap();
    /// assert_eq!(partial.order(), 2);
    /// let total = x.reduce_sum(None).unwrap().into_scalar().unwrap();
    /// assert!((total - x.full().unwrap().sum()).abs() < 1e-9 * total.abs());
    /// ```
    pub fn reduce_sum(&self, dims: Option<&[usize]>) -> Result<Reduced> {
        let order = self.order();
        let summed = match dims {
            None => vec![true; order],
            Some(list) => {
                let mut flags = vec![false; order];
                for &mu in list {
                    if mu >= order || flags[mu] {
                        return Err(TensorError::invalid_argument(format!(
                            "Cannot sum dimensions {:?} of an order-{} tensor",
                            list, order
                        )));
                    }
                    flags[mu] = true;
                }
                flags
            }
        };
        if !summed.contains(&true) {
            return Ok(Reduced::Tensor(self.clone()));
        }

        let tree = Arc::clone(self.tree());
        let nb_nodes = tree.nb_nodes();
        let root = tree.root();
        let gone: Vec<bool> = (0..nb_nodes)
            .map(|a| tree.dims(a).iter().all(|&mu| summed[mu]))
            .collect();

        let mut net = CoreNetwork::from_tensor(self)?;
        let mut vectors: Vec<Option<LabeledTensor>> = vec![None; nb_nodes];
        for alpha in tree.post_order() {
            if !net.active[alpha] {
                continue;
            }
            let held = net.held_by(alpha);
            let core = net.take_core(alpha)?;
            let dim_modes: Vec<Mode> = core
                .modes()
                .iter()
                .filter(|m| matches!(m, Mode::Dim(mu) if summed[*mu]))
                .copied()
                .collect();
            let mut t = core.sum_modes(&dim_modes)?;
            for c in held {
                if let Some(v) = vectors[c].take() {
                    t = t.contract(&v)?;
                }
            }
            if !gone[alpha] {
                net.cores[alpha] = Some(t);
            } else if alpha == root {
                return Ok(Reduced::Scalar(t.value()));
            } else {
                vectors[alpha] = Some(t);
            }
        }

        // Splice unary nodes; `edge[a]` is the label of the bond above `a`
        let mut kids: Vec<Vec<usize>> = (0..nb_nodes)
            .map(|a| tree.children(a).iter().copied().filter(|&c| !gone[c]).collect())
            .collect();
        let mut edge: Vec<usize> = (0..nb_nodes).collect();
        let mut new_root = root;
        for alpha in tree.post_order() {
            if gone[alpha] || kids[alpha].len() != 1 {
                continue;
            }
            let c = kids[alpha][0];
            if net.active[alpha] {
                let here = net.take_core(alpha)?;
                if net.active[c] {
                    let below = net.take_core(c)?;
                    net.cores[c] = Some(below.contract(&here)?);
                } else {
                    net.cores[c] = Some(here);
                    net.active[c] = true;
                }
                edge[c] = edge[alpha];
                net.active[alpha] = false;
            }
            kids[alpha].clear();
            match tree.parent(alpha) {
                Some(p) => {
                    for k in kids[p].iter_mut().filter(|k| **k == alpha) {
                        *k = c;
                    }
                }
                None => new_root = c,
            }
        }

        let mut nodes = Vec::new();
        let mut stack = vec![new_root];
        while let Some(alpha) = stack.pop() {
            nodes.push(alpha);
            stack.extend(kids[alpha].iter().rev());
        }
        let mut new_index = vec![usize::MAX; nb_nodes];
        for (i, &alpha) in nodes.iter().enumerate() {
            new_index[alpha] = i;
        }
        let kept_dims: Vec<usize> = (0..order).filter(|&mu| !summed[mu]).collect();
        let mut dim_index = vec![usize::MAX; order];
        for (i, &mu) in kept_dims.iter().enumerate() {
            dim_index[mu] = i;
        }

        let new_tree = DimensionTree::from_children(
            0,
            nodes
                .iter()
                .map(|&a| kids[a].iter().map(|&c| new_index[c]).collect())
                .collect(),
            nodes
                .iter()
                .map(|&a| tree.leaf_dim(a).map(|mu| dim_index[mu]))
                .collect(),
        )?;

        let bond_map: HashMap<usize, usize> = nodes
            .iter()
            .filter(|&&a| net.active[a])
            .map(|&a| (edge[a], new_index[a]))
            .collect();
        let rename = |m: Mode| match m {
            Mode::Dim(mu) => Mode::Dim(dim_index[mu]),
            Mode::Bond(b) => Mode::Bond(bond_map.get(&b).copied().unwrap_or(b)),
        };
        let mut active = Vec::with_capacity(nodes.len());
        let mut cores = Vec::with_capacity(nodes.len());
        for &alpha in &nodes {
            active.push(net.active[alpha]);
            cores.push(net.cores[alpha].take().map(|c| c.relabel(rename)).transpose()?);
        }
        log::debug!(
            "summed dimensions {:?}: {} of {} nodes remain",
            (0..order).filter(|&mu| summed[mu]).collect::<Vec<_>>(),
            nodes.len(),
            nb_nodes
        );

        CoreNetwork {
            tree: Arc::new(new_tree),
            active,
            cores,
            shape: kept_dims.iter().map(|&mu| self.shape()[mu]).collect(),
        }
        .into_tensor()
        .map(Reduced::Tensor)
    }

    /// Sum of all entries
    pub fn sum(&self) -> Result<f64> {
        match self.reduce_sum(None)? {
            Reduced::Scalar(v) => Ok(v),
            Reduced::Tensor(_) => Err(TensorError::rank_inconsistency(
                "Summing every dimension left a tensor",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_tensor::{ActiveNodes, RandOptions};
    use htensor_core::FullTensor;
    use scirs2_core::ndarray_ext::{ArrayD, Axis, IxDyn};
    use scirs2_core::random::{SeedableRng, StdRng};

    fn random(tree: DimensionTree, active: ActiveNodes, seed: u64) -> TreeBasedTensor {
        let mut rng = StdRng::seed_from_u64(seed);
        let shape: Vec<usize> = (0..tree.order()).map(|mu| 2 + mu % 3).collect();
        let options = RandOptions::new().with_shape(shape).with_active(active);
        TreeBasedTensor::rand(Arc::new(tree), &options, &mut rng).unwrap()
    }

    fn dense_sum(tensor: &FullTensor, dims: &[usize]) -> FullTensor {
        let mut data = tensor.as_array().clone();
        let mut sorted = dims.to_vec();
        sorted.sort_unstable();
        for &mu in sorted.iter().rev() {
            data = data.sum_axis(Axis(mu));
        }
        FullTensor::from_array(data)
    }

    fn check_partial(x: &TreeBasedTensor, dims: &[usize]) {
        let expected = dense_sum(&x.full().unwrap(), dims);
        let reduced = x.reduce_sum(Some(dims)).unwrap().into_tensor().unwrap();
        reduced.rank_check().unwrap();
        let got = reduced.full().unwrap();
        assert_eq!(got.shape(), expected.shape());
        assert!(
            (&got - &expected).norm() <= 1e-10 * expected.norm(),
            "dims {:?}",
            dims
        );
    }

    #[test]
    fn test_constant_tensor_total_sum() {
        // c * ones on a linear tree of order 3 with rank-1 cores
        let tree = Arc::new(DimensionTree::linear(3).unwrap());
        let c = 1.5;
        let cores = vec![
            Some(ArrayD::from_elem(IxDyn(&[1, 1]), c)),
            Some(ArrayD::ones(IxDyn(&[1, 1, 1]))),
            Some(ArrayD::ones(IxDyn(&[2, 1]))),
            Some(ArrayD::ones(IxDyn(&[3, 1]))),
            Some(ArrayD::ones(IxDyn(&[4, 1]))),
        ];
        let x = TreeBasedTensor::from_cores(tree, cores, vec![2, 3, 4]).unwrap();
        let total = x.reduce_sum(None).unwrap().into_scalar().unwrap();
        assert!((total - c * 24.0).abs() < 1e-12);
        assert!((x.sum().unwrap() - c * 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_sums_all_active() {
        let x = random(DimensionTree::balanced(5).unwrap(), ActiveNodes::All, 1);
        for dims in [vec![0], vec![4], vec![0, 1], vec![2, 3, 4], vec![1, 3], vec![0, 1, 2, 3]] {
            check_partial(&x, &dims);
        }
    }

    #[test]
    fn test_partial_sums_tensor_train() {
        let x = random(DimensionTree::linear(5).unwrap(), ActiveNodes::TensorTrain, 2);
        for dims in [vec![0], vec![1], vec![4], vec![0, 1, 2], vec![2, 4]] {
            check_partial(&x, &dims);
        }
    }

    #[test]
    fn test_partial_sums_random_layout() {
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DimensionTree::random(
            6,
            htensor_tree::ArityInterval::new(2, 3).unwrap(),
            &mut rng,
        )
        .unwrap();
        let active = ActiveNodes::random(&tree, &mut rng);
        let x = random(tree, active, 4);
        for dims in [vec![0], vec![5], vec![1, 2], vec![0, 2, 4]] {
            check_partial(&x, &dims);
        }
    }

    #[test]
    fn test_empty_list_is_identity() {
        let x = random(DimensionTree::linear(3).unwrap(), ActiveNodes::All, 5);
        let y = x.reduce_sum(Some(&[])).unwrap().into_tensor().unwrap();
        assert_eq!(y.ranks(), x.ranks());
    }

    #[test]
    fn test_invalid_dims() {
        let x = random(DimensionTree::linear(3).unwrap(), ActiveNodes::All, 6);
        assert!(matches!(
            x.reduce_sum(Some(&[0, 0])),
            Err(TensorError::InvalidArgument(_))
        ));
        assert!(matches!(
            x.reduce_sum(Some(&[3])),
            Err(TensorError::InvalidArgument(_))
        ));
    }
}
