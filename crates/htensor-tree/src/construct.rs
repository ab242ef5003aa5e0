//! Deterministic and random tree constructors
//!
//! All constructors number nodes in depth-first pre-order with the root at
//! index 0 and children visited left to right.

use crate::tree::DimensionTree;
use htensor_core::{Result, TensorError};
use scirs2_core::random::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounds on the number of children of internal nodes of a random tree
///
/// # Examples
///
/// ```
/// use htensor_tree::ArityInterval;
///
/// assert!(ArityInterval::new(2, 3).is_ok());
/// assert!(ArityInterval::new(1, 3).is_err());
/// assert_eq!(ArityInterval::up_to(4).unwrap(), ArityInterval::new(2, 4).unwrap());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "ArityRepr", into = "ArityRepr")
)]
pub struct ArityInterval {
    min: usize,
    max: usize,
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct ArityRepr {
    min: usize,
    max: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<ArityRepr> for ArityInterval {
    type Error = TensorError;

    fn try_from(repr: ArityRepr) -> Result<Self> {
        ArityInterval::new(repr.min, repr.max)
    }
}

#[cfg(feature = "serde")]
impl From<ArityInterval> for ArityRepr {
    fn from(arity: ArityInterval) -> Self {
        ArityRepr {
            min: arity.min,
            max: arity.max,
        }
    }
}

impl ArityInterval {
    /// Arity in `[min, max]`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `2 <= min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min < 2 || min > max {
            return Err(TensorError::invalid_argument(format!(
                "Arity interval [{}, {}] must satisfy 2 <= min <= max",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Arity in `[2, max]`
    pub fn up_to(max: usize) -> Result<Self> {
        Self::new(2, max)
    }

    /// Smallest arity
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest arity
    pub fn max(&self) -> usize {
        self.max
    }
}

impl Default for ArityInterval {
    fn default() -> Self {
        Self { min: 2, max: 3 }
    }
}

/// Nested description of a tree, turned into pre-order arrays by [`Builder`]
enum Shape {
    Leaf(usize),
    Node(Vec<Shape>),
}

#[derive(Default)]
struct Builder {
    children: Vec<Vec<usize>>,
    leaf_dims: Vec<Option<usize>>,
}

impl Builder {
    fn push(&mut self, shape: &Shape) -> usize {
        let alpha = self.children.len();
        self.children.push(Vec::new());
        match shape {
            Shape::Leaf(mu) => self.leaf_dims.push(Some(*mu)),
            Shape::Node(parts) => {
                self.leaf_dims.push(None);
                let kids: Vec<usize> = parts.iter().map(|p| self.push(p)).collect();
                self.children[alpha] = kids;
            }
        }
        alpha
    }

    fn build(shape: Shape) -> Result<DimensionTree> {
        let mut builder = Builder::default();
        let root = builder.push(&shape);
        DimensionTree::from_children(root, builder.children, builder.leaf_dims)
    }
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(TensorError::invalid_argument("Tree order must be at least 1"));
    }
    Ok(())
}

impl DimensionTree {
    /// Linear (caterpillar) tree over `0..order`
    ///
    /// The root has children `[{0..order-2}, {order-1}]` and so on down to
    /// the node `{0, 1}`; the tree has `2 * order - 1` nodes.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `order == 0`.
    pub fn linear(order: usize) -> Result<Self> {
        check_order(order)?;
        let perm: Vec<usize> = (0..order).collect();
        Self::linear_with_permutation(&perm)
    }

    /// Linear tree whose `k`-th leaf position carries dimension `perm[k]`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `perm` is empty or not a permutation of `0..perm.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_tree::DimensionTree;
    ///
    /// let tree = DimensionTree::linear_with_permutation(&[2, 0, 1]).unwrap();
    /// // the deepest leaves carry dimensions 2 and 0
    /// assert_eq!(tree.dims(1), &[0, 2]);
    /// assert!(DimensionTree::linear_with_permutation(&[0, 0, 1]).is_err());
    /// ```
    pub fn linear_with_permutation(perm: &[usize]) -> Result<Self> {
        check_order(perm.len())?;
        check_permutation(perm)?;
        let mut shape = Shape::Leaf(perm[0]);
        for &mu in &perm[1..] {
            shape = Shape::Node(vec![shape, Shape::Leaf(mu)]);
        }
        Builder::build(shape)
    }

    /// Balanced binary tree over `0..order`
    ///
    /// Each node splits its contiguous range of dimensions into a left part
    /// of `ceil(n / 2)` dimensions and a right part with the rest.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `order == 0`.
    pub fn balanced(order: usize) -> Result<Self> {
        check_order(order)?;
        fn split(lo: usize, hi: usize) -> Shape {
            if hi - lo == 1 {
                return Shape::Leaf(lo);
            }
            let mid = lo + (hi - lo).div_ceil(2);
            Shape::Node(vec![split(lo, mid), split(mid, hi)])
        }
        Builder::build(split(0, order))
    }

    /// Root whose children are the `order` leaves
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `order == 0`.
    pub fn trivial(order: usize) -> Result<Self> {
        check_order(order)?;
        if order == 1 {
            return Builder::build(Shape::Leaf(0));
        }
        Builder::build(Shape::Node((0..order).map(Shape::Leaf).collect()))
    }

    /// Random tree over `0..order`
    ///
    /// Dimensions are shuffled, then every node with `s > 1` dimensions is cut
    /// into `k` non-empty contiguous parts with `k` uniform in
    /// `[min, min(max, s)]` (`k = s` when `s < min`).
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `order == 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use htensor_tree::{ArityInterval, DimensionTree};
    /// use scirs2_core::random::{SeedableRng, StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let tree = DimensionTree::random(10, ArityInterval::new(2, 3).unwrap(), &mut rng).unwrap();
    /// assert_eq!(tree.order(), 10);
    /// assert!(tree.internal_nodes().iter().all(|&a| (2..=3).contains(&tree.children(a).len())));
    /// ```
    pub fn random<R: Rng + ?Sized>(
        order: usize,
        arity: ArityInterval,
        rng: &mut R,
    ) -> Result<Self> {
        check_order(order)?;
        let mut dims: Vec<usize> = (0..order).collect();
        shuffle(&mut dims, rng);

        fn cut<R: Rng + ?Sized>(dims: &[usize], arity: ArityInterval, rng: &mut R) -> Shape {
            let s = dims.len();
            if s == 1 {
                return Shape::Leaf(dims[0]);
            }
            let k = if s < arity.min {
                s
            } else {
                rng.random_range(arity.min..=arity.max.min(s))
            };
            // k - 1 distinct cut positions among 1..s
            let mut positions: Vec<usize> = (1..s).collect();
            for i in 0..k - 1 {
                let j = rng.random_range(i..positions.len());
                positions.swap(i, j);
            }
            let mut cuts: Vec<usize> = positions[..k - 1].to_vec();
            cuts.sort_unstable();

            let mut parts = Vec::with_capacity(k);
            let mut start = 0;
            for end in cuts.into_iter().chain(std::iter::once(s)) {
                parts.push(cut(&dims[start..end], arity, rng));
                start = end;
            }
            Shape::Node(parts)
        }

        let tree = Builder::build(cut(&dims, arity, rng))?;
        log::debug!(
            "random dimension tree: order {}, {} nodes, depth {}",
            order,
            tree.nb_nodes(),
            tree.depth()
        );
        Ok(tree)
    }
}

fn check_permutation(perm: &[usize]) -> Result<()> {
    let mut seen = vec![false; perm.len()];
    for &mu in perm {
        if mu >= perm.len() || seen[mu] {
            return Err(TensorError::invalid_argument(format!(
                "{:?} is not a permutation of 0..{}",
                perm,
                perm.len()
            )));
        }
        seen[mu] = true;
    }
    Ok(())
}

fn shuffle<R: Rng + ?Sized>(values: &mut [usize], rng: &mut R) {
    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i);
        values.swap(i, j);
    }
}
