//! Greedy duplicate-free assignment of queries to tree points.
//!
//! Queries are served strictly in the order they arrive: each one takes
//! its nearest still-available point, which is then removed for everyone
//! after it. This is first-come-first-served, not a globally optimal
//! matching; reordering the queries can change the result.

use std::fmt;

use crate::metric::Metric;
use crate::vptree::{AvailableIndexSet, Neighbor, VpTree};

/// Every point has already been assigned in this batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted {
    /// Number of points in the tree
    pub capacity: usize,
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all {} entries have already been assigned in this batch",
            self.capacity
        )
    }
}

impl std::error::Error for Exhausted {}

/// Assigns each query a distinct point of one tree.
///
/// # Example
///
/// ```
/// use color_vptree::{ColorMetric, DistanceMetric, Rgb, UniqueAssigner, VpTree};
///
/// let metric = DistanceMetric::Cie76;
/// let tree = VpTree::build(
///     vec![metric.project(Rgb::BLACK), metric.project(Rgb::WHITE)],
///     metric,
/// )
/// .unwrap();
///
/// let mut assigner = UniqueAssigner::new(&tree, 1);
/// let near_black = metric.project(Rgb::new(0x11, 0x11, 0x11));
/// assert_eq!(assigner.assign(&near_black).unwrap().index, 0);
/// // Black is taken, so the next near-black query gets white
/// assert_eq!(assigner.assign(&near_black).unwrap().index, 1);
/// assert!(assigner.assign(&near_black).is_err());
/// ```
pub struct UniqueAssigner<'t, P, M> {
    tree: &'t VpTree<P, M>,
    available: AvailableIndexSet<'t>,
    budget: usize,
}

impl<'t, P, M: Metric<P>> UniqueAssigner<'t, P, M> {
    /// Start a batch over `tree`. `budget` is the number of candidates
    /// requested per search (at least 1); the closest one is taken.
    pub fn new(tree: &'t VpTree<P, M>, budget: usize) -> Self {
        Self {
            tree,
            available: tree.available(),
            budget: budget.max(1),
        }
    }

    /// Assign the nearest available point to `query` and consume it.
    ///
    /// # Errors
    ///
    /// Returns [`Exhausted`] once every point has been assigned. An empty
    /// tree is exhausted from the start.
    pub fn assign(&mut self, query: &P) -> Result<Neighbor, Exhausted> {
        let exhausted = Exhausted {
            capacity: self.tree.len(),
        };
        if self.available.is_empty() {
            return Err(exhausted);
        }

        // A non-empty available set implies a non-empty tree, so the
        // search itself cannot fail here.
        let candidates = self
            .tree
            .nearest_filtered(query, self.budget, &self.available)
            .unwrap_or_default();

        let best = candidates.into_iter().next().ok_or(exhausted)?;
        self.available.remove(best.index);
        Ok(best)
    }

    /// Points not yet assigned.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    /// Points assigned so far.
    #[inline]
    pub fn assigned(&self) -> usize {
        self.tree.len() - self.available.len()
    }
}

/// Assign every query in order; a convenience over [`UniqueAssigner`].
pub fn assign_unique<P, M: Metric<P>>(
    tree: &VpTree<P, M>,
    queries: &[P],
    budget: usize,
) -> Vec<Result<Neighbor, Exhausted>> {
    let mut assigner = UniqueAssigner::new(tree, budget);
    queries.iter().map(|q| assigner.assign(q)).collect()
}
