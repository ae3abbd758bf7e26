//! Exact k-nearest-neighbor search with distance-bound pruning.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{Node, VpTree, VpTreeError};
use crate::metric::Metric;

/// Slack added to the pruning bound so floating-point rounding in the
/// triangle-inequality test can never discard a true neighbor.
const PRUNE_SLACK: f64 = 1e-9;

/// A search result: point index and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the list the tree was built from
    pub index: usize,
    /// Distance from the query
    pub distance: f64,
}

/// Restricts which points a search may return.
///
/// Rejected points still take part in pruning: a pivot's distance bounds
/// its subtrees whether or not the pivot itself is a candidate.
pub trait CandidateFilter {
    /// Whether the point at `index` may be returned.
    fn accepts(&self, index: usize) -> bool;

    /// Whether the subtree rooted at `node` may contain accepted points.
    ///
    /// Returning `false` skips the subtree without computing any distance.
    #[inline]
    fn subtree_live(&self, _node: usize) -> bool {
        true
    }
}

/// Accepts every point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfiltered;

impl CandidateFilter for Unfiltered {
    #[inline]
    fn accepts(&self, _index: usize) -> bool {
        true
    }
}

impl<F: Fn(usize) -> bool> CandidateFilter for F {
    #[inline]
    fn accepts(&self, index: usize) -> bool {
        self(index)
    }
}

/// Work counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered
    pub nodes_visited: usize,
    /// Metric evaluations against the query
    pub distance_evaluations: usize,
}

/// Heap entry ordered by (distance, index); the heap top is the worst.
struct Candidate(Neighbor);

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then(self.0.index.cmp(&other.0.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Bounded collection of the best `k` candidates seen so far.
struct BestK {
    k: usize,
    heap: BinaryHeap<Candidate>,
}

impl BestK {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    /// Worst accepted distance, or infinity while fewer than `k` are held.
    #[inline]
    fn bound(&self) -> f64 {
        if self.heap.len() < self.k {
            f64::INFINITY
        } else {
            self.heap.peek().map_or(f64::INFINITY, |c| c.0.distance)
        }
    }

    #[inline]
    fn offer(&mut self, index: usize, distance: f64) {
        let candidate = Candidate(Neighbor { index, distance });
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if self.heap.peek().is_some_and(|worst| candidate < *worst) {
            self.heap.pop();
            self.heap.push(candidate);
        }
    }

    fn into_sorted(self) -> Vec<Neighbor> {
        self.heap.into_sorted_vec().into_iter().map(|c| c.0).collect()
    }
}

struct Search<'q, P, F: ?Sized> {
    query: &'q P,
    filter: &'q F,
    best: BestK,
    stats: SearchStats,
}

impl<P, M: Metric<P>> VpTree<P, M> {
    /// The `k` nearest points to `query`, closest first.
    ///
    /// Equidistant points are ordered by ascending index, so results are
    /// reproducible regardless of tree shape.
    ///
    /// # Errors
    ///
    /// Returns [`VpTreeError::EmptyIndex`] if the tree holds no points.
    pub fn nearest(&self, query: &P, k: usize) -> Result<Vec<Neighbor>, VpTreeError> {
        self.nearest_filtered(query, k, &Unfiltered)
    }

    /// The single nearest point to `query`.
    pub fn nearest_one(&self, query: &P) -> Result<Neighbor, VpTreeError> {
        self.nearest(query, 1)?
            .into_iter()
            .next()
            .ok_or(VpTreeError::EmptyIndex)
    }

    /// The `k` nearest points accepted by `filter`, closest first.
    ///
    /// Returns fewer than `k` results (possibly none) when the filter
    /// accepts fewer than `k` points.
    pub fn nearest_filtered<F: CandidateFilter + ?Sized>(
        &self,
        query: &P,
        k: usize,
        filter: &F,
    ) -> Result<Vec<Neighbor>, VpTreeError> {
        self.search(query, k, filter).map(|(found, _)| found)
    }

    /// Like [`nearest_filtered`](Self::nearest_filtered), also reporting
    /// how much of the tree was examined.
    pub fn search<F: CandidateFilter + ?Sized>(
        &self,
        query: &P,
        k: usize,
        filter: &F,
    ) -> Result<(Vec<Neighbor>, SearchStats), VpTreeError> {
        let root = self.root.ok_or(VpTreeError::EmptyIndex)?;
        if k == 0 {
            return Ok((Vec::new(), SearchStats::default()));
        }

        let mut search = Search {
            query,
            filter,
            best: BestK::new(k),
            stats: SearchStats::default(),
        };
        self.visit(root, &mut search);

        Ok((search.best.into_sorted(), search.stats))
    }

    fn visit<F: CandidateFilter + ?Sized>(&self, node: usize, search: &mut Search<'_, P, F>) {
        if !search.filter.subtree_live(node) {
            return;
        }
        search.stats.nodes_visited += 1;

        match &self.nodes[node] {
            Node::Leaf { indices } => {
                for &i in indices {
                    if search.filter.accepts(i) {
                        let d = self.metric().distance(search.query, self.point(i));
                        search.stats.distance_evaluations += 1;
                        search.best.offer(i, d);
                    }
                }
            }
            Node::Branch {
                pivot,
                threshold,
                inner,
                outer,
            } => {
                let d = self.metric().distance(search.query, self.point(*pivot));
                search.stats.distance_evaluations += 1;
                if search.filter.accepts(*pivot) {
                    search.best.offer(*pivot, d);
                }

                let mu = *threshold;
                // Lower bounds from the triangle inequality:
                //   inner points: dist >= d - mu
                //   outer points: dist >= mu - d
                // Nearer side first so the bound tightens before the far side.
                if d <= mu {
                    if let Some(child) = *inner {
                        self.visit(child, search);
                    }
                    if let Some(child) = *outer {
                        if mu - d <= search.best.bound() + PRUNE_SLACK {
                            self.visit(child, search);
                        }
                    }
                } else {
                    if let Some(child) = *outer {
                        self.visit(child, search);
                    }
                    if let Some(child) = *inner {
                        if d - mu <= search.best.bound() + PRUNE_SLACK {
                            self.visit(child, search);
                        }
                    }
                }
            }
        }
    }
}
