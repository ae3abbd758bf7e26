//! Batch-local availability tracking for duplicate-free assignment.

use super::search::CandidateFilter;
use super::Layout;

/// The set of point indices not yet consumed by the current batch.
///
/// Alongside the per-index flags it keeps, for every tree node, how many
/// available points remain in that node's subtree. A search filtered by
/// this set skips any subtree whose count has dropped to zero, so cost
/// does not degrade as the set empties.
///
/// The set borrows the tree it was created from and is never shared
/// between batches.
#[derive(Debug, Clone)]
pub struct AvailableIndexSet<'t> {
    layout: &'t Layout,
    available: Vec<bool>,
    live: Vec<usize>,
    remaining: usize,
}

impl<'t> AvailableIndexSet<'t> {
    pub(crate) fn new(layout: &'t Layout) -> Self {
        let n = layout.owner.len();
        Self {
            layout,
            available: vec![true; n],
            live: layout.size.clone(),
            remaining: n,
        }
    }

    /// Number of indices still available.
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining
    }

    /// Returns true once every index has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Whether `index` is still available.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.available.get(index).copied().unwrap_or(false)
    }

    /// Consume `index`. Returns false if it was already consumed or out of
    /// range.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.available[index] = false;
        self.remaining -= 1;

        let mut node = Some(self.layout.owner[index]);
        while let Some(id) = node {
            self.live[id] -= 1;
            node = self.layout.parent[id];
        }
        true
    }

    /// Available points left under `node`.
    #[inline]
    pub fn live_in(&self, node: usize) -> usize {
        self.live[node]
    }
}

impl CandidateFilter for AvailableIndexSet<'_> {
    #[inline]
    fn accepts(&self, index: usize) -> bool {
        self.available[index]
    }

    #[inline]
    fn subtree_live(&self, node: usize) -> bool {
        self.live[node] > 0
    }
}
