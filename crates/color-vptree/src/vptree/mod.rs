//! Vantage-point tree: an exact nearest-neighbor index over a metric space.
//!
//! The tree is built once per color list and never mutated afterwards.
//! Every node partitions its points by distance to a pivot: points no
//! farther than the node's threshold `μ` go to the inner subtree, the rest
//! to the outer subtree. During search, the triangle inequality bounds the
//! distance from the query to anything in a subtree, which lets whole
//! subtrees be skipped.
//!
//! # Layout
//!
//! Nodes live in a flat arena. Besides the nodes themselves the tree keeps
//! a [`Layout`]: the parent of every node, the number of points under every
//! node, and the node that owns every point. The layout is what lets a
//! batch-local [`AvailableIndexSet`] track which subtrees still contain
//! unconsumed points without touching the tree itself.

mod available;
mod search;

pub use available::AvailableIndexSet;
pub use search::{CandidateFilter, Neighbor, SearchStats, Unfiltered};

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::metric::Metric;

/// Largest number of points stored in a leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

/// Seed for pivot selection. Builds are deterministic for a given input.
pub const DEFAULT_SEED: u64 = 0x00c0_1012_5eed;

/// Error type for tree construction and search.
#[derive(Debug, Clone, PartialEq)]
pub enum VpTreeError {
    /// The metric returned a negative, NaN or infinite distance.
    InvalidMetric {
        /// First point index
        a: usize,
        /// Second point index
        b: usize,
        /// The offending value
        distance: f64,
    },
    /// Search against a tree with no points.
    EmptyIndex,
}

impl fmt::Display for VpTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpTreeError::InvalidMetric { a, b, distance } => {
                write!(
                    f,
                    "metric returned invalid distance {} between points {} and {}",
                    distance, a, b
                )
            }
            VpTreeError::EmptyIndex => write!(f, "search against an empty index"),
        }
    }
}

impl std::error::Error for VpTreeError {}

/// Build parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Largest number of points stored in a leaf (at least 2).
    pub leaf_size: usize,
    /// Seed for the pivot-selection RNG.
    pub seed: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Branch {
        pivot: usize,
        /// Inner points are at distance <= threshold from the pivot,
        /// outer points at distance >= threshold.
        threshold: f64,
        inner: Option<usize>,
        outer: Option<usize>,
    },
    Leaf {
        indices: Vec<usize>,
    },
}

/// Parent links, subtree sizes and point ownership for every node.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) parent: Vec<Option<usize>>,
    pub(crate) size: Vec<usize>,
    pub(crate) owner: Vec<usize>,
}

/// An immutable vantage-point tree over points of type `P`.
///
/// # Example
///
/// ```
/// use color_vptree::{ColorMetric, DistanceMetric, Rgb, VpTree};
///
/// let metric = DistanceMetric::Cie76;
/// let points = vec![metric.project(Rgb::BLACK), metric.project(Rgb::WHITE)];
/// let tree = VpTree::build(points, metric).unwrap();
///
/// let query = metric.project(Rgb::new(0x11, 0x11, 0x11));
/// let best = tree.nearest_one(&query).unwrap();
/// assert_eq!(best.index, 0);
/// ```
#[derive(Debug, Clone)]
pub struct VpTree<P, M> {
    points: Vec<P>,
    metric: M,
    pub(crate) nodes: Vec<Node>,
    pub(crate) layout: Layout,
    pub(crate) root: Option<usize>,
    depth: usize,
}

impl<P, M: Metric<P>> VpTree<P, M> {
    /// Build a tree with default options.
    ///
    /// # Errors
    ///
    /// Returns [`VpTreeError::InvalidMetric`] if the metric yields a
    /// negative, NaN or infinite distance for any pair it is asked about.
    pub fn build(points: Vec<P>, metric: M) -> Result<Self, VpTreeError> {
        Self::build_with(points, metric, BuildOptions::default())
    }

    /// Build a tree with explicit options.
    pub fn build_with(
        points: Vec<P>,
        metric: M,
        options: BuildOptions,
    ) -> Result<Self, VpTreeError> {
        let n = points.len();
        let mut builder = Builder {
            points: &points,
            metric: &metric,
            leaf_size: options.leaf_size.max(2),
            rng: StdRng::seed_from_u64(options.seed),
            nodes: Vec::new(),
            parent: Vec::new(),
            size: Vec::new(),
            owner: vec![usize::MAX; n],
            depth: 0,
        };

        let mut order: Vec<usize> = (0..n).collect();
        let root = if n == 0 {
            None
        } else {
            Some(builder.build_node(&mut order, None, 0)?)
        };

        let Builder {
            nodes,
            parent,
            size,
            owner,
            depth,
            ..
        } = builder;

        Ok(Self {
            points,
            metric,
            nodes,
            layout: Layout {
                parent,
                size,
                owner,
            },
            root,
            depth,
        })
    }
}

impl<P, M> VpTree<P, M> {
    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the tree holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point stored at `index`.
    #[inline]
    pub fn point(&self, index: usize) -> &P {
        &self.points[index]
    }

    /// The metric the tree was built with.
    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Number of levels (0 for an empty tree).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A fresh availability set containing every index of this tree.
    ///
    /// The set borrows the tree's layout and is meant to live for one batch.
    pub fn available(&self) -> AvailableIndexSet<'_> {
        AvailableIndexSet::new(&self.layout)
    }

    /// Every point index, in arena order. Each index appears exactly once.
    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.points.len());
        for node in &self.nodes {
            match node {
                Node::Branch { pivot, .. } => out.push(*pivot),
                Node::Leaf { indices } => out.extend_from_slice(indices),
            }
        }
        out
    }
}

struct Builder<'a, P, M> {
    points: &'a [P],
    metric: &'a M,
    leaf_size: usize,
    rng: StdRng,
    nodes: Vec<Node>,
    parent: Vec<Option<usize>>,
    size: Vec<usize>,
    owner: Vec<usize>,
    depth: usize,
}

impl<P, M: Metric<P>> Builder<'_, P, M> {
    fn checked_distance(&self, a: usize, b: usize) -> Result<f64, VpTreeError> {
        let distance = self.metric.distance(&self.points[a], &self.points[b]);
        if distance.is_finite() && distance >= 0.0 {
            Ok(distance)
        } else {
            Err(VpTreeError::InvalidMetric { a, b, distance })
        }
    }

    fn build_node(
        &mut self,
        items: &mut [usize],
        parent: Option<usize>,
        level: usize,
    ) -> Result<usize, VpTreeError> {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            indices: Vec::new(),
        });
        self.parent.push(parent);
        self.size.push(items.len());
        self.depth = self.depth.max(level + 1);

        if items.len() <= self.leaf_size {
            // Leaves never compute pivot distances; check the metric anyway
            // so small lists reject broken metrics too.
            for &i in items.iter().skip(1) {
                self.checked_distance(items[0], i)?;
            }
            for &i in items.iter() {
                self.owner[i] = id;
            }
            self.nodes[id] = Node::Leaf {
                indices: items.to_vec(),
            };
            return Ok(id);
        }

        let pick = self.rng.gen_range(0..items.len());
        items.swap(0, pick);
        let (head, rest) = items.split_at_mut(1);
        let pivot = head[0];
        self.owner[pivot] = id;

        let mut by_distance = Vec::with_capacity(rest.len());
        for &i in rest.iter() {
            by_distance.push((self.checked_distance(pivot, i)?, i));
        }
        by_distance.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        // Split by position, not by value, so runs of equal distances
        // (duplicate colors) still halve the problem.
        let mid = by_distance.len() / 2;
        let threshold = by_distance[mid - 1].0;
        for (slot, &(_, i)) in rest.iter_mut().zip(&by_distance) {
            *slot = i;
        }

        let (inner_items, outer_items) = rest.split_at_mut(mid);
        let inner = Some(self.build_node(inner_items, Some(id), level + 1)?);
        let outer = if outer_items.is_empty() {
            None
        } else {
            Some(self.build_node(outer_items, Some(id), level + 1)?)
        };

        self.nodes[id] = Node::Branch {
            pivot,
            threshold,
            inner,
            outer,
        };
        Ok(id)
    }
}
