//! color-vptree: exact nearest-color search over named color lists
//!
//! This crate holds the matching core of the color-name engine: color
//! conversions, the distance metrics, a vantage-point tree with exact
//! k-nearest-neighbor search, the greedy duplicate-free assigner, and the
//! pure hydration function. It performs no I/O and keeps no global state.
//!
//! # Quick Start
//!
//! ```
//! use color_vptree::{ColorMetric, DistanceMetric, Rgb, VpTree};
//!
//! let metric = DistanceMetric::Cie76;
//! let list: Vec<Rgb> = ["#000000", "#ffffff", "#ff0000"]
//!     .iter()
//!     .map(|hex| hex.parse().unwrap())
//!     .collect();
//! let points = list.iter().map(|&c| metric.project(c)).collect();
//! let tree = VpTree::build(points, metric).unwrap();
//!
//! let query = metric.project("#e01010".parse().unwrap());
//! assert_eq!(tree.nearest_one(&query).unwrap().index, 2);
//! ```
//!
//! # Metric Requirements
//!
//! A vantage-point tree prunes a subtree when the triangle inequality
//! proves it cannot hold anything closer than the current k-th best.
//! That proof needs a true metric. Every [`DistanceMetric`] is a Euclidean
//! distance over some projection of the color, so it qualifies. CIEDE2000
//! does not satisfy the triangle inequality and is deliberately absent.
//!
//! | Metric | Space | Notes |
//! |--------|-------|-------|
//! | [`DistanceMetric::Cie76`] | CIE Lab (D65) | default, ΔE*ab |
//! | [`DistanceMetric::Oklab`] | Oklab | more even in blues |
//! | [`DistanceMetric::Rgb`] | sRGB bytes | not perceptual |
//!
//! # Unique Assignment
//!
//! [`UniqueAssigner`] gives each query of a batch a different point. It
//! is greedy in arrival order. The availability filter is pushed into the
//! tree descent: subtrees whose points are all taken are skipped without
//! computing a single distance.

pub mod color;
pub mod hydrate;
pub mod metric;
pub mod unique;
pub mod vptree;

#[cfg(test)]
mod domain_tests;

pub use color::{Hsl, Lab, Oklab, ParseColorError, Rgb};
pub use hydrate::{best_contrast, contrast_ratio, hydrate, ColorProfile, Contrast};
pub use metric::{ColorMetric, DistanceMetric, Metric, Point3, UnknownMetricError};
pub use unique::{assign_unique, Exhausted, UniqueAssigner};
pub use vptree::{
    AvailableIndexSet, BuildOptions, CandidateFilter, Neighbor, SearchStats, Unfiltered, VpTree,
    VpTreeError, DEFAULT_LEAF_SIZE, DEFAULT_SEED,
};
