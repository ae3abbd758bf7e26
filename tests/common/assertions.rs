//! Assertion helpers for tests.

use color_vptree::{ColorMetric, Rgb};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

use colorname::models::{BatchMatch, Match, RawColorEntry};

/// Index and distance of the closest entry by exhaustive scan, lowest
/// index winning ties
pub fn brute_force_nearest(
    entries: &[RawColorEntry],
    metric: &dyn ColorMetric,
    hex: &str,
) -> (usize, f64) {
    let query = metric.project(hex.parse::<Rgb>().unwrap());
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let point = metric.project(entry.hex.parse::<Rgb>().unwrap());
            (index, metric.distance(&query, &point))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .expect("brute force over an empty list")
}

/// Assert a match is the exhaustive-scan nearest entry
pub fn assert_exact(match_: &Match, entries: &[RawColorEntry], metric: &dyn ColorMetric) {
    let (index, distance) = brute_force_nearest(entries, metric, &match_.requested_hex);
    assert_eq!(
        (match_.entry.index, match_.distance),
        (index, distance),
        "{} matched {:?} under {}",
        match_.requested_hex,
        match_.entry.name,
        metric.name()
    );
}

/// Assert no entry index appears twice among the batch's matches
pub fn assert_distinct(batch: &BatchMatch) {
    let mut seen = HashSet::new();
    for m in batch.matches() {
        assert!(
            seen.insert(m.entry.index),
            "entry {} ({}) assigned twice",
            m.entry.index,
            m.entry.name
        );
    }
}
