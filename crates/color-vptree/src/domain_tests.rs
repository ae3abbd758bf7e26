//! Domain-critical regression tests for color-vptree.
//!
//! Each test documents the class of bug it guards against.

#[cfg(test)]
mod domain_tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::color::Rgb;
    use crate::metric::{ColorMetric, DistanceMetric, Point3};
    use crate::unique::{assign_unique, UniqueAssigner};
    use crate::vptree::{Neighbor, Unfiltered, VpTree};

    fn tree_for(hexes: &[&str], metric: DistanceMetric) -> VpTree<Point3, DistanceMetric> {
        let points = hexes
            .iter()
            .map(|h| metric.project(h.parse::<Rgb>().unwrap()))
            .collect();
        VpTree::build(points, metric).unwrap()
    }

    fn project(hex: &str) -> Point3 {
        DistanceMetric::Cie76.project(hex.parse().unwrap())
    }

    // ========================================================================
    // Black/white scenario
    // ========================================================================

    /// If this breaks, it means: the basic nearest match or the greedy
    /// fallback is wrong. Near-black must match black; once black is taken
    /// a second near-black query must fall back to white; a third query
    /// against a two-entry list must be exhausted.
    #[test]
    fn test_black_white_scenario() {
        let tree = tree_for(&["#000000", "#ffffff"], DistanceMetric::Cie76);

        assert_eq!(tree.nearest_one(&project("#111111")).unwrap().index, 0);

        let distinct = assign_unique(&tree, &[project("#111111"), project("#eeeeee")], 1);
        assert_eq!(distinct[0].unwrap().index, 0);
        assert_eq!(distinct[1].unwrap().index, 1);

        let contested = assign_unique(&tree, &[project("#111111"), project("#101010")], 1);
        assert_eq!(contested[0].unwrap().index, 0);
        assert_eq!(contested[1].unwrap().index, 1);

        let overflow = assign_unique(
            &tree,
            &[project("#111111"), project("#101010"), project("#120303")],
            1,
        );
        assert_eq!(overflow.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(overflow[2].is_err());
    }

    // ========================================================================
    // Exactness: pruning must never lose the true nearest neighbor
    // ========================================================================

    /// If this breaks, it means: a pruning condition is off by a sign or
    /// uses a strict comparison where equality must still descend, and
    /// some queries return a near-but-not-nearest color.
    #[test]
    fn test_exact_against_brute_force_on_clustered_list() {
        let mut rng = StdRng::seed_from_u64(2024);
        // Tight clusters stress the threshold boundaries
        let mut colors = Vec::new();
        for _ in 0..40 {
            let base = Rgb::new(rng.gen(), rng.gen(), rng.gen());
            for _ in 0..25 {
                let jitter = |c: u8, rng: &mut StdRng| c.saturating_add(rng.gen_range(0..4));
                colors.push(Rgb::new(
                    jitter(base.r, &mut rng),
                    jitter(base.g, &mut rng),
                    jitter(base.b, &mut rng),
                ));
            }
        }

        for metric in DistanceMetric::ALL {
            let points: Vec<Point3> = colors.iter().map(|&c| metric.project(c)).collect();
            let tree = VpTree::build(points.clone(), metric).unwrap();

            for _ in 0..300 {
                let q = metric.project(Rgb::new(rng.gen(), rng.gen(), rng.gen()));
                let got = tree.nearest_one(&q).unwrap();
                let want = points
                    .iter()
                    .enumerate()
                    .map(|(index, p)| Neighbor {
                        index,
                        distance: ColorMetric::distance(&metric, &q, p),
                    })
                    .min_by(|a, b| {
                        a.distance
                            .total_cmp(&b.distance)
                            .then(a.index.cmp(&b.index))
                    })
                    .unwrap();
                assert_eq!(got, want, "{metric}");
            }
        }
    }

    // ========================================================================
    // Duplicate colors under different names
    // ========================================================================

    /// If this breaks, it means: tie-breaking depends on tree shape rather
    /// than list order. Curated lists do contain the same hex under several
    /// names; the first listed name must win, and in unique mode the next
    /// query must receive the next duplicate, not a different color.
    #[test]
    fn test_duplicate_hex_entries_resolve_by_list_order() {
        let mut hexes = vec!["#123456"; 5];
        hexes.extend(["#000000", "#ffffff", "#123457"]);
        let tree = tree_for(&hexes, DistanceMetric::Cie76);

        let q = project("#123456");
        assert_eq!(tree.nearest_one(&q).unwrap().index, 0);

        let results = assign_unique(&tree, &[q, q, q, q, q, q], 1);
        let indices: Vec<usize> = results.iter().map(|r| r.unwrap().index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 7]);
    }

    // ========================================================================
    // Unique mode cost stays sublinear as availability shrinks
    // ========================================================================

    /// If this breaks, it means: the availability filter is applied after
    /// the search instead of inside the descent, so a nearly exhausted
    /// batch degenerates into scanning the whole list per query.
    #[test]
    fn test_filtered_search_cost_with_sparse_availability() {
        let mut rng = StdRng::seed_from_u64(99);
        let metric = DistanceMetric::Cie76;
        let n = 5000;
        let points: Vec<Point3> = (0..n)
            .map(|_| metric.project(Rgb::new(rng.gen(), rng.gen(), rng.gen())))
            .collect();
        let tree = VpTree::build(points, metric).unwrap();

        let mut available = tree.available();
        let keep: HashSet<usize> = (0..n).step_by(500).collect();
        for i in 0..n {
            if !keep.contains(&i) {
                available.remove(i);
            }
        }
        assert_eq!(available.len(), 10);

        let q = metric.project(Rgb::new(128, 64, 200));
        let (found, stats) = tree.search(&q, 1, &available).unwrap();
        assert!(keep.contains(&found[0].index));
        assert!(
            stats.distance_evaluations < n / 10,
            "evaluated {} distances for 10 live points",
            stats.distance_evaluations
        );

        let (unfiltered, _) = tree.search(&q, 1, &Unfiltered).unwrap();
        assert!(unfiltered[0].distance <= found[0].distance);
    }

    // ========================================================================
    // Unique mode over a full list assigns every entry exactly once
    // ========================================================================

    /// If this breaks, it means: an index can be handed out twice or a
    /// live index becomes unreachable after removals elsewhere in its
    /// subtree.
    #[test]
    fn test_unique_batch_covers_list_exactly() {
        let mut rng = StdRng::seed_from_u64(5);
        let metric = DistanceMetric::Oklab;
        let n = 700;
        let points: Vec<Point3> = (0..n)
            .map(|_| metric.project(Rgb::new(rng.gen(), rng.gen(), rng.gen())))
            .collect();
        let tree = VpTree::build(points, metric).unwrap();

        let mut assigner = UniqueAssigner::new(&tree, 1);
        let mut seen = HashSet::new();
        for _ in 0..n {
            let q = metric.project(Rgb::new(rng.gen(), rng.gen(), rng.gen()));
            let got = assigner.assign(&q).unwrap();
            assert!(seen.insert(got.index), "index {} assigned twice", got.index);
        }
        assert_eq!(seen.len(), n);
        assert!(assigner.assign(&metric.project(Rgb::BLACK)).is_err());
    }
}
