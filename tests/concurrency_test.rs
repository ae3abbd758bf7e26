//! Lazy build, single-flight and build-failure tests.

mod common;

use color_vptree::{ColorMetric, DistanceMetric, Point3, Rgb};
use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use colorname::error::MatchError;
use colorname::models::EngineConfig;
use colorname::services::{MatchingEngine, SharedMetric};

use common::fixtures::{self, lists};
use common::TestEngine;

/// Euclidean sRGB metric that returns NaN while armed
#[derive(Debug, Default)]
struct FlakyMetric {
    armed: AtomicBool,
}

impl ColorMetric for FlakyMetric {
    fn name(&self) -> &str {
        "flaky"
    }

    fn project(&self, rgb: Rgb) -> Point3 {
        DistanceMetric::Rgb.project(rgb)
    }

    fn distance(&self, a: &Point3, b: &Point3) -> f64 {
        if self.armed.load(Ordering::SeqCst) {
            f64::NAN
        } else {
            color_vptree::metric::euclidean(a, b)
        }
    }
}

/// Metric that panics as soon as the tree asks for a distance
#[derive(Debug)]
struct PanickingMetric;

impl ColorMetric for PanickingMetric {
    fn name(&self) -> &str {
        "panicking"
    }

    fn project(&self, rgb: Rgb) -> Point3 {
        DistanceMetric::Rgb.project(rgb)
    }

    fn distance(&self, _a: &Point3, _b: &Point3) -> f64 {
        panic!("distance requested");
    }
}

#[tokio::test]
async fn test_registration_is_lazy() {
    let engine = TestEngine::black_white().await;

    assert!(!engine.registry().is_built(lists::BLACK_WHITE).await);
    assert_eq!(engine.registry().build_count(), 0);

    engine.match_one("#111111", lists::BLACK_WHITE).await.unwrap();
    assert!(engine.registry().is_built(lists::BLACK_WHITE).await);
    assert_eq!(engine.registry().build_count(), 1);
}

#[tokio::test]
async fn test_concurrent_first_access_builds_once() {
    let engine = TestEngine::new()
        .with_list(
            lists::RANDOM,
            fixtures::random_list(5, 2000),
            DistanceMetric::Cie76,
        )
        .await;
    let queries = fixtures::random_queries(6, 32);

    let results = join_all(
        queries
            .iter()
            .map(|hex| engine.match_one(hex, lists::RANDOM)),
    )
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(engine.registry().build_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_across_threads() {
    let engine = Arc::new(
        TestEngine::new()
            .with_list(
                lists::RANDOM,
                fixtures::random_list(8, 3000),
                DistanceMetric::Oklab,
            )
            .await
            .into_inner(),
    );

    let handles: Vec<_> = fixtures::random_queries(9, 16)
        .into_iter()
        .map(|hex| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.match_one(&hex, lists::RANDOM).await })
        })
        .collect();

    for handle in join_all(handles).await {
        handle.unwrap().unwrap();
    }
    assert_eq!(engine.registry().build_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unique_batches_are_isolated() {
    let engine = Arc::new(
        TestEngine::new()
            .with_list(
                lists::RANDOM,
                fixtures::random_list(10, 64),
                DistanceMetric::Cie76,
            )
            .await
            .into_inner(),
    );
    let queries = fixtures::random_queries(11, 64);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let queries = queries.clone();
            tokio::spawn(async move { engine.match_batch(&queries, lists::RANDOM, true).await })
        })
        .collect();

    let batches: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap().unwrap())
        .collect();

    // Every batch sees the full list, unaffected by the others
    for batch in &batches {
        assert_eq!(batch.matched_count(), 64);
        assert_eq!(batch, &batches[0]);
    }
}

#[tokio::test]
async fn test_failed_build_is_retried() {
    let engine = MatchingEngine::new(EngineConfig::default());
    let metric = Arc::new(FlakyMetric::default());
    metric.armed.store(true, Ordering::SeqCst);

    let shared: SharedMetric = metric.clone();
    engine
        .init_shared(lists::BLACK_WHITE, fixtures::black_white(), shared)
        .await
        .unwrap();

    let result = engine.match_one("#111111", lists::BLACK_WHITE).await;
    assert!(matches!(result, Err(MatchError::InvalidMetric { .. })));
    assert!(!engine.registry().is_built(lists::BLACK_WHITE).await);

    metric.armed.store(false, Ordering::SeqCst);
    let matched = engine.match_one("#111111", lists::BLACK_WHITE).await.unwrap();
    assert_eq!(matched.entry.name, "Black");
    assert_eq!(engine.registry().build_count(), 2);
}

#[tokio::test]
async fn test_panicking_build_is_a_build_failure() {
    let engine = TestEngine::new()
        .with_list(lists::BLACK_WHITE, fixtures::black_white(), PanickingMetric)
        .await;

    let result = engine.match_one("#111111", lists::BLACK_WHITE).await;
    match result {
        Err(MatchError::BuildFailure { list, reason }) => {
            assert_eq!(list, lists::BLACK_WHITE);
            assert_eq!(reason, "build task panicked");
        }
        other => panic!("Expected BuildFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_entry_fails_build() {
    let mut entries = fixtures::black_white();
    entries.push(colorname::models::RawColorEntry::new("not a color", "Broken"));
    let engine = TestEngine::new()
        .with_list("broken", entries, DistanceMetric::Cie76)
        .await;

    let result = engine.match_batch(&["#111111"], "broken", false).await;
    assert!(matches!(result, Err(MatchError::BuildFailure { .. })));
}

#[tokio::test]
async fn test_eager_build() {
    let config = EngineConfig {
        eager_build: true,
        ..EngineConfig::default()
    };
    let engine = TestEngine::with_config(config)
        .with_list(
            lists::RANDOM,
            fixtures::random_list(12, 500),
            DistanceMetric::Cie76,
        )
        .await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while !engine.registry().is_built(lists::RANDOM).await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("eager build did not finish");

    engine.match_one("#123456", lists::RANDOM).await.unwrap();
    assert_eq!(engine.registry().build_count(), 1);
}
