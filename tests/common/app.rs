//! Test engine factory for integration tests.

use color_vptree::{ColorMetric, DistanceMetric};
use std::ops::Deref;

use colorname::models::{EngineConfig, RawColorEntry};
use colorname::services::MatchingEngine;

use super::fixtures;

/// A matching engine with lists registered up front
pub struct TestEngine {
    engine: MatchingEngine,
}

impl TestEngine {
    /// Engine with default config and no lists
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: MatchingEngine::new(config),
        }
    }

    /// Engine holding the black/white list under id `bw`
    pub async fn black_white() -> Self {
        Self::new()
            .with_list(
                fixtures::lists::BLACK_WHITE,
                fixtures::black_white(),
                DistanceMetric::Cie76,
            )
            .await
    }

    /// Register a list, panicking on failure
    pub async fn with_list<M: ColorMetric + 'static>(
        self,
        list_id: &str,
        entries: Vec<RawColorEntry>,
        metric: M,
    ) -> Self {
        self.engine
            .init(list_id, entries, metric)
            .await
            .expect("Failed to register list");
        self
    }

    pub fn into_inner(self) -> MatchingEngine {
        self.engine
    }
}

impl Deref for TestEngine {
    type Target = MatchingEngine;

    fn deref(&self) -> &MatchingEngine {
        &self.engine
    }
}
