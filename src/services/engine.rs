//! The matching engine: list registration, single and batch matching,
//! k-nearest lookups and hydration.

use color_vptree::{ColorMetric, ColorProfile, Exhausted, Neighbor, Rgb, UniqueAssigner};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::match_cache::{ClosestMatchCache, EngineCacheStats, HydrationCache, MatchKey};
use super::tree_registry::{ColorTree, SharedMetric, TreeRegistry};
use crate::error::{ItemError, MatchError};
use crate::models::{
    BatchItem, BatchMatch, ColorListEntry, EngineConfig, HydratedColor, Match, RawColorEntry,
};

/// Batches hand control back to the runtime this often.
const YIELD_EVERY: usize = 256;

/// Cooperative cancellation for batches, checked before each item.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct MatchingEngine {
    config: EngineConfig,
    registry: Arc<TreeRegistry>,
    hydration_cache: HydrationCache,
    match_cache: ClosestMatchCache,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(TreeRegistry::new(config.build_options())),
            hydration_cache: HydrationCache::new(config.hydration_cache_capacity),
            match_cache: ClosestMatchCache::new(config.match_cache_capacity),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TreeRegistry {
        &self.registry
    }

    /// Register a color list under `metric`.
    ///
    /// The tree is built on first use, or right away in the background when
    /// `eager_build` is configured.
    pub async fn init<M: ColorMetric + 'static>(
        &self,
        list_id: &str,
        entries: Vec<RawColorEntry>,
        metric: M,
    ) -> Result<(), MatchError> {
        self.init_shared(list_id, entries, Arc::new(metric)).await
    }

    /// Register a color list with the metric configured for it.
    pub async fn register_list(
        &self,
        list_id: &str,
        entries: Vec<RawColorEntry>,
    ) -> Result<(), MatchError> {
        let metric = self.config.metric_for(list_id);
        self.init(list_id, entries, metric).await
    }

    pub async fn init_shared(
        &self,
        list_id: &str,
        entries: Vec<RawColorEntry>,
        metric: SharedMetric,
    ) -> Result<(), MatchError> {
        self.registry.register(list_id, entries, metric).await?;

        if self.config.eager_build {
            let registry = Arc::clone(&self.registry);
            let id = list_id.to_string();
            tokio::spawn(async move {
                if let Err(e) = registry.get(&id).await {
                    tracing::warn!(list = %id, %e, "Eager build failed, will retry on first use");
                }
            });
        }
        Ok(())
    }

    /// The built tree of a list.
    pub async fn tree(&self, list_id: &str) -> Result<Arc<ColorTree>, MatchError> {
        self.registry.get(list_id).await
    }

    /// Closest entry of `list_id` to `hex`.
    pub async fn match_one(&self, hex: &str, list_id: &str) -> Result<Match, MatchError> {
        let rgb = parse_hex(hex)?;
        let key = MatchKey::new(list_id, rgb);
        if let Some(hit) = self.match_cache.get(&key) {
            return Ok(hit);
        }

        let tree = self.registry.get(list_id).await?;
        self.closest(&tree, rgb, key)
    }

    /// The `k` closest entries, nearest first. Not cached.
    pub async fn nearest(
        &self,
        hex: &str,
        list_id: &str,
        k: usize,
    ) -> Result<Vec<Match>, MatchError> {
        let rgb = parse_hex(hex)?;
        let tree = self.registry.get(list_id).await?;
        let neighbors = tree.tree().nearest(&tree.project(rgb), k)?;
        let requested_hex = rgb.to_hex();

        Ok(neighbors
            .into_iter()
            .map(|n| to_match(&tree, &requested_hex, n))
            .collect())
    }

    /// Match every hex against `list_id`, in order.
    ///
    /// With `unique`, no entry is handed out twice; once the list runs out
    /// the remaining items fail with `Exhaustion` and the whole batch is
    /// returned as `MatchError::Exhaustion`. Unparsable hexes get an
    /// item-level error and consume nothing.
    pub async fn match_batch<S: AsRef<str>>(
        &self,
        hexes: &[S],
        list_id: &str,
        unique: bool,
    ) -> Result<BatchMatch, MatchError> {
        self.match_batch_cancellable(hexes, list_id, unique, &CancelFlag::new())
            .await
    }

    /// Like [`match_batch`](Self::match_batch), stopping early once `cancel`
    /// is set. Items not reached are marked `Cancelled`.
    pub async fn match_batch_cancellable<S: AsRef<str>>(
        &self,
        hexes: &[S],
        list_id: &str,
        unique: bool,
        cancel: &CancelFlag,
    ) -> Result<BatchMatch, MatchError> {
        let tree = self.registry.get(list_id).await?;
        if !unique && tree.is_empty() {
            return Err(MatchError::EmptyIndex);
        }

        let mut items = Vec::with_capacity(hexes.len());
        let mut assigner = unique.then(|| {
            UniqueAssigner::new(tree.tree(), self.config.unique_candidate_budget)
        });
        let mut cancelled = false;
        let mut exhausted = false;

        for (position, hex) in hexes.iter().enumerate() {
            let hex = hex.as_ref();
            if position > 0 && position % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
            if cancelled || cancel.is_cancelled() {
                cancelled = true;
                items.push(BatchItem::failed(hex, ItemError::Cancelled));
                continue;
            }

            let rgb = match hex.parse::<Rgb>() {
                Ok(rgb) => rgb,
                Err(e) => {
                    items.push(BatchItem::failed(hex, e.into()));
                    continue;
                }
            };

            let item = match assigner.as_mut() {
                Some(assigner) => match assigner.assign(&tree.project(rgb)) {
                    Ok(n) => BatchItem::matched(hex, to_match(&tree, &rgb.to_hex(), n)),
                    Err(Exhausted { capacity }) => {
                        exhausted = true;
                        BatchItem::failed(hex, ItemError::Exhaustion { capacity })
                    }
                },
                None => {
                    let key = MatchKey::new(list_id, rgb);
                    let matched = match self.match_cache.get(&key) {
                        Some(hit) => hit,
                        None => self.closest(&tree, rgb, key)?,
                    };
                    BatchItem::matched(hex, matched)
                }
            };
            items.push(item);
        }

        let batch = BatchMatch {
            list: list_id.to_string(),
            unique,
            items,
        };
        tracing::debug!(
            list = %list_id,
            unique,
            items = batch.items.len(),
            matched = batch.matched_count(),
            cancelled,
            exhausted,
            "Matched batch"
        );

        if cancelled {
            Err(MatchError::Cancelled(batch))
        } else if exhausted {
            Err(MatchError::Exhaustion(batch))
        } else {
            Ok(batch)
        }
    }

    /// Attach every derived representation to a list entry.
    pub fn hydrate(&self, entry: &ColorListEntry) -> HydratedColor {
        HydratedColor {
            name: entry.name.clone(),
            profile: self.hydration_cache.get_or_hydrate(entry.rgb),
        }
    }

    /// Hydrate an arbitrary hex.
    pub fn hydrate_hex(&self, hex: &str) -> Result<ColorProfile, MatchError> {
        let rgb = parse_hex(hex)?;
        Ok(self.hydration_cache.get_or_hydrate(rgb))
    }

    pub async fn list_ids(&self) -> Vec<String> {
        self.registry.list_ids().await
    }

    pub fn cache_stats(&self) -> EngineCacheStats {
        EngineCacheStats {
            hydration: self.hydration_cache.stats(),
            closest_match: self.match_cache.stats(),
        }
    }

    /// Uncached nearest lookup, storing the result in the match cache.
    fn closest(&self, tree: &ColorTree, rgb: Rgb, key: MatchKey) -> Result<Match, MatchError> {
        let nearest = tree.tree().nearest_one(&tree.project(rgb))?;
        let matched = to_match(tree, key.hex(), nearest);
        self.match_cache.put(key, matched.clone());
        Ok(matched)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn parse_hex(hex: &str) -> Result<Rgb, MatchError> {
    hex.parse().map_err(|e| MatchError::invalid_color(hex, e))
}

fn to_match(tree: &ColorTree, requested_hex: &str, neighbor: Neighbor) -> Match {
    Match {
        requested_hex: requested_hex.to_string(),
        entry: tree.entry(neighbor.index).clone(),
        distance: neighbor.distance,
    }
}
