//! Per-list vantage-point trees, built lazily and at most once.
//!
//! Registering a list only records its raw entries and metric. The tree is
//! built on first access; concurrent first accessors await the same build.
//! A failed build leaves the slot empty so the next access retries.

use color_vptree::{BuildOptions, ColorMetric, Point3, Rgb, VpTree};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OnceCell, RwLock};

use crate::error::MatchError;
use crate::models::{ColorListEntry, RawColorEntry};

/// Metric shared by a list's tree and its callers
pub type SharedMetric = Arc<dyn ColorMetric>;

/// A built color list: validated entries plus their index.
pub struct ColorTree {
    list: String,
    entries: Vec<ColorListEntry>,
    tree: VpTree<Point3, SharedMetric>,
}

impl ColorTree {
    /// Validate `raw` and index it under `metric`.
    ///
    /// Any unparsable entry fails the whole build; so does a metric that
    /// produces a negative or non-finite distance.
    pub fn build(
        list: &str,
        raw: &[RawColorEntry],
        metric: SharedMetric,
        options: BuildOptions,
    ) -> Result<Self, MatchError> {
        let entries = raw
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                ColorListEntry::from_raw(index, entry).map_err(|e| MatchError::BuildFailure {
                    list: list.to_string(),
                    reason: format!("entry {index} ({:?}, {:?}): {e}", entry.name, entry.hex),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let points = entries.iter().map(|e| metric.project(e.rgb)).collect();
        let tree = VpTree::build_with(points, metric, options)?;

        Ok(Self {
            list: list.to_string(),
            entries,
            tree,
        })
    }

    pub fn list(&self) -> &str {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ColorListEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> &ColorListEntry {
        &self.entries[index]
    }

    pub fn metric(&self) -> &dyn ColorMetric {
        &**self.tree.metric()
    }

    /// Coordinates of `rgb` in this list's metric space.
    pub fn project(&self, rgb: Rgb) -> Point3 {
        self.metric().project(rgb)
    }

    pub fn tree(&self) -> &VpTree<Point3, SharedMetric> {
        &self.tree
    }
}

struct ListSlot {
    raw: Arc<Vec<RawColorEntry>>,
    metric: SharedMetric,
    tree: OnceCell<Arc<ColorTree>>,
}

/// Registry of color lists keyed by list id
pub struct TreeRegistry {
    slots: RwLock<HashMap<String, Arc<ListSlot>>>,
    options: BuildOptions,
    builds: AtomicUsize,
}

impl TreeRegistry {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            options,
            builds: AtomicUsize::new(0),
        }
    }

    /// Record a list. The tree is not built yet.
    pub async fn register(
        &self,
        list_id: &str,
        entries: Vec<RawColorEntry>,
        metric: SharedMetric,
    ) -> Result<(), MatchError> {
        let mut slots = self.slots.write().await;
        if slots.contains_key(list_id) {
            return Err(MatchError::DuplicateList(list_id.to_string()));
        }

        tracing::debug!(
            list = %list_id,
            entries = entries.len(),
            metric = metric.name(),
            "Registered color list"
        );
        slots.insert(
            list_id.to_string(),
            Arc::new(ListSlot {
                raw: Arc::new(entries),
                metric,
                tree: OnceCell::new(),
            }),
        );
        Ok(())
    }

    /// Get the built tree for a list, building it on first access.
    pub async fn get(&self, list_id: &str) -> Result<Arc<ColorTree>, MatchError> {
        let slot = self
            .slots
            .read()
            .await
            .get(list_id)
            .cloned()
            .ok_or_else(|| MatchError::UnknownList(list_id.to_string()))?;

        let tree = slot
            .tree
            .get_or_try_init(|| self.build(list_id, &slot))
            .await?;
        Ok(Arc::clone(tree))
    }

    async fn build(&self, list_id: &str, slot: &ListSlot) -> Result<Arc<ColorTree>, MatchError> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let list = list_id.to_string();
        let raw = Arc::clone(&slot.raw);
        let metric = Arc::clone(&slot.metric);
        let options = self.options;
        let result =
            tokio::task::spawn_blocking(move || ColorTree::build(&list, &raw, metric, options))
                .await;

        match result {
            Ok(Ok(tree)) => {
                tracing::info!(
                    list = %list_id,
                    entries = tree.len(),
                    depth = tree.tree().depth(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Built color tree"
                );
                Ok(Arc::new(tree))
            }
            Ok(Err(e)) => {
                tracing::warn!(list = %list_id, %e, "Color tree build failed");
                Err(e)
            }
            Err(e) => {
                let reason = if e.is_panic() {
                    "build task panicked"
                } else {
                    "build task was cancelled"
                };
                tracing::error!(list = %list_id, %e, "Color tree build task failed");
                Err(MatchError::BuildFailure {
                    list: list_id.to_string(),
                    reason: reason.to_string(),
                })
            }
        }
    }

    pub async fn contains(&self, list_id: &str) -> bool {
        self.slots.read().await.contains_key(list_id)
    }

    /// Whether the list's tree has been built.
    pub async fn is_built(&self, list_id: &str) -> bool {
        self.slots
            .read()
            .await
            .get(list_id)
            .is_some_and(|slot| slot.tree.initialized())
    }

    /// Registered list ids, sorted
    pub async fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.slots.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of build attempts started so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl Default for TreeRegistry {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}
