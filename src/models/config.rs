use color_vptree::{BuildOptions, DistanceMetric, DEFAULT_LEAF_SIZE, DEFAULT_SEED};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Engine configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Capacity of the hex → hydrated profile cache
    #[serde(default = "default_hydration_cache_capacity")]
    pub hydration_cache_capacity: usize,

    /// Capacity of the (list, hex) → closest match cache
    #[serde(default = "default_match_cache_capacity")]
    pub match_cache_capacity: usize,

    /// Candidates fetched per query in unique batches
    #[serde(default = "default_unique_candidate_budget")]
    pub unique_candidate_budget: usize,

    /// Metric for lists that don't name one
    #[serde(default)]
    pub default_metric: DistanceMetric,

    /// Build trees as soon as a list is registered instead of on first use
    #[serde(default)]
    pub eager_build: bool,

    /// Largest number of entries stored in a tree leaf
    #[serde(default = "default_leaf_size")]
    pub leaf_size: usize,

    /// Seed for pivot selection
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Per-list overrides
    #[serde(default)]
    pub lists: HashMap<String, ListConfig>,
}

fn default_hydration_cache_capacity() -> usize {
    2048
}

fn default_match_cache_capacity() -> usize {
    8192
}

fn default_unique_candidate_budget() -> usize {
    1
}

fn default_leaf_size() -> usize {
    DEFAULT_LEAF_SIZE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Configuration for a single color list
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ListConfig {
    /// Metric override for this list
    #[serde(default)]
    pub metric: Option<DistanceMetric>,
}

impl EngineConfig {
    /// Load configuration from a YAML file, falling back to defaults.
    ///
    /// A missing or malformed file is logged and replaced by the defaults;
    /// `None` means no file was configured.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file configured, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        lists = config.lists.len(),
                        metric = %config.default_metric,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        %e,
                        path = %path.display(),
                        "Failed to parse config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    %e,
                    path = %path.display(),
                    "Failed to read config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Metric to use for a list.
    pub fn metric_for(&self, list_id: &str) -> DistanceMetric {
        self.lists
            .get(list_id)
            .and_then(|list| list.metric)
            .unwrap_or(self.default_metric)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            leaf_size: self.leaf_size,
            seed: self.seed,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hydration_cache_capacity: default_hydration_cache_capacity(),
            match_cache_capacity: default_match_cache_capacity(),
            unique_candidate_budget: default_unique_candidate_budget(),
            default_metric: DistanceMetric::default(),
            eager_build: false,
            leaf_size: default_leaf_size(),
            seed: default_seed(),
            lists: HashMap::new(),
        }
    }
}
