use color_vptree::{ParseColorError, VpTreeError};
use serde::Serialize;
use thiserror::Error;

use crate::models::PartialBatch;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Metric returned invalid distance {distance} between entries {a} and {b}")]
    InvalidMetric { a: usize, b: usize, distance: f64 },

    #[error("Color list is empty")]
    EmptyIndex,

    #[error(
        "Color list exhausted: {} of {} colors matched",
        .0.matched_count(),
        .0.items.len()
    )]
    Exhaustion(PartialBatch),

    #[error("Failed to build color list {list}: {reason}")]
    BuildFailure { list: String, reason: String },

    #[error("Unknown color list: {0}")]
    UnknownList(String),

    #[error("Color list already registered: {0}")]
    DuplicateList(String),

    #[error("Invalid color {input:?}: {source}")]
    InvalidColor {
        input: String,
        #[source]
        source: ParseColorError,
    },

    #[error(
        "Batch cancelled: {} of {} colors matched",
        .0.matched_count(),
        .0.items.len()
    )]
    Cancelled(PartialBatch),
}

impl MatchError {
    pub fn invalid_color(input: &str, source: ParseColorError) -> Self {
        MatchError::InvalidColor {
            input: input.to_string(),
            source,
        }
    }

    /// The batch carried by `Exhaustion` or `Cancelled`.
    pub fn partial_batch(&self) -> Option<&PartialBatch> {
        match self {
            MatchError::Exhaustion(batch) | MatchError::Cancelled(batch) => Some(batch),
            _ => None,
        }
    }
}

impl From<VpTreeError> for MatchError {
    fn from(e: VpTreeError) -> Self {
        match e {
            VpTreeError::InvalidMetric { a, b, distance } => {
                MatchError::InvalidMetric { a, b, distance }
            }
            VpTreeError::EmptyIndex => MatchError::EmptyIndex,
        }
    }
}

/// Why a single position of a batch has no match.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemError {
    #[error("Invalid color: {reason}")]
    InvalidColor { reason: String },

    #[error("All {capacity} colors of the list are already assigned")]
    Exhaustion { capacity: usize },

    #[error("Cancelled")]
    Cancelled,
}

impl From<ParseColorError> for ItemError {
    fn from(e: ParseColorError) -> Self {
        ItemError::InvalidColor {
            reason: e.to_string(),
        }
    }
}

/// Failure to read a color list from the bundled or external sources
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Color list not found: {0}")]
    NotFound(String),

    #[error("Failed to parse color list {id}: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
