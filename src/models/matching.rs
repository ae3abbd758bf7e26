//! Results of matching colors against a list.

use color_vptree::ColorProfile;
use serde::Serialize;

use super::ColorListEntry;
use crate::error::ItemError;

/// The closest entry of a list to a requested color.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// The requested color, normalized to `#rrggbb`
    pub requested_hex: String,
    pub entry: ColorListEntry,
    /// Distance under the list's metric
    pub distance: f64,
}

/// One position of a batch, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    /// The hex exactly as requested
    pub hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

impl BatchItem {
    pub fn matched(hex: impl Into<String>, matched: Match) -> Self {
        Self {
            hex: hex.into(),
            matched: Some(matched),
            error: None,
        }
    }

    pub fn failed(hex: impl Into<String>, error: ItemError) -> Self {
        Self {
            hex: hex.into(),
            matched: None,
            error: Some(error),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }
}

/// Result of a batch, one item per requested hex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMatch {
    pub list: String,
    pub unique: bool,
    pub items: Vec<BatchItem>,
}

/// A batch that stopped short. Every requested position is still present;
/// the ones that could not be served carry an item error.
pub type PartialBatch = BatchMatch;

impl BatchMatch {
    pub fn matched_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_matched()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.items.len() - self.matched_count()
    }

    /// Matched entries in request order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.items.iter().filter_map(|item| item.matched.as_ref())
    }
}

/// A list entry with every derived representation of its color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedColor {
    pub name: String,
    #[serde(flatten)]
    pub profile: ColorProfile,
}
