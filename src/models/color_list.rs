use color_vptree::{ParseColorError, Rgb};
use serde::{Deserialize, Serialize};

/// A color-list entry as provisioned (JSON `{"hex": .., "name": ..}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColorEntry {
    pub hex: String,
    pub name: String,
}

impl RawColorEntry {
    pub fn new(hex: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            name: name.into(),
        }
    }
}

/// A validated entry of a built color list.
///
/// `index` is the entry's position in the list it was provisioned with and
/// doubles as its identity inside the list's tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorListEntry {
    pub index: usize,
    /// Normalized `#rrggbb`
    pub hex: String,
    pub name: String,
    pub rgb: Rgb,
}

impl ColorListEntry {
    /// Validate a raw entry, normalizing its hex.
    pub fn from_raw(index: usize, raw: &RawColorEntry) -> Result<Self, ParseColorError> {
        let rgb: Rgb = raw.hex.parse()?;
        Ok(Self {
            index,
            hex: rgb.to_hex(),
            name: raw.name.clone(),
            rgb,
        })
    }
}
