//! Color list loading with embedded fallbacks
//!
//! Lists are JSON arrays of `{"hex": .., "name": ..}` objects, one file per
//! list; the file stem is the list id.
//!
//! - If `LISTS_DIR` is NOT set: use the embedded lists only
//! - If `LISTS_DIR` IS set: files there are added to the embedded lists and
//!   override an embedded list with the same id

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ListError;
use crate::models::RawColorEntry;

/// Embedded color lists
#[derive(RustEmbed)]
#[folder = "lists/"]
#[include = "*.json"]
struct EmbeddedLists;

/// Loader for bundled and external color lists
pub struct ListLoader {
    /// External lists directory (from LISTS_DIR env var)
    lists_dir: Option<PathBuf>,
}

impl ListLoader {
    /// Create a new list loader
    ///
    /// `lists_dir` should be `Some` only if an external directory was
    /// configured. If `None`, embedded lists are used exclusively.
    pub fn new(lists_dir: Option<PathBuf>) -> Self {
        Self { lists_dir }
    }

    /// Create a loader honoring the `LISTS_DIR` env var
    pub fn from_env() -> Self {
        Self::new(std::env::var("LISTS_DIR").ok().map(PathBuf::from))
    }

    /// Ids of all available lists (merged view of embedded + external)
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: BTreeSet<String> = EmbeddedLists::iter()
            .filter_map(|file| list_id(Path::new(&*file)))
            .collect();

        if let Some(ref dir) = self.lists_dir {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    if let Some(id) = list_id(&entry.path()) {
                        ids.insert(id);
                    }
                }
            }
        }

        ids.into_iter().collect()
    }

    /// Read and parse one list
    pub fn read_list(&self, id: &str) -> Result<Vec<RawColorEntry>, ListError> {
        let data = self.read_raw(id)?;
        serde_json::from_slice(&data).map_err(|source| ListError::Parse {
            id: id.to_string(),
            source,
        })
    }

    fn read_raw(&self, id: &str) -> Result<Cow<'static, [u8]>, ListError> {
        let file_name = format!("{id}.json");

        if let Some(ref dir) = self.lists_dir {
            let full_path = dir.join(&file_name);
            if full_path.exists() {
                tracing::trace!(path = %full_path.display(), "Loading list from filesystem");
                return Ok(Cow::Owned(fs::read(&full_path)?));
            }
        }

        EmbeddedLists::get(&file_name)
            .map(|f| {
                tracing::trace!(list = %id, "Loading list from embedded assets");
                f.data
            })
            .ok_or_else(|| ListError::NotFound(id.to_string()))
    }

    /// Read every available list, skipping (and logging) the broken ones
    pub fn load_all(&self) -> Vec<(String, Vec<RawColorEntry>)> {
        self.list_ids()
            .into_iter()
            .filter_map(|id| match self.read_list(&id) {
                Ok(entries) => Some((id, entries)),
                Err(e) => {
                    tracing::warn!(list = %id, %e, "Skipping color list");
                    None
                }
            })
            .collect()
    }

    /// Ids of the embedded lists (for display)
    pub fn list_embedded() -> Vec<String> {
        let mut ids: Vec<String> = EmbeddedLists::iter()
            .filter_map(|file| list_id(Path::new(&*file)))
            .collect();
        ids.sort();
        ids
    }
}

fn list_id(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}
