pub mod color_list;
pub mod config;
pub mod matching;

pub use color_list::{ColorListEntry, RawColorEntry};
pub use config::{EngineConfig, ListConfig};
pub use matching::{BatchItem, BatchMatch, HydratedColor, Match, PartialBatch};
