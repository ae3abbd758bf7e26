//! Colorname - nearest color-name matching
//!
//! Maps arbitrary colors to the closest named entry of a curated color list,
//! optionally without repeating a name within a batch.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod services;
