//! Test fixtures and constants.

use color_vptree::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use colorname::models::RawColorEntry;

/// List ids used across tests
pub mod lists {
    /// Two entries: black then white
    pub const BLACK_WHITE: &str = "bw";

    /// Randomly generated entries
    pub const RANDOM: &str = "random";

    /// Entries sharing a handful of colors
    pub const DUPLICATES: &str = "dupes";
}

pub fn black_white() -> Vec<RawColorEntry> {
    vec![
        RawColorEntry::new("#000000", "Black"),
        RawColorEntry::new("#ffffff", "White"),
    ]
}

/// `n` random entries named `Color <index>`
pub fn random_list(seed: u64, n: usize) -> Vec<RawColorEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| RawColorEntry::new(random_hex(&mut rng), format!("Color {i}")))
        .collect()
}

/// `n` entries cycling through `distinct` colors
pub fn duplicate_list(n: usize, distinct: usize) -> Vec<RawColorEntry> {
    let palette = ["#ff0000", "#00ff00", "#0000ff", "#808080", "#000000", "#ffffff"];
    (0..n)
        .map(|i| {
            let hex = palette[i % distinct.clamp(1, palette.len())];
            RawColorEntry::new(hex, format!("Dupe {i}"))
        })
        .collect()
}

/// `n` random query hexes
pub fn random_queries(seed: u64, n: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| random_hex(&mut rng)).collect()
}

fn random_hex(rng: &mut StdRng) -> String {
    Rgb::new(rng.gen(), rng.gen(), rng.gen()).to_hex()
}
