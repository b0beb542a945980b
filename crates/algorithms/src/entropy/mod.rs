//! Tile entropy analysis
//!
//! Shannon entropy of local histograms over a regular tile grid, used to
//! judge how much texture (and so how much registrable detail) each part
//! of an image carries.

mod tiles;

pub use tiles::{entropy_map, tile_entropy, EntropyByTiles, EntropyResult, DEFAULT_TILE_SIZE, HISTOGRAM_BINS};
