//! # geoclass Parallel
//!
//! Execution strategies for pixel and tile loops.
//!
//! This crate provides:
//! - `ProcessingMode`: sequential, Rayon, or a fixed-size worker pool
//! - `TileGrid`: a regular, non-overlapping tiling of a raster in row-major order
//!
//! Without the `parallel` feature every mode runs sequentially.

pub mod strategy;
pub mod tiled;

pub use strategy::{num_cpus, ParallelStrategy, ProcessingMode};
pub use tiled::{Tile, TileGrid, TileIterator};
