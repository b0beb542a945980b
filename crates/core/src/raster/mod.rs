//! Raster data structures and operations

mod element;
mod grid;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
