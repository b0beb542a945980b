//! Entropy by tiles
//!
//! The raster is cut into `tile_size x tile_size` tiles (clipped at the right
//! and bottom edges). Each tile's values are binned into a
//! [`HISTOGRAM_BINS`]-bin histogram spanning the tile's own value range and
//! the Shannon entropy `H = -Σ p ln(p)` of the bin frequencies is reported.

use geoclass_core::{Error, Raster, Result};
use geoclass_parallel::{ParallelStrategy, ProcessingMode, Tile, TileGrid};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: usize = 100;

/// Number of histogram bins per tile
pub const HISTOGRAM_BINS: usize = 255;

/// Entropy of one tile and its bounding box in pixel coordinates.
///
/// `x` runs along columns and `y` along rows; the lower-right corner is
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyResult {
    pub entropy: f64,
    pub upper_left_x: usize,
    pub upper_left_y: usize,
    pub lower_right_x: usize,
    pub lower_right_y: usize,
}

impl EntropyResult {
    fn from_tile(entropy: f64, tile: &Tile) -> Self {
        Self {
            entropy,
            upper_left_x: tile.col_offset,
            upper_left_y: tile.row_offset,
            lower_right_x: tile.col_end(),
            lower_right_y: tile.row_end(),
        }
    }

    /// Tile width in pixels
    pub fn width(&self) -> usize {
        self.lower_right_x - self.upper_left_x
    }

    /// Tile height in pixels
    pub fn height(&self) -> usize {
        self.lower_right_y - self.upper_left_y
    }
}

/// Per-tile entropy of a single float band
#[derive(Debug, Clone)]
pub struct EntropyByTiles<'a> {
    raster: &'a Raster<f32>,
    tile_size: usize,
    mode: ProcessingMode,
}

impl<'a> EntropyByTiles<'a> {
    pub fn new(raster: &'a Raster<f32>) -> Self {
        Self {
            raster,
            tile_size: DEFAULT_TILE_SIZE,
            mode: ProcessingMode::default(),
        }
    }

    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_processing_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Compute one [`EntropyResult`] per tile, in row-major tile order.
    ///
    /// Returns `ceil(rows / tile_size) * ceil(cols / tile_size)` results
    /// whose boxes cover the raster exactly. The raster is only read.
    pub fn calculate_entropy(&self) -> Result<Vec<EntropyResult>> {
        let (rows, cols) = self.raster.shape();
        let grid = TileGrid::new(rows, cols, self.tile_size).ok_or_else(|| Error::InvalidParameter {
            name: "tile_size",
            value: self.tile_size.to_string(),
            reason: "must be positive".to_string(),
        })?;

        let tiles: Vec<Tile> = grid.iter().collect();
        tracing::debug!(
            rows,
            cols,
            tile_size = self.tile_size,
            tiles = tiles.len(),
            "entropy by tiles"
        );

        let raster = self.raster;
        Ok(self.mode.par_map(0..tiles.len(), |i| {
            let tile = &tiles[i];
            let window = raster.window(tile.row_offset, tile.col_offset, tile.rows, tile.cols);
            EntropyResult::from_tile(tile_entropy(window), tile)
        }))
    }
}

/// Shannon entropy (natural log) of the values of one tile.
///
/// Non-finite values are ignored; a tile without finite values, or whose
/// values are all equal, has entropy 0.
pub fn tile_entropy(values: ArrayView2<'_, f32>) -> f64 {
    let buffer: Vec<f64> = values
        .iter()
        .map(|&v| v as f64)
        .filter(|v| v.is_finite())
        .collect();
    if buffer.is_empty() {
        return 0.0;
    }

    let (min, max) = buffer
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    let mut histogram = [0usize; HISTOGRAM_BINS];
    for &v in &buffer {
        let bin = if range > 0.0 {
            (((v - min) / range * HISTOGRAM_BINS as f64).floor() as usize).min(HISTOGRAM_BINS - 1)
        } else {
            0
        };
        histogram[bin] += 1;
    }

    let total = buffer.len() as f64;
    let entropy: f64 = histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.ln()
        })
        .sum();
    // a single full bin gives -1 * ln(1) = -0.0
    entropy.max(0.0)
}

/// Paint each tile's entropy over its box, producing a `rows x cols` raster.
///
/// Cells not covered by any result are no-data (NaN).
pub fn entropy_map(results: &[EntropyResult], rows: usize, cols: usize) -> Raster<f32> {
    let mut map = Raster::filled(rows, cols, f32::NAN);
    map.set_nodata(Some(f32::NAN));
    for result in results {
        let row_end = result.lower_right_y.min(rows);
        let col_end = result.lower_right_x.min(cols);
        for r in result.upper_left_y..row_end {
            for c in result.upper_left_x..col_end {
                map.data_mut()[(r, c)] = result.entropy as f32;
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(rows: usize, cols: usize) -> Raster<f32> {
        let data = (0..rows * cols).map(|i| (i % 97) as f32).collect();
        Raster::from_vec(data, rows, cols).unwrap()
    }

    #[test]
    fn test_tile_count_and_order() {
        let raster = gradient(130, 250);
        let results = EntropyByTiles::new(&raster).calculate_entropy().unwrap();
        assert_eq!(results.len(), 2 * 3);

        let boxes: Vec<_> = results
            .iter()
            .map(|r| (r.upper_left_x, r.upper_left_y, r.lower_right_x, r.lower_right_y))
            .collect();
        assert_eq!(
            boxes,
            vec![
                (0, 0, 100, 100),
                (100, 0, 200, 100),
                (200, 0, 250, 100),
                (0, 100, 100, 130),
                (100, 100, 200, 130),
                (200, 100, 250, 130),
            ]
        );
    }

    #[test]
    fn test_tiles_cover_raster_exactly() {
        let (rows, cols) = (47, 61);
        let raster = gradient(rows, cols);
        let results = EntropyByTiles::new(&raster)
            .with_tile_size(8)
            .calculate_entropy()
            .unwrap();
        assert_eq!(results.len(), 47usize.div_ceil(8) * 61usize.div_ceil(8));

        let mut hits = vec![0u32; rows * cols];
        for r in &results {
            for y in r.upper_left_y..r.lower_right_y {
                for x in r.upper_left_x..r.lower_right_x {
                    hits[y * cols + x] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_uniform_tile_has_zero_entropy() {
        let raster = Raster::filled(20, 20, 3.5f32);
        let results = EntropyByTiles::new(&raster).with_tile_size(10).calculate_entropy().unwrap();
        assert_eq!(results.len(), 4);
        for r in results {
            assert_eq!(r.entropy, 0.0);
        }
    }

    #[test]
    fn test_two_value_tile() {
        let data: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let raster = Raster::from_vec(data, 4, 4).unwrap();
        let results = EntropyByTiles::new(&raster).calculate_entropy().unwrap();
        assert_eq!(results.len(), 1);
        assert_relative_eq!(results[0].entropy, std::f64::consts::LN_2, epsilon = 1e-12);
        assert_eq!((results[0].width(), results[0].height()), (4, 4));
    }

    #[test]
    fn test_all_bins_used() {
        let data: Vec<f32> = (0..255).map(|i| i as f32).collect();
        let raster = Raster::from_vec(data, 15, 17).unwrap();
        let results = EntropyByTiles::new(&raster).calculate_entropy().unwrap();
        assert_relative_eq!(results[0].entropy, (255.0f64).ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let raster = Raster::from_vec(vec![f32::NAN, 1.0, f32::INFINITY, 2.0], 2, 2).unwrap();
        let results = EntropyByTiles::new(&raster).calculate_entropy().unwrap();
        assert_relative_eq!(results[0].entropy, std::f64::consts::LN_2, epsilon = 1e-12);

        let empty = Raster::filled(3, 3, f32::NAN);
        let results = EntropyByTiles::new(&empty).calculate_entropy().unwrap();
        assert_eq!(results[0].entropy, 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let raster = gradient(120, 90);
        let sequential = EntropyByTiles::new(&raster)
            .with_tile_size(16)
            .with_processing_mode(ProcessingMode::Sequential)
            .calculate_entropy()
            .unwrap();
        let parallel = EntropyByTiles::new(&raster)
            .with_tile_size(16)
            .with_processing_mode(ProcessingMode::ParallelWith(4))
            .calculate_entropy()
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_zero_tile_size() {
        let raster = gradient(4, 4);
        let err = EntropyByTiles::new(&raster).with_tile_size(0).calculate_entropy();
        assert!(matches!(err, Err(Error::InvalidParameter { name: "tile_size", .. })));
    }

    #[test]
    fn test_empty_raster() {
        let raster: Raster<f32> = Raster::new(0, 0);
        assert!(EntropyByTiles::new(&raster).calculate_entropy().unwrap().is_empty());
    }

    #[test]
    fn test_entropy_map() {
        let data: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let mut raster = Raster::from_vec(data, 4, 4).unwrap();
        raster.set(0, 1, 0.0).unwrap();
        raster.set(1, 1, 0.0).unwrap();
        let results = EntropyByTiles::new(&raster).with_tile_size(2).calculate_entropy().unwrap();
        let map = entropy_map(&results, 4, 4);
        assert_eq!(map.get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(map.get(3, 3).unwrap() as f64, std::f64::consts::LN_2, epsilon = 1e-6);
    }
}
