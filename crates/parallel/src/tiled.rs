//! Regular tiling of a raster

/// A rectangular window of a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Row offset in the source raster
    pub row_offset: usize,
    /// Column offset in the source raster
    pub col_offset: usize,
    /// Number of rows in this tile
    pub rows: usize,
    /// Number of columns in this tile
    pub cols: usize,
}

impl Tile {
    /// Create a new tile
    pub fn new(row_offset: usize, col_offset: usize, rows: usize, cols: usize) -> Self {
        Self {
            row_offset,
            col_offset,
            rows,
            cols,
        }
    }

    /// One past the last row covered by the tile
    pub fn row_end(&self) -> usize {
        self.row_offset + self.rows
    }

    /// One past the last column covered by the tile
    pub fn col_end(&self) -> usize {
        self.col_offset + self.cols
    }

    /// Number of cells in the tile
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A grid of `tile_size x tile_size` tiles covering a raster.
///
/// Tiles do not overlap. The last tile row and column are clipped to the
/// raster bounds, so the grid has `ceil(rows / tile_size) * ceil(cols / tile_size)`
/// tiles. Tile indices run in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    total_rows: usize,
    total_cols: usize,
    tile_size: usize,
}

impl TileGrid {
    /// Create a grid; `None` if `tile_size` is zero
    pub fn new(total_rows: usize, total_cols: usize, tile_size: usize) -> Option<Self> {
        (tile_size > 0).then_some(Self {
            total_rows,
            total_cols,
            tile_size,
        })
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of tile rows
    pub fn tile_rows(&self) -> usize {
        self.total_rows.div_ceil(self.tile_size)
    }

    /// Number of tile columns
    pub fn tile_cols(&self) -> usize {
        self.total_cols.div_ceil(self.tile_size)
    }

    /// Total number of tiles
    pub fn len(&self) -> usize {
        self.tile_rows() * self.tile_cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tile at row-major index `index`
    pub fn tile(&self, index: usize) -> Option<Tile> {
        if index >= self.len() {
            return None;
        }
        let row_offset = (index / self.tile_cols()) * self.tile_size;
        let col_offset = (index % self.tile_cols()) * self.tile_size;
        Some(Tile::new(
            row_offset,
            col_offset,
            self.tile_size.min(self.total_rows - row_offset),
            self.tile_size.min(self.total_cols - col_offset),
        ))
    }

    /// Iterate over all tiles in row-major order
    pub fn iter(&self) -> TileIterator {
        TileIterator {
            grid: *self,
            next: 0,
        }
    }
}

/// Row-major iterator over the tiles of a [`TileGrid`]
#[derive(Debug, Clone)]
pub struct TileIterator {
    grid: TileGrid,
    next: usize,
}

impl Iterator for TileIterator {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        let tile = self.grid.tile(self.next)?;
        self.next += 1;
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileIterator {}

impl IntoIterator for &TileGrid {
    type Item = Tile;
    type IntoIter = TileIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tile_size() {
        assert!(TileGrid::new(10, 10, 0).is_none());
    }

    #[test]
    fn test_tile_count() {
        let grid = TileGrid::new(250, 130, 100).unwrap();
        assert_eq!(grid.tile_rows(), 3);
        assert_eq!(grid.tile_cols(), 2);
        assert_eq!(grid.iter().count(), 6);
        assert_eq!(grid.iter().len(), 6);
    }

    #[test]
    fn test_row_major_order_and_clipping() {
        let grid = TileGrid::new(250, 130, 100).unwrap();
        let tiles: Vec<_> = grid.iter().collect();
        assert_eq!(tiles[0], Tile::new(0, 0, 100, 100));
        assert_eq!(tiles[1], Tile::new(0, 100, 100, 30));
        assert_eq!(tiles[2], Tile::new(100, 0, 100, 100));
        assert_eq!(tiles[5], Tile::new(200, 100, 50, 30));
        assert_eq!(tiles[5].row_end(), 250);
        assert_eq!(tiles[5].col_end(), 130);
    }

    #[test]
    fn test_tile_coverage() {
        let rows = 97;
        let cols = 61;
        let mut covered = vec![vec![0u8; cols]; rows];

        for tile in &TileGrid::new(rows, cols, 32).unwrap() {
            for r in tile.row_offset..tile.row_end() {
                for c in tile.col_offset..tile.col_end() {
                    covered[r][c] += 1;
                }
            }
        }

        for (r, row) in covered.iter().enumerate() {
            for (c, &n) in row.iter().enumerate() {
                assert_eq!(n, 1, "Cell ({}, {}) covered {} times", r, c, n);
            }
        }
    }

    #[test]
    fn test_empty_raster() {
        let grid = TileGrid::new(0, 10, 4).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.iter().next(), None);
    }
}
