//! Main Raster type

use crate::error::{Error, Result};
use crate::pixel::PixelBuffer;
use crate::raster::RasterElement;
use ndarray::{s, Array2, ArrayView2};

/// A single-band 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in row-major order together with
/// an optional no-data value. Bands of a multi-band image are separate
/// rasters of identical shape.
///
/// # Example
///
/// ```ignore
/// use geoclass_core::Raster;
///
/// let mut raster: Raster<f32> = Raster::new(100, 100);
/// raster.set(10, 20, 42.0)?;
/// let value = raster.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
            nodata: None,
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            nodata: None,
        }
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data, nodata: None }
    }

    /// Create a raster from a typed band buffer holding `T`
    pub fn from_buffer(buffer: &PixelBuffer, rows: usize, cols: usize) -> Result<Self> {
        let values = buffer.as_slice::<T>().ok_or(Error::DataTypeMismatch {
            band: 0,
            expected: T::DATA_TYPE,
            found: buffer.data_type(),
        })?;
        Self::from_vec(values.to_vec(), rows, cols)
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// View of the window starting at (row, col), clipped to the raster bounds
    pub fn window(&self, row: usize, col: usize, rows: usize, cols: usize) -> ArrayView2<'_, T> {
        let r0 = row.min(self.rows());
        let c0 = col.min(self.cols());
        let r1 = row.saturating_add(rows).min(self.rows());
        let c1 = col.saturating_add(cols).min(self.cols());
        self.data.slice(s![r0..r1, c0..c1])
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Row-major values as a contiguous slice
    pub fn as_slice(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    /// Copy the values into a typed band buffer
    pub fn to_buffer(&self) -> PixelBuffer {
        T::into_buffer(self.data.iter().copied().collect())
    }

    // Metadata

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            sum += value.to_f64();
            count += 1;
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::DataType;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<f32> = Raster::new(10, 10);
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.get(10, 0).is_err());
        assert!(raster.set(0, 10, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Raster::<u8>::from_vec(vec![1, 2, 3], 2, 2).is_err());
        let r = Raster::<u8>::from_vec(vec![1, 2, 3, 4], 2, 2).unwrap();
        assert_eq!(r.get(1, 0).unwrap(), 3);
    }

    #[test]
    fn test_buffer_conversion() {
        let r = Raster::<i16>::from_vec(vec![1, -2, 3, -4, 5, -6], 2, 3).unwrap();
        let buf = r.to_buffer();
        assert_eq!(buf.data_type(), DataType::Int16);
        let back = Raster::<i16>::from_buffer(&buf, 2, 3).unwrap();
        assert_eq!(back.get(1, 2).unwrap(), -6);
        assert!(matches!(
            Raster::<f32>::from_buffer(&buf, 2, 3),
            Err(Error::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_window_is_clipped() {
        let r = Raster::<f32>::from_vec((0..12).map(|v| v as f32).collect(), 3, 4).unwrap();
        let w = r.window(1, 2, 5, 5);
        assert_eq!(w.dim(), (2, 2));
        assert_eq!(w[(0, 0)], 6.0);
        assert_eq!(w[(1, 1)], 11.0);
    }

    #[test]
    fn test_raster_statistics() {
        let mut raster: Raster<f32> = Raster::new(10, 10);
        for i in 0..10 {
            for j in 0..10 {
                raster.set(i, j, (i * 10 + j) as f32).unwrap();
            }
        }
        raster.set(0, 0, f32::NAN).unwrap();

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.valid_count, 99);
        assert_eq!(stats.nodata_count, 1);
    }
}
