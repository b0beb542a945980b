//! Native TIFF reading/writing
//!
//! Uses the `tiff` crate. Single-band images only; georeferencing tags are
//! not interpreted.

use crate::error::{Error, Result};
use crate::pixel::PixelBuffer;
use crate::raster::{Raster, RasterElement};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;

/// One band read from a TIFF, kept in its stored sample type
#[derive(Debug, Clone)]
pub struct TiffBand {
    pub rows: usize,
    pub cols: usize,
    pub pixels: PixelBuffer,
}

impl TiffBand {
    /// Convert into a raster of the stored type `T`
    pub fn into_raster<T: RasterElement>(self) -> Result<Raster<T>> {
        Raster::from_buffer(&self.pixels, self.rows, self.cols)
    }
}

/// Read a single-band TIFF file, keeping its sample type
pub fn read_band<P: AsRef<Path>>(path: P) -> Result<TiffBand> {
    let file = File::open(path.as_ref())?;
    decode_band(BufReader::new(file))
}

/// Read a single-band TIFF from an in-memory buffer
pub fn read_band_from_buffer(data: &[u8]) -> Result<TiffBand> {
    decode_band(Cursor::new(data))
}

/// Read a single-band TIFF file into a `Raster<T>`, casting samples to `T`.
///
/// Samples that do not fit `T` (NaN or out of range) become
/// `T::default_nodata()`, which is then set as the raster's no-data value.
pub fn read_tiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let band = read_band(path)?;
    let mut unrepresentable = 0usize;
    let data: Vec<T> = band
        .pixels
        .to_f64_vec()
        .into_iter()
        .map(|v| {
            num_traits::cast(v).unwrap_or_else(|| {
                unrepresentable += 1;
                T::default_nodata()
            })
        })
        .collect();
    let mut raster = Raster::from_vec(data, band.rows, band.cols)?;
    if unrepresentable > 0 {
        raster.set_nodata(Some(T::default_nodata()));
    }
    Ok(raster)
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_band<R>(reader: R) -> Result<TiffBand>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let pixels = match result {
        DecodingResult::U8(buf) => PixelBuffer::Byte(buf),
        DecodingResult::U16(buf) => PixelBuffer::UInt16(buf),
        DecodingResult::I16(buf) => PixelBuffer::Int16(buf),
        DecodingResult::I32(buf) => PixelBuffer::Int32(buf),
        DecodingResult::F32(buf) => PixelBuffer::Float32(buf),
        DecodingResult::F64(buf) => PixelBuffer::Float64(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "TIFF sample format (supported: u8, u16, i16, i32, f32, f64)".to_string(),
            ))
        }
    };

    if pixels.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    Ok(TiffBand { rows, cols, pixels })
}

/// Write a Raster to a TIFF file as 32-bit float
pub fn write_tiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_tiff(raster, BufWriter::new(file))
}

/// Write a Raster to an in-memory TIFF buffer
pub fn write_tiff_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_tiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Internal: encode a Raster as TIFF into any `Write + Seek` sink
fn encode_tiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    encoder
        .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::DataType;

    #[test]
    fn test_buffer_roundtrip_as_float() {
        let raster = Raster::<i32>::from_vec(vec![1, 2, 3, 4, 5, 6], 2, 3).unwrap();
        let bytes = write_tiff_to_buffer(&raster).unwrap();
        let band = read_band_from_buffer(&bytes).unwrap();
        assert_eq!((band.rows, band.cols), (2, 3));
        assert_eq!(band.pixels.data_type(), DataType::Float32);
        assert_eq!(band.pixels.get_f64(5), Some(6.0));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.tif");
        let raster = Raster::<f32>::from_vec(vec![0.5, 1.5, 2.5, 3.5], 2, 2).unwrap();
        write_tiff(&raster, &path).unwrap();

        let back: Raster<f64> = read_tiff(&path).unwrap();
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.get(1, 1).unwrap(), 3.5);

        let typed: Raster<f32> = read_band(&path).unwrap().into_raster().unwrap();
        assert_eq!(typed.get(0, 1).unwrap(), 1.5);
    }

    #[test]
    fn test_unrepresentable_samples_become_nodata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.tif");
        let raster = Raster::<f32>::from_vec(vec![1.0, f32::NAN, 3.0e12, 2.0], 2, 2).unwrap();
        write_tiff(&raster, &path).unwrap();

        let labels: Raster<i32> = read_tiff(&path).unwrap();
        assert_eq!(labels.nodata(), Some(i32::MIN));
        assert_eq!(labels.get(0, 1).unwrap(), i32::MIN);
        assert_eq!(labels.get(1, 0).unwrap(), i32::MIN);
        assert!(labels.is_nodata(labels.get(0, 1).unwrap()));
        assert_eq!(labels.get(1, 1).unwrap(), 2);

        let clean = Raster::<f32>::from_vec(vec![1.0, 2.0], 1, 2).unwrap();
        write_tiff(&clean, &path).unwrap();
        let labels: Raster<i32> = read_tiff(&path).unwrap();
        assert_eq!(labels.nodata(), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(read_band_from_buffer(b"not a tiff").is_err());
    }
}
