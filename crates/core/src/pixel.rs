//! Pixel storage types and typed band buffers
//!
//! Bands arrive in one of a fixed set of storage types. [`DataType`] is the
//! closed tag for that set and [`PixelBuffer`] owns one band in its native
//! type, so dispatch on the tag is a `match` rather than a lookup that can
//! miss.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::raster::RasterElement;

/// Storage type of a band's pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 8-bit unsigned integer
    Byte,
    /// 16-bit unsigned integer
    UInt16,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
}

impl DataType {
    /// All supported storage types
    pub const ALL: [DataType; 6] = [
        DataType::Byte,
        DataType::UInt16,
        DataType::Int16,
        DataType::Int32,
        DataType::Float32,
        DataType::Float64,
    ];

    /// Size of one pixel in bytes
    pub fn size_in_bytes(self) -> usize {
        match self {
            DataType::Byte => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::Int32 | DataType::Float32 => 4,
            DataType::Float64 => 8,
        }
    }

    /// GDAL-style name of the type
    pub fn name(self) -> &'static str {
        match self {
            DataType::Byte => "Byte",
            DataType::UInt16 => "UInt16",
            DataType::Int16 => "Int16",
            DataType::Int32 => "Int32",
            DataType::Float32 => "Float32",
            DataType::Float64 => "Float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Accepts GDAL names (`Byte`, `UInt16`, ...) and Rust names (`u8`, `f32`, ...),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "byte" | "uint8" | "u8" => Ok(DataType::Byte),
            "uint16" | "u16" => Ok(DataType::UInt16),
            "int16" | "i16" => Ok(DataType::Int16),
            "int32" | "i32" => Ok(DataType::Int32),
            "float32" | "float" | "f32" => Ok(DataType::Float32),
            "float64" | "double" | "f64" => Ok(DataType::Float64),
            _ => Err(Error::UnsupportedDataType(s.to_string())),
        }
    }
}

/// One band of pixels in its native storage type
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    Byte(Vec<u8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl PixelBuffer {
    /// Wrap typed values
    pub fn new<T: RasterElement>(values: Vec<T>) -> Self {
        T::into_buffer(values)
    }

    /// Reinterpret native-endian raw bytes as pixels of `data_type`.
    pub fn from_bytes(data_type: DataType, bytes: &[u8]) -> Result<Self> {
        match data_type {
            DataType::Byte => decode::<u8>(bytes),
            DataType::UInt16 => decode::<u16>(bytes),
            DataType::Int16 => decode::<i16>(bytes),
            DataType::Int32 => decode::<i32>(bytes),
            DataType::Float32 => decode::<f32>(bytes),
            DataType::Float64 => decode::<f64>(bytes),
        }
    }

    /// Storage tag of this buffer
    pub fn data_type(&self) -> DataType {
        match self {
            PixelBuffer::Byte(_) => DataType::Byte,
            PixelBuffer::UInt16(_) => DataType::UInt16,
            PixelBuffer::Int16(_) => DataType::Int16,
            PixelBuffer::Int32(_) => DataType::Int32,
            PixelBuffer::Float32(_) => DataType::Float32,
            PixelBuffer::Float64(_) => DataType::Float64,
        }
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::Byte(v) => v.len(),
            PixelBuffer::UInt16(v) => v.len(),
            PixelBuffer::Int16(v) => v.len(),
            PixelBuffer::Int32(v) => v.len(),
            PixelBuffer::Float32(v) => v.len(),
            PixelBuffer::Float64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the pixels as `T`, `None` if the buffer holds another type
    pub fn as_slice<T: RasterElement>(&self) -> Option<&[T]> {
        T::slice_of(self)
    }

    /// Pixel at `index` widened to f64
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            PixelBuffer::Byte(v) => v.get(index).map(|&x| x as f64),
            PixelBuffer::UInt16(v) => v.get(index).map(|&x| x as f64),
            PixelBuffer::Int16(v) => v.get(index).map(|&x| x as f64),
            PixelBuffer::Int32(v) => v.get(index).map(|&x| x as f64),
            PixelBuffer::Float32(v) => v.get(index).map(|&x| x as f64),
            PixelBuffer::Float64(v) => v.get(index).copied(),
        }
    }

    /// Copy all pixels into an f64 vector
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get_f64(i)).collect()
    }
}

fn decode<T: RasterElement>(bytes: &[u8]) -> Result<PixelBuffer> {
    if bytes.len() % T::SIZE != 0 {
        return Err(Error::InvalidParameter {
            name: "bytes",
            value: bytes.len().to_string(),
            reason: format!("length is not a multiple of {} ({})", T::SIZE, T::DATA_TYPE),
        });
    }
    let values = bytes.chunks_exact(T::SIZE).map(T::from_ne_slice).collect();
    Ok(T::into_buffer(values))
}
