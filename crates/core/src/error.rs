//! Error types for geoclass

use thiserror::Error;

use crate::pixel::DataType;

/// Main error type for geoclass operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Signature file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Data type mismatch in band {band}: expected {expected}, got {found}")]
    DataTypeMismatch {
        band: usize,
        expected: DataType,
        found: DataType,
    },

    #[error("Band count mismatch: expected {expected}, got {found}")]
    BandCountMismatch { expected: usize, found: usize },

    #[error("Buffer too small: {name} holds {len} values, {required} required")]
    BufferTooSmall {
        name: &'static str,
        len: usize,
        required: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}: pre-flight check failed (threshold out of range or clusters inconsistent)")]
    CheckFailed(&'static str),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for geoclass operations
pub type Result<T> = std::result::Result<T, Error>;
