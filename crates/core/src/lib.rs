//! # geoclass Core
//!
//! Core types and I/O for the geoclass classification library.
//!
//! This crate provides:
//! - `DataType` / `PixelBuffer`: the closed set of band storage types
//! - `Raster<T>`: Generic single-band raster grid
//! - `ClusterStatistics` / `Clusters`: training class statistics
//! - TIFF band I/O and JSON signature files

pub mod cluster;
pub mod error;
pub mod io;
pub mod pixel;
pub mod raster;

pub use cluster::{Cluster, ClusterStatistics, Clusters};
pub use error::{Error, Result};
pub use pixel::{DataType, PixelBuffer};
pub use raster::{Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cluster::{Cluster, ClusterStatistics, Clusters};
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{DataType, PixelBuffer};
    pub use crate::raster::{Raster, RasterElement};
}
