//! I/O for bands, rasters and cluster signatures

mod native;
mod signatures;

pub use native::{
    read_band, read_band_from_buffer, read_tiff, write_tiff, write_tiff_to_buffer, TiffBand,
};
pub use signatures::{clusters_from_json, clusters_to_json, read_signatures, write_signatures};
