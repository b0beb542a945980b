//! Per-pixel classification kernel
//!
//! One generic loop serves every classifier: it gathers a pixel's band
//! values, applies the no-data test and hands valid pixels to the
//! classifier's [`DecisionRule`]. Pixels are processed in fixed-size chunks;
//! chunks write disjoint destination ranges, so they run on worker threads
//! without locking, and cancellation is checked between chunks.

use geoclass_core::{Error, RasterElement, Result};
use geoclass_parallel::{ParallelStrategy, ProcessingMode};

use super::cancel::CancelToken;
use super::settings::ClassificationSettings;
use crate::maybe_rayon::*;

/// Pixels per work item
pub const CHUNK_SIZE: usize = 4096;

/// Scratch vectors reused across the pixels of one chunk
#[derive(Debug, Clone)]
pub struct Workspace {
    /// `pixel - mean`
    pub diff: Vec<f64>,
    /// Substitution buffer
    pub solve: Vec<f64>,
}

impl Workspace {
    pub fn new(bands: usize) -> Self {
        Self {
            diff: vec![0.0; bands],
            solve: vec![0.0; bands],
        }
    }

    /// Fill `diff` with `pixel - mean`
    #[inline]
    pub fn set_diff(&mut self, pixel: &[f64], mean: &[f64]) {
        for ((d, x), m) in self.diff.iter_mut().zip(pixel).zip(mean) {
            *d = x - m;
        }
    }
}

/// Algorithm-specific choice of a cluster for one pixel.
///
/// Built once per classification run from the classifier's clusters and
/// settings, then shared read-only by all workers.
pub trait DecisionRule: Sync {
    /// Number of bands a pixel must have
    fn band_count(&self) -> usize;

    /// Class id of the chosen cluster, `None` if no cluster qualifies
    fn select(&self, pixel: &[f64], workspace: &mut Workspace) -> Option<i32>;
}

/// Classify `destination.len()` pixels read from `sources` (one slice per band).
///
/// Every destination entry is written exactly once: `nodata_pixel_value` for
/// invalid pixels, the selected class id, or `no_class_pixel_value`.
pub(crate) fn classify_pixels<T, R>(
    rule: &R,
    sources: &[&[T]],
    destination: &mut [i32],
    settings: &ClassificationSettings,
    mode: ProcessingMode,
    cancel: Option<&CancelToken>,
) -> Result<()>
where
    T: RasterElement,
    R: DecisionRule,
{
    let bands = rule.band_count();
    if sources.len() != bands {
        return Err(Error::BandCountMismatch {
            expected: bands,
            found: sources.len(),
        });
    }
    let pixel_count = destination.len();
    if let Some(short) = sources.iter().find(|s| s.len() < pixel_count) {
        return Err(Error::BufferTooSmall {
            name: "source band",
            len: short.len(),
            required: pixel_count,
        });
    }

    let work = |(chunk_index, chunk): (usize, &mut [i32])| -> Result<()> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        let start = chunk_index * CHUNK_SIZE;
        let mut pixel = vec![0.0; bands];
        let mut workspace = Workspace::new(bands);

        for (offset, out) in chunk.iter_mut().enumerate() {
            let index = start + offset;
            for (value, band) in pixel.iter_mut().zip(sources) {
                *value = band[index].to_f64();
            }
            *out = if settings.is_invalid(&pixel) {
                settings.nodata_pixel_value
            } else {
                rule.select(&pixel, &mut workspace)
                    .unwrap_or(settings.no_class_pixel_value)
            };
        }
        Ok(())
    };

    let result = if mode.is_parallel() {
        mode.install(|| {
            destination
                .par_chunks_mut(CHUNK_SIZE)
                .enumerate()
                .try_for_each(&work)
        })
    } else {
        destination
            .chunks_mut(CHUNK_SIZE)
            .enumerate()
            .try_for_each(&work)
    };

    if matches!(result, Err(Error::Cancelled)) {
        tracing::debug!("classification cancelled");
    }
    result
}
