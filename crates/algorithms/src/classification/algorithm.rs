//! Shared state and entry points of the cluster classifiers

use geoclass_core::{Clusters, DataType, Error, PixelBuffer, Raster, RasterElement, Result};
use geoclass_parallel::ProcessingMode;

use super::cancel::CancelToken;
use super::kernel::{classify_pixels, DecisionRule};
use super::settings::{ClassificationSettings, NoDataMatch};

/// State every cluster classifier carries: settings, the owned cluster
/// collection and execution options.
#[derive(Debug, Clone, Default)]
pub struct ClassificationAlgorithm {
    settings: ClassificationSettings,
    clusters: Clusters,
    mode: ProcessingMode,
    cancel: Option<CancelToken>,
}

impl ClassificationAlgorithm {
    pub fn new(clusters: Clusters, threshold: f64) -> Self {
        Self {
            settings: ClassificationSettings {
                threshold,
                ..Default::default()
            },
            clusters,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &ClassificationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ClassificationSettings {
        &mut self.settings
    }

    pub fn clusters(&self) -> &Clusters {
        &self.clusters
    }

    /// Replace the owned clusters. `None` keeps the current collection.
    pub fn set_clusters(&mut self, clusters: Option<Clusters>) {
        if let Some(clusters) = clusters {
            self.clusters = clusters;
        }
    }

    pub fn processing_mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn set_processing_mode(&mut self, mode: ProcessingMode) {
        self.mode = mode;
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    pub fn set_cancel_token(&mut self, token: Option<CancelToken>) {
        self.cancel = token;
    }
}

/// A classifier assigning each pixel to one of its clusters.
///
/// Implementors supply the pre-flight [`check`](Self::check) and the
/// [`DecisionRule`] built by [`prepare`](Self::prepare); the provided
/// methods handle configuration, data-type dispatch and the pixel loop.
pub trait ClusterClassifier {
    /// Decision rule built once per run
    type Rule: DecisionRule;

    /// Algorithm name used in errors and logs
    const NAME: &'static str;

    fn algorithm(&self) -> &ClassificationAlgorithm;

    fn algorithm_mut(&mut self) -> &mut ClassificationAlgorithm;

    /// Validate threshold range and cluster consistency.
    ///
    /// Classification refuses to run while this returns `false`.
    fn check(&self) -> bool;

    /// Precompute the decision rule (LU factors, constants).
    fn prepare(&self) -> Result<Self::Rule>;

    // Configuration

    fn settings(&self) -> &ClassificationSettings {
        self.algorithm().settings()
    }

    fn clusters(&self) -> &Clusters {
        self.algorithm().clusters()
    }

    /// Replace the owned clusters; `None` leaves the current clusters in place.
    fn set_clusters(&mut self, clusters: Option<Clusters>) {
        self.algorithm_mut().set_clusters(clusters);
    }

    fn threshold(&self) -> f64 {
        self.settings().threshold
    }

    fn set_threshold(&mut self, threshold: f64) {
        self.algorithm_mut().settings_mut().threshold = threshold;
    }

    fn set_no_class_pixel_value(&mut self, value: i32) {
        self.algorithm_mut().settings_mut().no_class_pixel_value = value;
    }

    fn set_nodata_pixel_value(&mut self, value: i32) {
        self.algorithm_mut().settings_mut().nodata_pixel_value = value;
    }

    fn set_nodata_value(&mut self, value: f64) {
        self.algorithm_mut().settings_mut().nodata_value = value;
    }

    fn set_nodata_available(&mut self, available: bool) {
        self.algorithm_mut().settings_mut().nodata_available = available;
    }

    fn set_nodata_match(&mut self, nodata_match: NoDataMatch) {
        self.algorithm_mut().settings_mut().nodata_match = nodata_match;
    }

    fn set_processing_mode(&mut self, mode: ProcessingMode) {
        self.algorithm_mut().set_processing_mode(mode);
    }

    fn set_cancel_token(&mut self, token: Option<CancelToken>) {
        self.algorithm_mut().set_cancel_token(token);
    }

    // Classification

    /// Classify `pixel_count` pixels of typed band slices into `destination`.
    fn classify_typed<T: RasterElement>(
        &self,
        destination: &mut [i32],
        sources: &[&[T]],
        pixel_count: usize,
    ) -> Result<()> {
        if !self.check() {
            return Err(Error::CheckFailed(Self::NAME));
        }
        if destination.len() < pixel_count {
            return Err(Error::BufferTooSmall {
                name: "destination",
                len: destination.len(),
                required: pixel_count,
            });
        }

        let rule = self.prepare()?;
        let algorithm = self.algorithm();
        let data_type = T::DATA_TYPE;
        tracing::debug!(
            algorithm = Self::NAME,
            data_type = %data_type,
            pixels = pixel_count,
            bands = sources.len(),
            clusters = algorithm.clusters().len(),
            "classifying"
        );
        classify_pixels(
            &rule,
            sources,
            &mut destination[..pixel_count],
            algorithm.settings(),
            algorithm.processing_mode(),
            algorithm.cancel_token(),
        )
    }

    /// Classify band buffers whose storage type is given by `data_type`.
    ///
    /// Every buffer must hold `data_type` pixels; a buffer of another type
    /// is reported as [`Error::DataTypeMismatch`].
    fn classify(
        &self,
        destination: &mut [i32],
        sources: &[PixelBuffer],
        pixel_count: usize,
        data_type: DataType,
    ) -> Result<()> {
        match data_type {
            DataType::Byte => self.classify_typed(destination, &typed_bands::<u8>(sources)?, pixel_count),
            DataType::UInt16 => self.classify_typed(destination, &typed_bands::<u16>(sources)?, pixel_count),
            DataType::Int16 => self.classify_typed(destination, &typed_bands::<i16>(sources)?, pixel_count),
            DataType::Int32 => self.classify_typed(destination, &typed_bands::<i32>(sources)?, pixel_count),
            DataType::Float32 => self.classify_typed(destination, &typed_bands::<f32>(sources)?, pixel_count),
            DataType::Float64 => self.classify_typed(destination, &typed_bands::<f64>(sources)?, pixel_count),
        }
    }

    /// Classify same-sized band rasters into a raster of class ids.
    fn classify_raster<T: RasterElement>(&self, bands: &[&Raster<T>]) -> Result<Raster<i32>> {
        let first = bands.first().ok_or(Error::BandCountMismatch {
            expected: self.clusters().band_count().unwrap_or(1),
            found: 0,
        })?;
        let (rows, cols) = first.shape();
        for band in bands.iter().skip(1) {
            if band.shape() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: band.rows(),
                    ac: band.cols(),
                });
            }
        }

        let owned: Vec<Vec<T>>;
        let sources: Vec<&[T]> = if bands.iter().all(|b| b.as_slice().is_some()) {
            bands.iter().filter_map(|b| b.as_slice()).collect()
        } else {
            owned = bands.iter().map(|b| b.data().iter().copied().collect()).collect();
            owned.iter().map(Vec::as_slice).collect()
        };

        let mut classes = vec![0i32; rows * cols];
        self.classify_typed(&mut classes, &sources, rows * cols)?;

        let mut output = Raster::from_vec(classes, rows, cols)?;
        if self.settings().nodata_available {
            output.set_nodata(Some(self.settings().nodata_pixel_value));
        }
        Ok(output)
    }
}

/// Borrow every buffer as `T`, rejecting buffers of another type
fn typed_bands<T: RasterElement>(sources: &[PixelBuffer]) -> Result<Vec<&[T]>> {
    sources
        .iter()
        .enumerate()
        .map(|(band, buffer)| {
            buffer.as_slice::<T>().ok_or(Error::DataTypeMismatch {
                band,
                expected: T::DATA_TYPE,
                found: buffer.data_type(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoclass_core::{Cluster, ClusterStatistics};
    use ndarray::Array2;

    fn clusters(n: usize) -> Clusters {
        (0..n)
            .map(|i| {
                let stats = ClusterStatistics::new(vec![i as f64], Array2::eye(1), 10).unwrap();
                Cluster::new(i as i32 + 1, stats)
            })
            .collect()
    }

    #[test]
    fn test_set_clusters_none_keeps_existing() {
        let mut alg = ClassificationAlgorithm::new(clusters(2), 1.0);
        alg.set_clusters(None);
        assert_eq!(alg.clusters().len(), 2);
        alg.set_clusters(Some(clusters(3)));
        assert_eq!(alg.clusters().len(), 3);
    }

    #[test]
    fn test_typed_bands_rejects_mixed_types() {
        let sources = vec![PixelBuffer::new(vec![1u8, 2]), PixelBuffer::new(vec![1u16, 2])];
        assert!(typed_bands::<u8>(&sources[..1]).is_ok());
        let err = typed_bands::<u8>(&sources).unwrap_err();
        assert!(matches!(
            err,
            Error::DataTypeMismatch { band: 1, expected: DataType::Byte, found: DataType::UInt16 }
        ));
    }
}
