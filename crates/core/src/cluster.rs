//! Cluster (training class) statistics
//!
//! A [`Cluster`] is one labelled training class: the class id written to the
//! output and the [`ClusterStatistics`] (mean vector, covariance matrix and
//! sample count) estimated from its training pixels. [`Clusters`] is the
//! ordered collection a classifier owns; its order is the tie-break order of
//! the decision rules.

use ndarray::Array2;

use crate::error::{Error, Result};

/// Per-class statistics indexed by band
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStatistics {
    mean: Vec<f64>,
    covariance: Array2<f64>,
    pixel_count: usize,
}

impl ClusterStatistics {
    /// Create statistics from a mean vector and a `bands x bands` covariance matrix.
    pub fn new(mean: Vec<f64>, covariance: Array2<f64>, pixel_count: usize) -> Result<Self> {
        let n = mean.len();
        if n == 0 {
            return Err(Error::InvalidParameter {
                name: "mean",
                value: "[]".into(),
                reason: "at least one band is required".into(),
            });
        }
        if covariance.dim() != (n, n) {
            return Err(Error::SizeMismatch {
                er: n,
                ec: n,
                ar: covariance.nrows(),
                ac: covariance.ncols(),
            });
        }
        Ok(Self {
            mean,
            covariance,
            pixel_count,
        })
    }

    /// Create statistics from nested rows of the covariance matrix
    pub fn from_rows(mean: Vec<f64>, covariance: &[Vec<f64>], pixel_count: usize) -> Result<Self> {
        let n = covariance.len();
        if covariance.iter().any(|row| row.len() != n) {
            return Err(Error::Other("covariance rows must form a square matrix".into()));
        }
        let flat: Vec<f64> = covariance.iter().flatten().copied().collect();
        let matrix =
            Array2::from_shape_vec((n, n), flat).map_err(|e| Error::Other(e.to_string()))?;
        Self::new(mean, matrix, pixel_count)
    }

    /// Estimate statistics from sample vectors (one `Vec` per pixel).
    ///
    /// The covariance uses the unbiased `n - 1` denominator; at least two
    /// samples of equal length are required.
    pub fn from_samples(samples: &[Vec<f64>]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(Error::Algorithm(format!(
                "cluster statistics need at least 2 samples, got {}",
                samples.len()
            )));
        }
        let bands = samples[0].len();
        if let Some(bad) = samples.iter().find(|s| s.len() != bands) {
            return Err(Error::BandCountMismatch {
                expected: bands,
                found: bad.len(),
            });
        }

        let n = samples.len() as f64;
        let mut mean = vec![0.0; bands];
        for sample in samples {
            for (m, v) in mean.iter_mut().zip(sample) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut cov = Array2::<f64>::zeros((bands, bands));
        for sample in samples {
            for i in 0..bands {
                let di = sample[i] - mean[i];
                for j in i..bands {
                    cov[(i, j)] += di * (sample[j] - mean[j]);
                }
            }
        }
        for i in 0..bands {
            for j in i..bands {
                cov[(i, j)] /= n - 1.0;
                cov[(j, i)] = cov[(i, j)];
            }
        }

        Self::new(mean, cov, samples.len())
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector (one value per band)
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Covariance matrix (`bands x bands`)
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Number of training pixels
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }
}

/// One training class
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Output class id
    pub class_id: i32,
    /// Statistics of the class
    pub statistics: ClusterStatistics,
}

impl Cluster {
    pub fn new(class_id: i32, statistics: ClusterStatistics) -> Self {
        Self {
            class_id,
            statistics,
        }
    }
}

/// Ordered collection of clusters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clusters {
    clusters: Vec<Cluster>,
}

impl Clusters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cluster
    pub fn push(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// Band count of the first cluster
    pub fn band_count(&self) -> Option<usize> {
        self.clusters.first().map(|c| c.statistics.band_count())
    }

    /// Sum of the training pixel counts of all clusters
    pub fn total_pixel_count(&self) -> usize {
        self.clusters.iter().map(|c| c.statistics.pixel_count()).sum()
    }

    /// Consistency check: non-empty and every cluster reports the same band count.
    pub fn check(&self) -> bool {
        match self.band_count() {
            Some(bands) => self
                .clusters
                .iter()
                .all(|c| c.statistics.band_count() == bands),
            None => false,
        }
    }
}

impl From<Vec<Cluster>> for Clusters {
    fn from(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }
}

impl FromIterator<Cluster> for Clusters {
    fn from_iter<I: IntoIterator<Item = Cluster>>(iter: I) -> Self {
        Self {
            clusters: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Clusters {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}
