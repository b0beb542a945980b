//! Pooled covariance

use geoclass_core::{Clusters, Error, Result};
use ndarray::Array2;

/// Pooled (within-class) covariance of all clusters.
///
/// Each class contributes its covariance weighted by
/// `(n_c - 1) / (N - K)`, where `n_c` is the class pixel count, `N` the
/// total pixel count and `K` the number of classes.
pub fn pooled_covariance(clusters: &Clusters) -> Result<Array2<f64>> {
    let bands = clusters
        .band_count()
        .ok_or_else(|| Error::Algorithm("pooled covariance of an empty cluster set".into()))?;

    let total = clusters.total_pixel_count() as f64;
    let degrees = total - clusters.len() as f64;
    if degrees <= 0.0 {
        return Err(Error::Algorithm(format!(
            "pooled covariance needs more training pixels ({}) than classes ({})",
            clusters.total_pixel_count(),
            clusters.len()
        )));
    }

    let mut pooled = Array2::<f64>::zeros((bands, bands));
    for cluster in clusters {
        let stats = &cluster.statistics;
        if stats.band_count() != bands {
            return Err(Error::BandCountMismatch {
                expected: bands,
                found: stats.band_count(),
            });
        }
        let weight = (stats.pixel_count() as f64 - 1.0) / degrees;
        pooled.scaled_add(weight, stats.covariance());
    }
    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geoclass_core::{Cluster, ClusterStatistics};
    use ndarray::array;

    fn cluster(id: i32, cov: Array2<f64>, n: usize) -> Cluster {
        let bands = cov.nrows();
        Cluster::new(id, ClusterStatistics::new(vec![0.0; bands], cov, n).unwrap())
    }

    #[test]
    fn test_weighted_by_degrees_of_freedom() {
        let clusters = Clusters::from(vec![
            cluster(1, array![[2.0, 0.0], [0.0, 4.0]], 11),
            cluster(2, array![[6.0, 1.0], [1.0, 8.0]], 31),
        ]);
        // N - K = 40; weights 10/40 and 30/40
        let pooled = pooled_covariance(&clusters).unwrap();
        assert_relative_eq!(pooled[(0, 0)], 0.25 * 2.0 + 0.75 * 6.0);
        assert_relative_eq!(pooled[(0, 1)], 0.75);
        assert_relative_eq!(pooled[(1, 1)], 0.25 * 4.0 + 0.75 * 8.0);
    }

    #[test]
    fn test_equal_classes_average() {
        let clusters = Clusters::from(vec![
            cluster(1, array![[1.0]], 100),
            cluster(2, array![[3.0]], 100),
        ]);
        assert_relative_eq!(pooled_covariance(&clusters).unwrap()[(0, 0)], 2.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(pooled_covariance(&Clusters::new()).is_err());
        let single_pixels = Clusters::from(vec![
            cluster(1, array![[1.0]], 1),
            cluster(2, array![[1.0]], 1),
        ]);
        assert!(pooled_covariance(&single_pixels).is_err());
    }
}
