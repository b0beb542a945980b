//! Minimum Mahalanobis distance classification
//!
//! All classes share one pooled covariance matrix. A pixel goes to the
//! cluster with the smallest squared distance `(x - μ)ᵗ Σ⁻¹ (x - μ)` among
//! those closer than the threshold distance.

use geoclass_core::{Clusters, Result};

use super::algorithm::{ClassificationAlgorithm, ClusterClassifier};
use super::kernel::{DecisionRule, Workspace};
use crate::linalg::{compute_lu, pooled_covariance, LuMatrix};

/// Mahalanobis distance classifier.
///
/// The threshold is a distance (not squared); pixels whose distance to
/// every cluster is at least the threshold get the no-class value.
#[derive(Debug, Clone, Default)]
pub struct MahalanobisClassifier {
    algorithm: ClassificationAlgorithm,
}

impl MahalanobisClassifier {
    pub fn new(clusters: Clusters, threshold: f64) -> Self {
        Self {
            algorithm: ClassificationAlgorithm::new(clusters, threshold),
        }
    }
}

/// Precomputed pooled LU factors and cluster means
#[derive(Debug, Clone)]
pub struct MahalanobisRule {
    lu: LuMatrix,
    means: Vec<(i32, Vec<f64>)>,
    threshold_sq: f64,
}

impl MahalanobisRule {
    /// Squared Mahalanobis distance of `pixel` to the cluster at `index`
    pub fn distance_sq(&self, index: usize, pixel: &[f64], workspace: &mut Workspace) -> f64 {
        workspace.set_diff(pixel, &self.means[index].1);
        self.lu.quadratic_form(&workspace.diff, &mut workspace.solve)
    }
}

impl DecisionRule for MahalanobisRule {
    fn band_count(&self) -> usize {
        self.lu.size()
    }

    fn select(&self, pixel: &[f64], workspace: &mut Workspace) -> Option<i32> {
        let mut best = None;
        let mut best_distance = self.threshold_sq;
        for (index, (class_id, _)) in self.means.iter().enumerate() {
            let d = self.distance_sq(index, pixel, workspace);
            if d < best_distance {
                best_distance = d;
                best = Some(*class_id);
            }
        }
        best
    }
}

impl ClusterClassifier for MahalanobisClassifier {
    type Rule = MahalanobisRule;

    const NAME: &'static str = "Mahalanobis";

    fn algorithm(&self) -> &ClassificationAlgorithm {
        &self.algorithm
    }

    fn algorithm_mut(&mut self) -> &mut ClassificationAlgorithm {
        &mut self.algorithm
    }

    /// Valid iff `threshold >= 0` and the clusters are consistent
    fn check(&self) -> bool {
        self.threshold() >= 0.0 && self.clusters().check()
    }

    fn prepare(&self) -> Result<MahalanobisRule> {
        let clusters = self.clusters();
        let pooled = pooled_covariance(clusters)?;
        tracing::debug!(bands = pooled.nrows(), ?pooled, "pooled covariance");

        let threshold = self.threshold();
        Ok(MahalanobisRule {
            lu: compute_lu(pooled.view()),
            means: clusters
                .iter()
                .map(|c| (c.class_id, c.statistics.mean().to_vec()))
                .collect(),
            threshold_sq: threshold * threshold,
        })
    }
}
