//! Maximum Likelihood classification
//!
//! Each class keeps its own covariance matrix. For a pixel `x` and class
//! `c` the log-likelihood is
//!
//! `C_c - (x - μ_c)ᵗ Σ_c⁻¹ (x - μ_c) / 2`
//!
//! with the per-class constant
//!
//! `C_c = -ln(K) - ln(det Σ_c) / 2 - (K / 2) ln(2π)`, `K` = number of classes.
//!
//! A class qualifies only if its quadratic term `-(q / 2)` exceeds
//! `ln(threshold / 100)`; the qualifying class with the largest
//! log-likelihood wins.

use std::f64::consts::PI;

use geoclass_core::{Clusters, Result};

use super::algorithm::{ClassificationAlgorithm, ClusterClassifier};
use super::kernel::{DecisionRule, Workspace};
use crate::linalg::{compute_lu, LuMatrix};

/// Gaussian maximum likelihood classifier.
///
/// The threshold is a probability percentage in `[0, 100]`: 0 accepts every
/// class, 100 rejects every pixel.
#[derive(Debug, Clone, Default)]
pub struct MaxLikelihoodClassifier {
    algorithm: ClassificationAlgorithm,
}

impl MaxLikelihoodClassifier {
    pub fn new(clusters: Clusters, threshold: f64) -> Self {
        Self {
            algorithm: ClassificationAlgorithm::new(clusters, threshold),
        }
    }
}

/// Per-class model: mean, LU factors of the class covariance and constant term
#[derive(Debug, Clone)]
pub struct ClassModel {
    pub class_id: i32,
    pub mean: Vec<f64>,
    pub lu: LuMatrix,
    pub constant: f64,
}

/// Precomputed per-class models
#[derive(Debug, Clone)]
pub struct MaxLikelihoodRule {
    classes: Vec<ClassModel>,
    log_threshold: f64,
}

impl MaxLikelihoodRule {
    pub fn classes(&self) -> &[ClassModel] {
        &self.classes
    }

    /// `ln(threshold / 100)`
    pub fn log_threshold(&self) -> f64 {
        self.log_threshold
    }
}

impl DecisionRule for MaxLikelihoodRule {
    fn band_count(&self) -> usize {
        self.classes.first().map_or(0, |c| c.lu.size())
    }

    fn select(&self, pixel: &[f64], workspace: &mut Workspace) -> Option<i32> {
        let mut best = None;
        let mut best_probability = f64::NEG_INFINITY;
        for class in &self.classes {
            workspace.set_diff(pixel, &class.mean);
            let q = class.lu.quadratic_form(&workspace.diff, &mut workspace.solve);
            let temp_probability = -q / 2.0;
            if temp_probability > self.log_threshold {
                let final_probability = class.constant + temp_probability;
                if final_probability > best_probability {
                    best_probability = final_probability;
                    best = Some(class.class_id);
                }
            }
        }
        best
    }
}

impl ClusterClassifier for MaxLikelihoodClassifier {
    type Rule = MaxLikelihoodRule;

    const NAME: &'static str = "MaxLikelihood";

    fn algorithm(&self) -> &ClassificationAlgorithm {
        &self.algorithm
    }

    fn algorithm_mut(&mut self) -> &mut ClassificationAlgorithm {
        &mut self.algorithm
    }

    /// Valid iff `0 <= threshold <= 100` and the clusters are consistent
    fn check(&self) -> bool {
        (0.0..=100.0).contains(&self.threshold()) && self.clusters().check()
    }

    fn prepare(&self) -> Result<MaxLikelihoodRule> {
        let clusters = self.clusters();
        let k = clusters.len() as f64;
        let common = -k.ln() - (k / 2.0) * (2.0 * PI).ln();

        let classes: Vec<ClassModel> = clusters
            .iter()
            .map(|c| {
                let lu = compute_lu(c.statistics.covariance().view());
                let determinant = lu.determinant();
                let constant = common - determinant.ln() / 2.0;
                if !constant.is_finite() {
                    tracing::warn!(
                        class_id = c.class_id,
                        determinant,
                        "covariance determinant is not positive, class can never be selected"
                    );
                }
                ClassModel {
                    class_id: c.class_id,
                    mean: c.statistics.mean().to_vec(),
                    lu,
                    constant,
                }
            })
            .collect();

        let log_threshold = (self.threshold() / 100.0).ln();
        tracing::debug!(classes = classes.len(), log_threshold, "maximum likelihood models");
        Ok(MaxLikelihoodRule {
            classes,
            log_threshold,
        })
    }
}
