//! Cluster-based pixel classification
//!
//! Supervised classifiers assigning each pixel of a multi-band image to one
//! of a set of Gaussian clusters:
//! - **Mahalanobis**: minimum distance under a pooled covariance matrix
//! - **Maximum Likelihood**: per-class covariance and log-likelihood
//!
//! Both share [`ClassificationAlgorithm`] state and the generic pixel
//! kernel; [`clusters_from_training`] estimates clusters from labelled pixels.

mod algorithm;
mod cancel;
mod kernel;
mod mahalanobis;
mod max_likelihood;
mod settings;
mod training;

pub use algorithm::{ClassificationAlgorithm, ClusterClassifier};
pub use cancel::CancelToken;
pub use kernel::{DecisionRule, Workspace, CHUNK_SIZE};
pub use mahalanobis::{MahalanobisClassifier, MahalanobisRule};
pub use max_likelihood::{ClassModel, MaxLikelihoodClassifier, MaxLikelihoodRule};
pub use settings::{ClassificationSettings, NoDataMatch, NODATA_SENTINEL};
pub use training::{clusters_from_training, UNLABELLED};
