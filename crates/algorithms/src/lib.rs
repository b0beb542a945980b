//! # geoclass Algorithms
//!
//! Statistical pixel classification and tile analysis for geoclass.
//!
//! ## Available Algorithm Categories
//!
//! - **classification**: Mahalanobis and Maximum Likelihood cluster
//!   classifiers, training statistics
//! - **entropy**: Shannon entropy by tiles
//! - **linalg**: LU decomposition and pooled covariance

pub mod classification;
pub mod entropy;
pub mod linalg;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{
        clusters_from_training, CancelToken, ClassificationAlgorithm, ClassificationSettings,
        ClusterClassifier, MahalanobisClassifier, MaxLikelihoodClassifier, NoDataMatch,
    };
    pub use crate::entropy::{EntropyByTiles, EntropyResult};
    pub use crate::linalg::{compute_lu, pooled_covariance, LuMatrix};
    pub use geoclass_core::prelude::*;
    pub use geoclass_parallel::ProcessingMode;
}
