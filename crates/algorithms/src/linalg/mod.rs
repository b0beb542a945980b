//! Linear algebra shared by the classifiers
//!
//! - **lu**: LU decomposition with pivot regularization, substitution solves
//! - **covariance**: pooled (within-class) covariance of a cluster collection

mod covariance;
mod lu;

pub use covariance::pooled_covariance;
pub use lu::{compute_lu, LuMatrix, ZERO_TOLERANCE};
