//! # causa-stats
//!
//! Statistical leaves plugged into the search engine: tabular continuous data,
//! covariance matrices, small dense solves, the Fisher-Z partial-correlation
//! test, the d-separation oracle, and the linear-Gaussian BIC score.

pub mod covariance;
pub mod data;
pub mod dsep;
pub mod fisher_z;
pub mod linalg;
pub mod sem_bic;

pub use covariance::CovarianceMatrix;
pub use data::DataSet;
pub use dsep::DSeparationTest;
pub use fisher_z::FisherZTest;
pub use sem_bic::SemBicScore;
