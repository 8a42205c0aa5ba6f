//! Numerical degeneracy inside a statistic.
//!
//! Returned by the numeric layer instead of panicking. Independence tests turn
//! it into the "independent, p = NaN" sentinel so that FAS removes the edge.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DegenerateTestError {
    #[error("singular matrix of dimension {dimension}")]
    SingularMatrix { dimension: usize },

    #[error("non-finite statistic: {statistic}")]
    NonFiniteStatistic { statistic: f64 },

    #[error("insufficient degrees of freedom: {samples} samples, {conditioning} conditioning variables")]
    InsufficientSamples { samples: usize, conditioning: usize },
}
