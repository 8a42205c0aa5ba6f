//! Fisher-Z test of vanishing partial correlation for linear Gaussian data.
//!
//! z = 0.5 * sqrt(n - |Z| - 3) * ln((1 + r) / (1 - r)), two-sided normal
//! p-value via `statrs`.

use causa_core::config::validate_alpha;
use causa_core::errors::{DegenerateTestError, SearchResult};
use causa_core::graph::{Node, NodeId};
use causa_core::traits::{IndependenceResult, IndependenceTest, LastPValue};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::covariance::CovarianceMatrix;
use crate::data::DataSet;

/// Correlations this close to +/-1 are clamped before the z transform.
const MAX_ABS_CORRELATION: f64 = 1.0 - 1e-12;

pub struct FisherZTest {
    covariance: CovarianceMatrix,
    alpha: f64,
    normal: Normal,
    last_p: LastPValue,
}

impl FisherZTest {
    pub fn new(data: &DataSet, alpha: f64) -> SearchResult<Self> {
        let covariance = CovarianceMatrix::from_dataset(data)?;
        Self::from_covariance(covariance, alpha)
    }

    pub fn from_covariance(covariance: CovarianceMatrix, alpha: f64) -> SearchResult<Self> {
        validate_alpha(alpha)?;
        Ok(Self {
            covariance,
            alpha,
            normal: Normal::standard(),
            last_p: LastPValue::new(),
        })
    }

    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    pub fn sample_size(&self) -> usize {
        self.covariance.sample_size()
    }

    /// Partial correlation of `x` and `y` given `z`, from the inverse of the
    /// covariance submatrix over `{x, y} ∪ z`.
    pub fn partial_correlation(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<f64, DegenerateTestError> {
        let mut indices = Vec::with_capacity(z.len() + 2);
        indices.push(x);
        indices.push(y);
        indices.extend_from_slice(z);
        let precision = self.covariance.submatrix(&indices).inverse()?;
        let r = -precision.get(0, 1) / (precision.get(0, 0) * precision.get(1, 1)).sqrt();
        if r.is_finite() {
            Ok(r)
        } else {
            Err(DegenerateTestError::NonFiniteStatistic { statistic: r })
        }
    }

    /// Two-sided p-value of the Fisher z statistic.
    pub fn p_value(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<f64, DegenerateTestError> {
        let n = self.covariance.sample_size();
        let dof = n as f64 - z.len() as f64 - 3.0;
        if dof <= 0.0 {
            return Err(DegenerateTestError::InsufficientSamples {
                samples: n,
                conditioning: z.len(),
            });
        }
        let r = self
            .partial_correlation(x, y, z)?
            .clamp(-MAX_ABS_CORRELATION, MAX_ABS_CORRELATION);
        let fisher_z = 0.5 * dof.sqrt() * ((1.0 + r) / (1.0 - r)).ln();
        if !fisher_z.is_finite() {
            return Err(DegenerateTestError::NonFiniteStatistic {
                statistic: fisher_z,
            });
        }
        Ok(2.0 * (1.0 - self.normal.cdf(fisher_z.abs())))
    }
}

impl IndependenceTest for FisherZTest {
    fn variables(&self) -> &[Node] {
        self.covariance.variables()
    }

    fn check_independence(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> IndependenceResult {
        let result = match self.p_value(x, y, z) {
            Ok(p) => IndependenceResult::from_p_value(p, self.alpha),
            Err(e) => {
                tracing::debug!(x, y, ?z, error = %e, "degenerate Fisher-Z statistic, treating as independent");
                IndependenceResult::degenerate()
            }
        };
        self.last_p.store(result.p_value);
        result
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn last_p_value(&self) -> Option<f64> {
        self.last_p.load()
    }

    fn name(&self) -> &str {
        "fisher-z"
    }
}
