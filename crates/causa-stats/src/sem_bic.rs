//! Linear-Gaussian BIC score: 2 * log-likelihood - c * k * ln(n).
//!
//! The residual variance of a node given its parents comes from the
//! covariance matrix, so scoring needs no pass over the raw data.

use causa_core::config::validate_penalty;
use causa_core::errors::{DegenerateTestError, SearchResult};
use causa_core::graph::{Node, NodeId};
use causa_core::traits::Score;

use crate::covariance::CovarianceMatrix;
use crate::data::DataSet;

pub struct SemBicScore {
    covariance: CovarianceMatrix,
    penalty_discount: f64,
}

impl SemBicScore {
    pub fn new(data: &DataSet, penalty_discount: f64) -> SearchResult<Self> {
        Self::from_covariance(CovarianceMatrix::from_dataset(data)?, penalty_discount)
    }

    pub fn from_covariance(covariance: CovarianceMatrix, penalty_discount: f64) -> SearchResult<Self> {
        validate_penalty(penalty_discount)?;
        Ok(Self {
            covariance,
            penalty_discount,
        })
    }

    pub fn penalty_discount(&self) -> f64 {
        self.penalty_discount
    }

    /// var(node) - cov(node, P) * cov(P)^-1 * cov(P, node)
    pub fn residual_variance(&self, node: NodeId, parents: &[NodeId]) -> Result<f64, DegenerateTestError> {
        let var = self.covariance.get(node, node);
        if parents.is_empty() {
            return Ok(var);
        }
        let sigma_pp = self.covariance.submatrix(parents);
        let sigma_py: Vec<f64> = parents.iter().map(|&p| self.covariance.get(p, node)).collect();
        let beta = sigma_pp.solve(&sigma_py)?;
        let explained: f64 = beta.iter().zip(&sigma_py).map(|(b, s)| b * s).sum();
        let residual = var - explained;
        if residual.is_finite() && residual > 0.0 {
            Ok(residual)
        } else {
            Err(DegenerateTestError::NonFiniteStatistic { statistic: residual })
        }
    }
}

impl Score for SemBicScore {
    fn variables(&self) -> &[Node] {
        self.covariance.variables()
    }

    /// NaN when the parent covariance is singular; searches treat a NaN gain
    /// as "no improvement".
    fn local_score(&self, node: NodeId, parents: &[NodeId]) -> f64 {
        let n = self.covariance.sample_size() as f64;
        match self.residual_variance(node, parents) {
            Ok(residual) => {
                -n * residual.ln() - self.penalty_discount * parents.len() as f64 * n.ln()
            }
            Err(e) => {
                tracing::debug!(node, ?parents, error = %e, "degenerate BIC local score");
                f64::NAN
            }
        }
    }

    fn sample_size(&self) -> usize {
        self.covariance.sample_size()
    }

    fn name(&self) -> &str {
        "sem-bic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;

    fn dependent_pair() -> DataSet {
        let x: Vec<f64> = (0..200).map(|i| (i as f64).sin()).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 * v + 0.1 * (3.0 * i as f64).cos())
            .collect();
        DataSet::from_columns(nodes_from_names(&["X", "Y"]), vec![x, y]).unwrap()
    }

    #[test]
    fn parent_explains_variance() {
        let score = SemBicScore::new(&dependent_pair(), 1.0).unwrap();
        let alone = score.residual_variance(1, &[]).unwrap();
        let given_x = score.residual_variance(1, &[0]).unwrap();
        assert!(given_x < alone / 10.0);
    }

    #[test]
    fn adding_a_real_parent_is_a_gain() {
        let score = SemBicScore::new(&dependent_pair(), 1.0).unwrap();
        let diff = score.local_score_diff(0, 1, &[]);
        assert!(diff > 0.0);
        assert!((diff - (score.local_score(1, &[0]) - score.local_score(1, &[]))).abs() < 1e-9);
    }
}
