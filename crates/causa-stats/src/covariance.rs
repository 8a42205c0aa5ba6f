//! Sample covariance matrices.

use causa_core::errors::DataError;
use causa_core::graph::{Node, NodeId};

use crate::data::DataSet;
use crate::linalg::SquareMatrix;

/// Unbiased sample covariance over named variables.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    variables: Vec<Node>,
    matrix: SquareMatrix,
    sample_size: usize,
}

impl CovarianceMatrix {
    pub fn from_dataset(data: &DataSet) -> Result<Self, DataError> {
        let n = data.sample_size();
        if n < 2 {
            return Err(DataError::TooFewSamples {
                samples: n,
                required: 2,
            });
        }
        let p = data.num_variables();
        let means: Vec<f64> = (0..p)
            .map(|i| data.column(i).iter().sum::<f64>() / n as f64)
            .collect();
        let mut matrix = SquareMatrix::zeros(p);
        for i in 0..p {
            let ci = data.column(i);
            for j in i..p {
                let cj = data.column(j);
                let s: f64 = ci
                    .iter()
                    .zip(cj)
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum();
                let cov = s / (n - 1) as f64;
                matrix.set(i, j, cov);
                matrix.set(j, i, cov);
            }
        }
        Ok(Self {
            variables: data.variables().to_vec(),
            matrix,
            sample_size: n,
        })
    }

    /// Wrap a known covariance matrix given row-major.
    pub fn from_matrix(
        variables: Vec<Node>,
        rows: &[Vec<f64>],
        sample_size: usize,
    ) -> Result<Self, DataError> {
        let p = variables.len();
        if p == 0 {
            return Err(DataError::Empty);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != p {
                return Err(DataError::RaggedColumns {
                    name: variables
                        .get(i)
                        .map_or_else(|| format!("row {i}"), |v| v.name().to_string()),
                    expected: p,
                    actual: row.len(),
                });
            }
        }
        if rows.len() != p {
            return Err(DataError::RaggedColumns {
                name: "<rows>".to_string(),
                expected: p,
                actual: rows.len(),
            });
        }
        Ok(Self {
            variables,
            matrix: SquareMatrix::from_fn(p, |i, j| rows[i][j]),
            sample_size,
        })
    }

    pub fn variables(&self) -> &[Node] {
        &self.variables
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn get(&self, i: NodeId, j: NodeId) -> f64 {
        self.matrix.get(i, j)
    }

    /// Rows and columns picked by `indices`, in that order.
    pub fn submatrix(&self, indices: &[NodeId]) -> SquareMatrix {
        SquareMatrix::from_fn(indices.len(), |i, j| self.matrix.get(indices[i], indices[j]))
    }

    pub fn correlation(&self, i: NodeId, j: NodeId) -> f64 {
        self.get(i, j) / (self.get(i, i) * self.get(j, j)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;

    #[test]
    fn covariance_of_known_columns() {
        let data = DataSet::from_columns(
            nodes_from_names(&["A", "B"]),
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]],
        )
        .unwrap();
        let cov = CovarianceMatrix::from_dataset(&data).unwrap();
        // var(A) = 5/3, cov(A, B) = 10/3
        assert!((cov.get(0, 0) - 5.0 / 3.0).abs() < 1e-12);
        assert!((cov.get(0, 1) - 10.0 / 3.0).abs() < 1e-12);
        assert!((cov.correlation(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_row_is_too_few() {
        let data = DataSet::from_columns(nodes_from_names(&["A"]), vec![vec![1.0]]).unwrap();
        assert!(matches!(
            CovarianceMatrix::from_dataset(&data),
            Err(DataError::TooFewSamples { .. })
        ));
    }
}
