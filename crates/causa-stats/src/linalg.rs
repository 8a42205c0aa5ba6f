//! Dense symmetric positive-definite solves for small matrices.
//!
//! Conditioning sets in a structure search rarely exceed a handful of
//! variables, so a Cholesky factorization on a flat `Vec<f64>` is enough.
//! Singularity is reported as `DegenerateTestError`, never as a panic.

use causa_core::errors::DegenerateTestError;

/// Relative pivot tolerance below which a matrix is treated as singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Row-major square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * dim],
        }
    }

    pub fn identity(dim: usize) -> Self {
        Self::from_fn(dim, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    pub fn from_fn(dim: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            for j in 0..dim {
                m.data[i * dim + j] = f(i, j);
            }
        }
        m
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.dim + j] = value;
    }

    /// Lower-triangular `L` with `L * L^T = self`.
    pub fn cholesky(&self) -> Result<SquareMatrix, DegenerateTestError> {
        let n = self.dim;
        let mut l = Self::zeros(n);
        for j in 0..n {
            let diag = self.get(j, j);
            let mut sum = diag;
            for k in 0..j {
                sum -= l.get(j, k) * l.get(j, k);
            }
            if !sum.is_finite() || sum <= PIVOT_TOLERANCE * diag.abs().max(f64::MIN_POSITIVE) {
                return Err(DegenerateTestError::SingularMatrix { dimension: n });
            }
            let pivot = sum.sqrt();
            l.set(j, j, pivot);
            for i in (j + 1)..n {
                let mut s = self.get(i, j);
                for k in 0..j {
                    s -= l.get(i, k) * l.get(j, k);
                }
                l.set(i, j, s / pivot);
            }
        }
        Ok(l)
    }

    /// Solve `self * x = b`.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, DegenerateTestError> {
        let l = self.cholesky()?;
        Ok(Self::solve_factored(&l, b))
    }

    pub fn inverse(&self) -> Result<SquareMatrix, DegenerateTestError> {
        let n = self.dim;
        let l = self.cholesky()?;
        let mut inv = Self::zeros(n);
        let mut e = vec![0.0; n];
        for col in 0..n {
            e.iter_mut().for_each(|v| *v = 0.0);
            e[col] = 1.0;
            let x = Self::solve_factored(&l, &e);
            for (row, value) in x.into_iter().enumerate() {
                inv.set(row, col, value);
            }
        }
        Ok(inv)
    }

    fn solve_factored(l: &SquareMatrix, b: &[f64]) -> Vec<f64> {
        let n = l.dim;
        // L y = b
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut s = b[i];
            for k in 0..i {
                s -= l.get(i, k) * y[k];
            }
            y[i] = s / l.get(i, i);
        }
        // L^T x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut s = y[i];
            for k in (i + 1)..n {
                s -= l.get(k, i) * x[k];
            }
            x[i] = s / l.get(i, i);
        }
        x
    }
}
