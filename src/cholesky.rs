//! Cholesky decomposition of symmetric positive-definite matrices.
//!
//! Produces the lower-triangular `L` with `L·Lᵀ = A`, computed column
//! by column. A non-positive pivot stops the factorization and clears
//! the positive-definite flag; `solve` raises from that state.

use crate::context::NumericalContext;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::{Error, Result};

/// The result of a Cholesky decomposition `A = L·Lᵀ`.
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition {
    l: Vec<f64>,
    n: usize,
    spd: bool,
}

impl CholeskyDecomposition {
    /// Decompose under the process-wide numerical context.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self> {
        Self::decompose_with(a, &NumericalContext::get())
    }

    /// Decompose a square matrix. Symmetry is checked under the given
    /// context; asymmetry clears the positive-definite flag just like a
    /// failed pivot does.
    pub fn decompose_with(a: &DoubleGrid2d, context: &NumericalContext) -> Result<Self> {
        let n = a.rows();
        if a.cols() != n {
            return Err(Error::InvalidArgument("Cholesky requires a square matrix"));
        }

        let mut spd = (0..n)
            .all(|i| (i + 1..n).all(|j| context.equals(a.get(i, j), a.get(j, i))));

        let mut l = vec![0.0; n * n];
        for j in 0..n {
            let mut d = a.get(j, j);
            for k in 0..j {
                d -= l[j * n + k] * l[j * n + k];
            }
            if d <= 0.0 {
                spd = false;
                break;
            }

            let pivot = d.sqrt();
            l[j * n + j] = pivot;
            for i in j + 1..n {
                let mut s = a.get(i, j);
                for k in 0..j {
                    s -= l[i * n + k] * l[j * n + k];
                }
                l[i * n + j] = s / pivot;
            }
        }

        Ok(Self { l, n, spd })
    }

    /// Whether the input was symmetric with strictly positive pivots.
    pub fn is_symmetric_positive_definite(&self) -> bool {
        self.spd
    }

    /// The lower-triangular factor, `n × n`.
    pub fn l(&self) -> DoubleGrid2d {
        let n = self.n;
        DoubleGrid2d::from_fn(Extent2d::derived(n, n, 1), |row, col| {
            if row >= col {
                self.l[row * n + col]
            } else {
                0.0
            }
        })
    }

    /// The determinant: the squared product of the diagonal of `L`.
    pub fn det(&self) -> Result<f64> {
        if !self.spd {
            return Err(Error::NotPositiveDefinite);
        }

        let mut det = 1.0;
        for j in 0..self.n {
            let d = self.l[j * self.n + j];
            det *= d * d;
        }
        Ok(det)
    }

    /// Solve `A·X = B`: forward-solve through `L`, back-solve through
    /// `Lᵀ`.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d> {
        let n = self.n;
        if !self.spd {
            return Err(Error::NotPositiveDefinite);
        }
        if b.rows() != n {
            return Err(Error::ShapeMismatch {
                left: vec![n, n],
                right: vec![b.rows(), b.cols()],
            });
        }

        let nx = b.cols();
        let mut x = b.to_row_major();

        // L·Y = B
        for k in 0..n {
            for j in 0..nx {
                let mut sum = x[k * nx + j];
                for i in 0..k {
                    sum -= self.l[k * n + i] * x[i * nx + j];
                }
                x[k * nx + j] = sum / self.l[k * n + k];
            }
        }
        // Lᵀ·X = Y
        for k in (0..n).rev() {
            for j in 0..nx {
                let mut sum = x[k * nx + j];
                for i in k + 1..n {
                    sum -= self.l[i * n + k] * x[i * nx + j];
                }
                x[k * nx + j] = sum / self.l[k * n + k];
            }
        }

        DoubleGrid2d::from_row_major(Extent2d::new(n, nx)?, x)
    }
}
