//! QR decomposition by Householder reflections.
//!
//! For an `m×n` matrix with `m ≥ n` the reflector vectors are stored
//! below the diagonal of the packed work matrix, normalized so their
//! first component is one; the diagonal of `R` lives in a parallel
//! vector. `solve` computes the least-squares solution for `m > n`.

use crate::context::NumericalContext;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::{Error, Result};

/// The result of a QR decomposition `A = Q·R`.
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    qr: Vec<f64>,
    rows: usize,
    cols: usize,
    rdiag: Vec<f64>,
}

impl QrDecomposition {
    /// Decompose an `m×n` matrix with `m ≥ n`.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self> {
        let (m, n) = (a.rows(), a.cols());
        if m < n {
            return Err(Error::InvalidArgument(
                "QR requires at least as many rows as columns",
            ));
        }

        let mut qr = a.to_row_major();
        let mut rdiag = vec![0.0; n];

        for k in 0..n {
            // Column norm below the diagonal, accumulated with hypot so
            // intermediate squares cannot overflow.
            let mut nrm: f64 = 0.0;
            for i in k..m {
                nrm = nrm.hypot(qr[i * n + k]);
            }

            if nrm != 0.0 {
                if qr[k * n + k] < 0.0 {
                    nrm = -nrm;
                }
                for i in k..m {
                    qr[i * n + k] /= nrm;
                }
                qr[k * n + k] += 1.0;

                // Apply the reflector to the trailing columns.
                for j in k + 1..n {
                    let mut s = 0.0;
                    for i in k..m {
                        s += qr[i * n + k] * qr[i * n + j];
                    }
                    s = -s / qr[k * n + k];
                    for i in k..m {
                        qr[i * n + j] += s * qr[i * n + k];
                    }
                }
            }
            rdiag[k] = -nrm;
        }

        Ok(Self {
            qr,
            rows: m,
            cols: n,
            rdiag,
        })
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.qr[row * self.cols + col]
    }

    /// Whether every diagonal entry of `R` exceeds the process-wide
    /// tolerance.
    pub fn has_full_rank(&self) -> bool {
        self.has_full_rank_with(&NumericalContext::get())
    }

    /// Whether every diagonal entry of `R` exceeds the given tolerance.
    pub fn has_full_rank_with(&self, context: &NumericalContext) -> bool {
        self.rdiag.iter().all(|&r| !context.is_zero(r))
    }

    /// The diagonal of `R`.
    pub fn rdiag(&self) -> &[f64] {
        &self.rdiag
    }

    /// The packed decomposition: reflector vectors below the diagonal,
    /// the transformed matrix on and above it.
    pub fn qr(&self) -> DoubleGrid2d {
        DoubleGrid2d::from_fn(Extent2d::derived(self.rows, self.cols, 1), |row, col| {
            self.at(row, col)
        })
    }

    /// The Householder reflector vectors, `m × n` lower trapezoidal.
    pub fn h(&self) -> DoubleGrid2d {
        DoubleGrid2d::from_fn(Extent2d::derived(self.rows, self.cols, 1), |row, col| {
            if row >= col {
                self.at(row, col)
            } else {
                0.0
            }
        })
    }

    /// The upper-triangular factor, `n × n`.
    pub fn r(&self) -> DoubleGrid2d {
        DoubleGrid2d::from_fn(Extent2d::derived(self.cols, self.cols, 1), |row, col| {
            if row < col {
                self.at(row, col)
            } else if row == col {
                self.rdiag[row]
            } else {
                0.0
            }
        })
    }

    /// The orthogonal factor, `m × n`, built by applying the reflectors
    /// to the identity from the last column backwards.
    pub fn q(&self) -> DoubleGrid2d {
        let (m, n) = (self.rows, self.cols);
        let mut q = vec![0.0; m * n];

        for k in (0..n).rev() {
            q[k * n + k] = 1.0;
            for j in k..n {
                if self.at(k, k) != 0.0 {
                    let mut s = 0.0;
                    for i in k..m {
                        s += self.at(i, k) * q[i * n + j];
                    }
                    s = -s / self.at(k, k);
                    for i in k..m {
                        q[i * n + j] += s * self.at(i, k);
                    }
                }
            }
        }

        DoubleGrid2d::from_fn(Extent2d::derived(m, n, 1), |row, col| q[row * n + col])
    }

    /// Solve `A·X = B` under the process-wide numerical context.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d> {
        self.solve_with(b, &NumericalContext::get())
    }

    /// Least-squares solution of `A·X = B`: apply `Qᵀ` to `B`, then
    /// back-solve through `R`. Fails with `Singular` when `R` is rank
    /// deficient under the context.
    pub fn solve_with(&self, b: &DoubleGrid2d, context: &NumericalContext) -> Result<DoubleGrid2d> {
        let (m, n) = (self.rows, self.cols);
        if b.rows() != m {
            return Err(Error::ShapeMismatch {
                left: vec![m, n],
                right: vec![b.rows(), b.cols()],
            });
        }
        if !self.has_full_rank_with(context) {
            return Err(Error::Singular);
        }

        let nx = b.cols();
        let mut x = b.to_row_major();

        // Y = Qᵀ·B, one reflector at a time.
        for k in 0..n {
            for j in 0..nx {
                let mut s = 0.0;
                for i in k..m {
                    s += self.at(i, k) * x[i * nx + j];
                }
                s = -s / self.at(k, k);
                for i in k..m {
                    x[i * nx + j] += s * self.at(i, k);
                }
            }
        }

        // R·X = Y
        for k in (0..n).rev() {
            let diag = self.rdiag[k];
            for j in 0..nx {
                x[k * nx + j] /= diag;
            }
            for i in 0..k {
                let factor = self.at(i, k);
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * factor;
                }
            }
        }

        x.truncate(n * nx);
        DoubleGrid2d::from_row_major(Extent2d::new(n, nx)?, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: usize, cols: usize, values: &[f64]) -> DoubleGrid2d {
        DoubleGrid2d::from_row_major(Extent2d::new(rows, cols).unwrap(), values.to_vec()).unwrap()
    }

    fn tolerance() -> NumericalContext {
        NumericalContext::new(1e-10)
    }

    #[test]
    fn q_times_r_reconstructs_input() {
        let a = matrix(
            4,
            3,
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 2.0, -1.0, 0.5,
            ],
        );
        let qr = QrDecomposition::decompose(&a).unwrap();

        let reconstructed = qr.q().mult(&qr.r(), None, 1.0, 0.0, false, false).unwrap();
        assert!(reconstructed.equals_with(&a, &tolerance()));
    }

    #[test]
    fn q_has_orthonormal_columns() {
        let a = matrix(4, 2, &[2.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, 3.0]);
        let q = QrDecomposition::decompose(&a).unwrap().q();

        let gram = q.mult(&q, None, 1.0, 0.0, true, false).unwrap();
        let identity = DoubleGrid2d::identity(2).unwrap();
        assert!(gram.equals_with(&identity, &tolerance()));
    }

    #[test]
    fn solves_square_system() {
        let a = matrix(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let b = matrix(2, 1, &[9.0, 8.0]);

        let x = QrDecomposition::decompose(&a).unwrap().solve(&b).unwrap();
        assert_relative_eq!(x.get(0, 0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(x.get(1, 0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn least_squares_matches_normal_equations() {
        // Overdetermined fit of y = c0 + c1·t through four points.
        let a = matrix(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let b = matrix(4, 1, &[1.0, 2.6, 3.0, 5.0]);

        let x = QrDecomposition::decompose(&a).unwrap().solve(&b).unwrap();

        // AᵀA·x = Aᵀb solved directly.
        let ata = a.mult(&a, None, 1.0, 0.0, true, false).unwrap();
        let atb = a.mult(&b, None, 1.0, 0.0, true, false).unwrap();
        let expected = crate::lu::LuDecomposition::decompose(&ata)
            .solve(&atb)
            .unwrap();

        assert!(x.equals_with(&expected, &tolerance()));
    }

    #[test]
    fn rank_deficient_matrix_is_detected() {
        let a = matrix(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();

        assert!(!qr.has_full_rank_with(&tolerance()));
        assert_eq!(
            qr.solve_with(&matrix(3, 1, &[1.0, 1.0, 1.0]), &tolerance())
                .unwrap_err(),
            Error::Singular
        );
    }

    #[test]
    fn wide_matrix_is_rejected() {
        let a = matrix(2, 3, &[0.0; 6]);
        assert!(matches!(
            QrDecomposition::decompose(&a),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn one_by_one_matrix() {
        let a = matrix(1, 1, &[-5.0]);
        let qr = QrDecomposition::decompose(&a).unwrap();

        assert_relative_eq!(qr.r().get(0, 0).abs(), 5.0);
        let x = qr.solve(&matrix(1, 1, &[10.0])).unwrap();
        assert_relative_eq!(x.get(0, 0), -2.0);
    }
}
