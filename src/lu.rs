//! LU decomposition with partial pivoting.
//!
//! Works on a dense row-major copy of the input, in place: after
//! elimination the copy packs the unit lower factor below the diagonal
//! and the upper factor on and above it. A pivot below the active
//! tolerance marks the decomposition singular but elimination continues,
//! so `is_singular` stays inspectable; only `solve` raises.

use crate::context::NumericalContext;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::{Error, Result};

/// The result of an LU decomposition `P·A = L·U`.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Vec<f64>,
    rows: usize,
    cols: usize,
    piv: Vec<usize>,
    pivot_sign: f64,
    singular: bool,
}

impl LuDecomposition {
    /// Decompose under the process-wide numerical context.
    pub fn decompose(a: &DoubleGrid2d) -> Self {
        Self::decompose_with(a, &NumericalContext::get())
    }

    /// Decompose an `m×n` matrix under an explicit numerical context.
    pub fn decompose_with(a: &DoubleGrid2d, context: &NumericalContext) -> Self {
        let (m, n) = (a.rows(), a.cols());
        let mut lu = a.to_row_major();
        let mut piv = Vec::with_capacity(m.min(n));
        let mut pivot_sign = 1.0;
        let mut singular = false;

        for k in 0..m.min(n) {
            // Pivot by the largest magnitude in column k at or below the
            // diagonal.
            let mut p = k;
            for i in k + 1..m {
                if lu[i * n + k].abs() > lu[p * n + k].abs() {
                    p = i;
                }
            }
            piv.push(p);

            if p != k {
                for j in 0..n {
                    lu.swap(k * n + j, p * n + j);
                }
                pivot_sign = -pivot_sign;
            }

            let pivot = lu[k * n + k];
            if context.is_zero(pivot) {
                // Leave the column unscaled so the packed factors remain
                // inspectable.
                singular = true;
                continue;
            }

            for i in k + 1..m {
                lu[i * n + k] /= pivot;
            }
            for i in k + 1..m {
                let factor = lu[i * n + k];
                for j in k + 1..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Self {
            lu,
            rows: m,
            cols: n,
            piv,
            pivot_sign,
            singular,
        }
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.lu[row * self.cols + col]
    }

    /// Whether a pivot fell below the tolerance during elimination.
    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// The row exchange performed at each elimination step, to be
    /// applied in sequence.
    pub fn piv(&self) -> &[usize] {
        &self.piv
    }

    /// The unit lower-triangular factor, `m × min(m, n)`.
    pub fn l(&self) -> DoubleGrid2d {
        let k = self.rows.min(self.cols);
        DoubleGrid2d::from_fn(Extent2d::derived(self.rows, k, 1), |row, col| {
            if row > col {
                self.at(row, col)
            } else if row == col {
                1.0
            } else {
                0.0
            }
        })
    }

    /// The upper-triangular factor, `min(m, n) × n`.
    pub fn u(&self) -> DoubleGrid2d {
        let k = self.rows.min(self.cols);
        DoubleGrid2d::from_fn(Extent2d::derived(k, self.cols, 1), |row, col| {
            if row <= col {
                self.at(row, col)
            } else {
                0.0
            }
        })
    }

    /// The determinant: pivot parity times the product of the diagonal
    /// of `U`. Only square matrices have one.
    pub fn det(&self) -> Result<f64> {
        if self.rows != self.cols {
            return Err(Error::InvalidArgument(
                "determinant requires a square matrix",
            ));
        }

        let mut det = self.pivot_sign;
        for k in 0..self.cols {
            det *= self.at(k, k);
        }
        Ok(det)
    }

    /// Solve `A·X = B` under the process-wide numerical context.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d> {
        self.solve_with(b, &NumericalContext::get())
    }

    /// Solve `A·X = B`: permute `B` by the pivot vector, forward-solve
    /// through `L`, back-solve through `U`.
    pub fn solve_with(&self, b: &DoubleGrid2d, context: &NumericalContext) -> Result<DoubleGrid2d> {
        let n = self.cols;
        if self.rows != n {
            return Err(Error::InvalidArgument("solve requires a square matrix"));
        }
        if b.rows() != n {
            return Err(Error::ShapeMismatch {
                left: vec![n, n],
                right: vec![b.rows(), b.cols()],
            });
        }
        if self.singular || (0..n).any(|k| context.is_zero(self.at(k, k))) {
            return Err(Error::Singular);
        }

        let nx = b.cols();
        let mut x = b.to_row_major();

        for (i, &p) in self.piv.iter().enumerate() {
            if p != i {
                for j in 0..nx {
                    x.swap(i * nx + j, p * nx + j);
                }
            }
        }

        // L·Y = P·B
        for k in 0..n {
            for i in k + 1..n {
                let factor = self.at(i, k);
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * factor;
                }
            }
        }
        // U·X = Y
        for k in (0..n).rev() {
            let pivot = self.at(k, k);
            for j in 0..nx {
                x[k * nx + j] /= pivot;
            }
            for i in 0..k {
                let factor = self.at(i, k);
                for j in 0..nx {
                    x[i * nx + j] -= x[k * nx + j] * factor;
                }
            }
        }

        DoubleGrid2d::from_row_major(Extent2d::new(n, nx)?, x)
    }
}
