//! Dense double kernels: matrix multiply, triangular solves and row
//! permutation.
//!
//! All kernels read their operands through grid views, so strided,
//! transposed and sliced inputs work without copying. Shapes are checked
//! up front; triangularity of the `trsm`/`trsv` operands is the caller's
//! contract and is not verified.

use crate::extent::{Extent1d, Extent2d};
use crate::grid::{DoubleGrid1d, DoubleGrid2d, Grid2d};
use crate::{Error, Result};

/// Tile side of the blocked gemm loops, chosen so a tile of doubles
/// stays inside the L1 cache.
const BLOCK: usize = 64;

/// `C ← α·A·B + β·C` for an `m×k` matrix `A` and a `k×n` matrix `B`.
///
/// With `β = 0` the target is overwritten without being read. The inner
/// product accumulates with fused multiply-add.
pub fn gemm(
    alpha: f64,
    a: &DoubleGrid2d,
    b: &DoubleGrid2d,
    beta: f64,
    c: &mut DoubleGrid2d,
) -> Result<()> {
    let (m, k) = (a.rows(), a.cols());
    let n = b.cols();

    if b.rows() != k {
        return Err(Error::ShapeMismatch {
            left: vec![m, k],
            right: vec![b.rows(), b.cols()],
        });
    }
    if c.rows() != m || c.cols() != n {
        return Err(Error::ShapeMismatch {
            left: vec![m, n],
            right: vec![c.rows(), c.cols()],
        });
    }

    if beta == 0.0 {
        c.fill(0.0);
    } else if beta != 1.0 {
        c.apply(|x| beta * x);
    }
    if alpha == 0.0 || k == 0 {
        return Ok(());
    }

    for row0 in (0..m).step_by(BLOCK) {
        let row1 = (row0 + BLOCK).min(m);
        for mid0 in (0..k).step_by(BLOCK) {
            let mid1 = (mid0 + BLOCK).min(k);
            for col0 in (0..n).step_by(BLOCK) {
                let col1 = (col0 + BLOCK).min(n);
                for row in row0..row1 {
                    for mid in mid0..mid1 {
                        let factor = alpha * a.get(row, mid);
                        for col in col0..col1 {
                            let updated = factor.mul_add(b.get(mid, col), c.get(row, col));
                            c.set(row, col, updated);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// `y ← α·A·x + β·y` for an `m×n` matrix `A`.
///
/// With `β = 0` the target is overwritten without being read.
pub fn gemv(
    alpha: f64,
    a: &DoubleGrid2d,
    x: &DoubleGrid1d,
    beta: f64,
    y: &mut DoubleGrid1d,
) -> Result<()> {
    let (m, n) = (a.rows(), a.cols());

    if x.size() != n {
        return Err(Error::ShapeMismatch {
            left: vec![m, n],
            right: vec![x.size()],
        });
    }
    if y.size() != m {
        return Err(Error::ShapeMismatch {
            left: vec![m],
            right: vec![y.size()],
        });
    }

    for row in 0..m {
        let mut sum = 0.0;
        for col in 0..n {
            sum = a.get(row, col).mul_add(x.get(col), sum);
        }
        let prior = if beta == 0.0 { 0.0 } else { beta * y.get(row) };
        y.set(row, alpha.mul_add(sum, prior));
    }

    Ok(())
}

/// Solve `L·X = B` in place for lower-triangular `L`, overwriting `B`
/// with `X`. With `unit_diagonal` the diagonal of `L` is taken as one
/// and never read.
pub fn trsm_lower(l: &DoubleGrid2d, b: &mut DoubleGrid2d, unit_diagonal: bool) -> Result<()> {
    let n = check_triangular_operands(l, b.rows())?;

    for col in 0..b.cols() {
        for row in 0..n {
            let mut sum = b.get(row, col);
            for j in 0..row {
                sum -= l.get(row, j) * b.get(j, col);
            }
            if !unit_diagonal {
                sum /= l.get(row, row);
            }
            b.set(row, col, sum);
        }
    }

    Ok(())
}

/// Solve `U·X = B` in place for upper-triangular `U`, overwriting `B`
/// with `X`.
pub fn trsm_upper(u: &DoubleGrid2d, b: &mut DoubleGrid2d, unit_diagonal: bool) -> Result<()> {
    let n = check_triangular_operands(u, b.rows())?;

    for col in 0..b.cols() {
        for row in (0..n).rev() {
            let mut sum = b.get(row, col);
            for j in row + 1..n {
                sum -= u.get(row, j) * b.get(j, col);
            }
            if !unit_diagonal {
                sum /= u.get(row, row);
            }
            b.set(row, col, sum);
        }
    }

    Ok(())
}

/// Solve `L·x = b` in place for lower-triangular `L`.
pub fn trsv_lower(l: &DoubleGrid2d, b: &mut DoubleGrid1d, unit_diagonal: bool) -> Result<()> {
    let n = check_triangular_operands(l, b.size())?;

    for row in 0..n {
        let mut sum = b.get(row);
        for j in 0..row {
            sum -= l.get(row, j) * b.get(j);
        }
        if !unit_diagonal {
            sum /= l.get(row, row);
        }
        b.set(row, sum);
    }

    Ok(())
}

/// Solve `U·x = b` in place for upper-triangular `U`.
pub fn trsv_upper(u: &DoubleGrid2d, b: &mut DoubleGrid1d, unit_diagonal: bool) -> Result<()> {
    let n = check_triangular_operands(u, b.size())?;

    for row in (0..n).rev() {
        let mut sum = b.get(row);
        for j in row + 1..n {
            sum -= u.get(row, j) * b.get(j);
        }
        if !unit_diagonal {
            sum /= u.get(row, row);
        }
        b.set(row, sum);
    }

    Ok(())
}

fn check_triangular_operands(t: &DoubleGrid2d, rhs_rows: usize) -> Result<usize> {
    let n = t.rows();
    if t.cols() != n {
        return Err(Error::ShapeMismatch {
            left: vec![n, n],
            right: vec![t.rows(), t.cols()],
        });
    }
    if rhs_rows != n {
        return Err(Error::ShapeMismatch {
            left: vec![n],
            right: vec![rhs_rows],
        });
    }
    Ok(n)
}

/// Apply a pivot vector: `A[i,:] ↔ A[pivots[i],:]`, in sequence.
pub fn permute_rows(matrix: &mut DoubleGrid2d, pivots: &[usize]) -> Result<()> {
    if pivots.len() > matrix.rows() {
        return Err(Error::InvalidArgument(
            "pivot vector is longer than the matrix has rows",
        ));
    }

    for (i, &p) in pivots.iter().enumerate() {
        if p >= matrix.rows() {
            return Err(Error::InvalidArgument("pivot index out of range"));
        }
        if p != i {
            let mut a = matrix.row_view(i)?;
            let mut b = matrix.row_view(p)?;
            a.swap(&mut b)?;
        }
    }

    Ok(())
}

impl Grid2d<f64> {
    /// `C ← α·A·B + β·C` with per-operand transpose flags.
    ///
    /// Transposition is applied as an O(1) view transform, never a copy.
    /// When no target is passed a fresh matrix of the right shape is
    /// allocated (and `β` only scales its zeros).
    pub fn mult(
        &self,
        b: &Self,
        c: Option<Self>,
        alpha: f64,
        beta: f64,
        transpose_a: bool,
        transpose_b: bool,
    ) -> Result<Self> {
        let a = if transpose_a {
            self.transposed()
        } else {
            self.clone()
        };
        let b = if transpose_b { b.transposed() } else { b.clone() };

        let mut c = match c {
            Some(c) => c,
            None => Self::dense(Extent2d::new(a.rows(), b.cols())?),
        };
        gemm(alpha, &a, &b, beta, &mut c)?;
        Ok(c)
    }

    /// `y ← α·A·x + β·y`, the matrix-vector analogue of
    /// [`mult`](Self::mult).
    pub fn mult_vec(
        &self,
        x: &DoubleGrid1d,
        y: Option<DoubleGrid1d>,
        alpha: f64,
        beta: f64,
        transpose_a: bool,
    ) -> Result<DoubleGrid1d> {
        let a = if transpose_a {
            self.transposed()
        } else {
            self.clone()
        };

        let mut y = match y {
            Some(y) => y,
            None => DoubleGrid1d::dense(Extent1d::new(a.rows())?),
        };
        gemv(alpha, &a, x, beta, &mut y)?;
        Ok(y)
    }
}
