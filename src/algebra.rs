//! Matrix algebra façade: solvers, inverse, determinant, rank, norms.
//!
//! Dispatches to a factorization by shape: square systems go through
//! LU, rectangular ones through QR least squares; `rank`, `cond` and
//! the spectral norm come from the SVD.

use crate::grid::DoubleGrid2d;
use crate::lu::LuDecomposition;
use crate::qr::QrDecomposition;
use crate::svd::SingularValueDecomposition;
use crate::Result;

/// Solve `A·X = B`: by LU when `A` is square, by QR least squares
/// otherwise.
pub fn solve(a: &DoubleGrid2d, b: &DoubleGrid2d) -> Result<DoubleGrid2d> {
    if a.rows() == a.cols() {
        LuDecomposition::decompose(a).solve(b)
    } else {
        QrDecomposition::decompose(a)?.solve(b)
    }
}

/// The inverse of a square matrix, or the pseudo-inverse of a tall
/// one: `solve(A, I)`.
pub fn inverse(a: &DoubleGrid2d) -> Result<DoubleGrid2d> {
    solve(a, &DoubleGrid2d::identity(a.rows())?)
}

/// The determinant, via LU.
pub fn det(a: &DoubleGrid2d) -> Result<f64> {
    LuDecomposition::decompose(a).det()
}

/// The effective rank, via SVD.
pub fn rank(a: &DoubleGrid2d) -> Result<usize> {
    Ok(SingularValueDecomposition::decompose(a)?.rank())
}

/// The two-norm condition number `σ_max / σ_min`, via SVD.
pub fn cond(a: &DoubleGrid2d) -> Result<f64> {
    Ok(SingularValueDecomposition::decompose(a)?.cond())
}

/// The spectral norm: the largest singular value.
pub fn norm2(a: &DoubleGrid2d) -> Result<f64> {
    Ok(SingularValueDecomposition::decompose(a)?.norm2())
}

/// The maximum absolute column sum.
pub fn norm1(a: &DoubleGrid2d) -> f64 {
    let mut max = 0.0f64;
    for col in 0..a.cols() {
        let mut sum = 0.0;
        for row in 0..a.rows() {
            sum += a.get(row, col).abs();
        }
        max = max.max(sum);
    }
    max
}

/// The maximum absolute row sum.
pub fn norm_inf(a: &DoubleGrid2d) -> f64 {
    let mut max = 0.0f64;
    for row in 0..a.rows() {
        let mut sum = 0.0;
        for col in 0..a.cols() {
            sum += a.get(row, col).abs();
        }
        max = max.max(sum);
    }
    max
}

/// The Frobenius norm, accumulated with hypot so the squares cannot
/// overflow.
pub fn norm_frobenius(a: &DoubleGrid2d) -> f64 {
    let mut norm = 0.0f64;
    for row in 0..a.rows() {
        for col in 0..a.cols() {
            norm = norm.hypot(a.get(row, col));
        }
    }
    norm
}

/// The sum of the diagonal, up to `min(rows, cols)`.
pub fn trace(a: &DoubleGrid2d) -> f64 {
    let mut sum = 0.0;
    for i in 0..a.rows().min(a.cols()) {
        sum += a.get(i, i);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NumericalContext;
    use crate::extent::Extent2d;
    use approx::assert_relative_eq;

    fn matrix(rows: usize, cols: usize, values: &[f64]) -> DoubleGrid2d {
        DoubleGrid2d::from_row_major(Extent2d::new(rows, cols).unwrap(), values.to_vec()).unwrap()
    }

    fn tolerance() -> NumericalContext {
        NumericalContext::new(1e-9)
    }

    #[test]
    fn solve_dispatches_on_shape() {
        let square = matrix(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let b = matrix(2, 1, &[2.0, 8.0]);
        let x = solve(&square, &b).unwrap();
        assert_relative_eq!(x.get(0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(x.get(1, 0), 2.0, epsilon = 1e-12);

        let tall = matrix(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let b = matrix(3, 1, &[1.0, 1.0, 2.0]);
        let x = solve(&tall, &b).unwrap();
        assert_relative_eq!(x.get(0, 0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(x.get(1, 0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn inverse_round_trips() {
        let a = matrix(3, 3, &[2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let inv = inverse(&a).unwrap();

        let product = a.mult(&inv, None, 1.0, 0.0, false, false).unwrap();
        assert!(product.equals_with(&DoubleGrid2d::identity(3).unwrap(), &tolerance()));

        let back = inverse(&inv).unwrap();
        assert!(back.equals_with(&a, &tolerance()));
    }

    #[test]
    fn determinant() {
        let a = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(det(&a).unwrap(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn rank_and_cond() {
        let singular = matrix(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(rank(&singular).unwrap(), 1);

        let diagonal = matrix(2, 2, &[4.0, 0.0, 0.0, 2.0]);
        assert_eq!(rank(&diagonal).unwrap(), 2);
        assert_relative_eq!(cond(&diagonal).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(norm2(&diagonal).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn norms_of_a_fixed_matrix() {
        let a = matrix(2, 2, &[1.0, -2.0, 3.0, 4.0]);

        assert_relative_eq!(norm1(&a), 6.0);
        assert_relative_eq!(norm_inf(&a), 7.0);
        assert_relative_eq!(norm_frobenius(&a), 30.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn trace_of_rectangular_matrix() {
        let a = matrix(2, 3, &[1.0, 9.0, 9.0, 9.0, 2.0, 9.0]);
        assert_relative_eq!(trace(&a), 3.0);
    }
}
