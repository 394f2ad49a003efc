//! Factorization and kernel correctness at the public surface.

use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use lattix::{
    algebra, gemm, permute_rows, CholeskyDecomposition, DoubleGrid2d, EigenDecomposition,
    Extent2d, LuDecomposition, NumericalContext, QrDecomposition, SingularValueDecomposition,
};

fn matrix(rows: usize, cols: usize, values: &[f64]) -> DoubleGrid2d {
    DoubleGrid2d::from_row_major(Extent2d::new(rows, cols).unwrap(), values.to_vec()).unwrap()
}

fn random_matrix(rows: usize, cols: usize, seed: u64) -> DoubleGrid2d {
    let mut rng = StdRng::seed_from_u64(seed);
    DoubleGrid2d::from_fn(Extent2d::new(rows, cols).unwrap(), |_, _| {
        rng.gen::<f64>() * 2.0 - 1.0
    })
}

/// A random symmetric positive-definite matrix: `AᵀA + n·I`.
fn random_spd(n: usize, seed: u64) -> DoubleGrid2d {
    let a = random_matrix(n, n, seed);
    let mut gram = a.mult(&a, None, 1.0, 0.0, true, false).unwrap();
    for i in 0..n {
        gram.set(i, i, gram.get(i, i) + n as f64);
    }
    gram
}

fn tolerance() -> NumericalContext {
    NumericalContext::new(1e-8)
}

#[test]
fn cholesky_of_the_classic_spd_matrix() {
    let a = matrix(
        3,
        3,
        &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0],
    );
    let chol = CholeskyDecomposition::decompose(&a).unwrap();

    let expected_l = matrix(3, 3, &[2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
    assert!(chol.l().equals_with(&expected_l, &NumericalContext::new(1e-12)));

    let x = chol.solve(&matrix(3, 1, &[1.0, 2.0, 3.0])).unwrap();
    assert_relative_eq!(x.get(0, 0), 343.0 / 12.0, epsilon = 1e-10);
    assert_relative_eq!(x.get(1, 0), -23.0 / 3.0, epsilon = 1e-10);
    assert_relative_eq!(x.get(2, 0), 4.0 / 3.0, epsilon = 1e-10);
}

#[test]
fn gemm_scenarios() {
    let a = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let b = matrix(2, 2, &[5.0, 6.0, 7.0, 8.0]);

    let c = a.mult(&b, None, 1.0, 0.0, false, false).unwrap();
    assert_eq!(c.to_row_major(), vec![19.0, 22.0, 43.0, 50.0]);

    let prefilled = matrix(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let c = a.mult(&b, Some(prefilled), 1.0, 0.5, false, false).unwrap();
    assert_eq!(c.to_row_major(), vec![19.5, 22.5, 43.5, 50.5]);
}

#[test]
fn transpose_then_multiply_yields_symmetric_gram_matrix() {
    let a = random_matrix(3, 4, 7);

    let gram = a.mult(&a, None, 1.0, 0.0, true, false).unwrap();
    assert_eq!((gram.rows(), gram.cols()), (4, 4));

    let explicit = a
        .transposed()
        .mult(&a, None, 1.0, 0.0, false, false)
        .unwrap();
    assert!(gram.equals_with(&explicit, &NumericalContext::EXACT));
    assert!(gram.equals_with(&gram.transposed(), &NumericalContext::new(1e-12)));
}

#[test]
fn svd_of_rank_one_matrix() {
    let a = matrix(2, 2, &[1.0, 2.0, 2.0, 4.0]);
    let svd = SingularValueDecomposition::decompose(&a).unwrap();

    assert_eq!(svd.rank(), 1);
    assert_relative_eq!(svd.singular_values()[0], 5.0, epsilon = 1e-10);
    assert_relative_eq!(svd.singular_values()[1], 0.0, epsilon = 1e-10);
}

#[test]
fn eigen_of_rotation_matrix_is_a_conjugate_pair() {
    let a = matrix(2, 2, &[0.0, 1.0, -1.0, 0.0]);
    let eig = EigenDecomposition::decompose(&a).unwrap();

    assert_eq!(eig.real_eigenvalues(), &[0.0, 0.0]);
    assert_relative_eq!(eig.imag_eigenvalues()[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(eig.imag_eigenvalues()[1], -1.0, epsilon = 1e-12);
}

#[test]
fn lu_reconstruction_on_random_matrices() {
    for seed in 0..5 {
        let a = random_matrix(6, 6, seed);
        let lu = LuDecomposition::decompose(&a);

        let mut pa = a.copy();
        permute_rows(&mut pa, lu.piv()).unwrap();

        let reconstructed = lu.l().mult(&lu.u(), None, 1.0, 0.0, false, false).unwrap();
        assert!(reconstructed.equals_with(&pa, &tolerance()));

        let b = random_matrix(6, 2, seed ^ 0xBEEF);
        let x = lu.solve(&b).unwrap();
        let residual = a.mult(&x, None, 1.0, 0.0, false, false).unwrap();
        assert!(residual.equals_with(&b, &tolerance()));
    }
}

#[test]
fn qr_reconstruction_on_random_matrices() {
    for seed in 0..5 {
        let a = random_matrix(7, 4, seed ^ 0xABCD);
        let qr = QrDecomposition::decompose(&a).unwrap();

        let reconstructed = qr.q().mult(&qr.r(), None, 1.0, 0.0, false, false).unwrap();
        assert!(reconstructed.equals_with(&a, &tolerance()));

        let q = qr.q();
        let gram = q.mult(&q, None, 1.0, 0.0, true, false).unwrap();
        assert!(gram.equals_with(&DoubleGrid2d::identity(4).unwrap(), &tolerance()));
    }
}

#[test]
fn svd_reconstruction_on_random_matrices() {
    for &(rows, cols) in &[(6, 4), (5, 5), (3, 6)] {
        let a = random_matrix(rows, cols, (rows * 31 + cols) as u64);
        let svd = SingularValueDecomposition::decompose(&a).unwrap();

        let k = rows.min(cols);
        let mut sigma = DoubleGrid2d::dense(Extent2d::new(k, k).unwrap());
        for (i, &value) in svd.singular_values().iter().enumerate() {
            sigma.set(i, i, value);
        }

        let us = svd.u().mult(&sigma, None, 1.0, 0.0, false, false).unwrap();
        let reconstructed = us.mult(&svd.v(), None, 1.0, 0.0, false, true).unwrap();
        assert!(reconstructed.equals_with(&a, &tolerance()));

        assert!(svd.singular_values().windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn symmetric_eigen_reconstruction_on_random_matrices() {
    for seed in 0..3 {
        let a = random_spd(5, seed ^ 0xD00D);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        assert!(eig.is_symmetric());

        let av = a.mult(&eig.v(), None, 1.0, 0.0, false, false).unwrap();
        let vd = eig.v().mult(&eig.d(), None, 1.0, 0.0, false, false).unwrap();
        assert!(av.equals_with(&vd, &tolerance()));
    }
}

#[test]
fn cholesky_solve_on_random_spd_systems() {
    for seed in 0..3 {
        let a = random_spd(6, seed ^ 0xC0FFEE);
        let chol = CholeskyDecomposition::decompose(&a).unwrap();
        assert!(chol.is_symmetric_positive_definite());

        let b = random_matrix(6, 3, seed);
        let x = chol.solve(&b).unwrap();
        let residual = a.mult(&x, None, 1.0, 0.0, false, false).unwrap();
        assert!(residual.equals_with(&b, &tolerance()));
    }
}

#[test]
fn inverse_of_inverse_round_trips() {
    let a = random_spd(4, 11);
    let inv = algebra::inverse(&a).unwrap();
    let back = algebra::inverse(&inv).unwrap();
    assert!(back.equals_with(&a, &tolerance()));
}

#[test]
fn algebra_facade_consistency() {
    let a = matrix(2, 2, &[3.0, 0.0, 0.0, -2.0]);

    assert_relative_eq!(algebra::det(&a).unwrap(), -6.0, epsilon = 1e-12);
    assert_relative_eq!(algebra::trace(&a), 1.0);
    assert_relative_eq!(algebra::norm1(&a), 3.0);
    assert_relative_eq!(algebra::norm_inf(&a), 3.0);
    assert_relative_eq!(algebra::norm2(&a).unwrap(), 3.0, epsilon = 1e-12);
    assert_relative_eq!(algebra::norm_frobenius(&a), 13.0f64.sqrt(), epsilon = 1e-12);
    assert_eq!(algebra::rank(&a).unwrap(), 2);
    assert_relative_eq!(algebra::cond(&a).unwrap(), 1.5, epsilon = 1e-12);
}

#[test]
fn gemm_kernel_accepts_strided_operands() {
    // Multiply through column-strided views of a larger matrix.
    let big = random_matrix(6, 6, 42);
    let a = big
        .stride_view(lattix::Stride2d::new(2, 2))
        .unwrap();
    let dense_a = a.copy();

    let b = random_matrix(3, 3, 43);
    let mut c = DoubleGrid2d::dense(Extent2d::new(3, 3).unwrap());
    gemm(1.0, &a, &b, 0.0, &mut c).unwrap();

    let expected = dense_a.mult(&b, None, 1.0, 0.0, false, false).unwrap();
    assert!(c.equals_with(&expected, &NumericalContext::new(1e-12)));
}

#[test]
fn one_by_one_factorizations() {
    let a = matrix(1, 1, &[9.0]);

    assert_relative_eq!(LuDecomposition::decompose(&a).det().unwrap(), 9.0);
    assert_relative_eq!(
        QrDecomposition::decompose(&a).unwrap().r().get(0, 0).abs(),
        9.0
    );
    assert_relative_eq!(
        CholeskyDecomposition::decompose(&a).unwrap().l().get(0, 0),
        3.0
    );
    assert_eq!(
        EigenDecomposition::decompose(&a).unwrap().real_eigenvalues(),
        &[9.0]
    );
    assert_relative_eq!(
        SingularValueDecomposition::decompose(&a)
            .unwrap()
            .singular_values()[0],
        9.0
    );
}
