//! Singular value decomposition `A = U·Σ·Vᵀ`.
//!
//! The matrix is reduced to bidiagonal form by alternating left and
//! right Householder reflections, then the superdiagonal is driven to
//! zero by implicit-shift QR sweeps with deflation. Singular values come
//! out non-negative in descending order; the columns of `U` and `V` are
//! adjusted along with every transformation.
//!
//! Wide matrices are decomposed through their transpose with the
//! factors swapped, so any shape is accepted.

use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::{Error, Result};

const EPS: f64 = f64::EPSILON;
const TINY: f64 = 1.0e-291;

/// Iteration cap for the implicit-shift sweeps, as a multiple of the
/// dimension.
const MAX_SWEEPS_PER_DIM: usize = 30;

/// The result of a singular value decomposition.
#[derive(Debug, Clone)]
pub struct SingularValueDecomposition {
    u: Vec<f64>,
    v: Vec<f64>,
    s: Vec<f64>,
    rows: usize,
    cols: usize,
    transposed: bool,
}

impl SingularValueDecomposition {
    /// Decompose an `m×n` matrix of any shape.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self> {
        let (rows, cols) = (a.rows(), a.cols());
        let transposed = rows < cols;

        let (work, m, n) = if transposed {
            (a.transposed().to_row_major(), cols, rows)
        } else {
            (a.to_row_major(), rows, cols)
        };

        let (u, v, s) = golub_kahan(work, m, n)?;
        Ok(Self {
            u,
            v,
            s,
            rows,
            cols,
            transposed,
        })
    }

    /// The singular values, non-negative and descending. There are
    /// `min(m, n)` of them.
    pub fn singular_values(&self) -> &[f64] {
        &self.s
    }

    /// The left singular vectors, `m × min(m, n)`.
    pub fn u(&self) -> DoubleGrid2d {
        let k = self.rows.min(self.cols);
        if self.transposed {
            // A = (Aᵀ)ᵀ = V'·Σ·U'ᵀ, so the internal V holds U.
            from_flat(&self.v, self.rows, k)
        } else {
            from_flat(&self.u, self.rows, k)
        }
    }

    /// The right singular vectors, `n × min(m, n)`.
    pub fn v(&self) -> DoubleGrid2d {
        let k = self.rows.min(self.cols);
        if self.transposed {
            from_flat(&self.u, self.cols, k)
        } else {
            from_flat(&self.v, self.cols, k)
        }
    }

    /// The spectral norm: the largest singular value.
    pub fn norm2(&self) -> f64 {
        self.s.first().copied().unwrap_or(0.0)
    }

    /// The ratio of the largest to the smallest singular value.
    pub fn cond(&self) -> f64 {
        match (self.s.first(), self.s.last()) {
            (Some(&max), Some(&min)) => max / min,
            _ => 0.0,
        }
    }

    /// The effective rank under the default tolerance
    /// `max(m, n)·σ_max·ε`.
    pub fn rank(&self) -> usize {
        let tolerance = self.rows.max(self.cols) as f64 * self.norm2() * EPS;
        self.rank_with_tolerance(tolerance)
    }

    /// The number of singular values above `tolerance`.
    pub fn rank_with_tolerance(&self, tolerance: f64) -> usize {
        self.s.iter().filter(|&&sigma| sigma > tolerance).count()
    }
}

fn from_flat(values: &[f64], rows: usize, cols: usize) -> DoubleGrid2d {
    DoubleGrid2d::from_fn(Extent2d::derived(rows, cols, 1), |row, col| {
        values[row * cols + col]
    })
}

/// Bidiagonalization and implicit-shift QR on an `m×n` buffer with
/// `m ≥ n`. Returns `(U, V, s)` with `U` of shape `m×n`, `V` of shape
/// `n×n` and `s` holding the `n` singular values.
#[allow(clippy::too_many_lines)]
fn golub_kahan(mut a: Vec<f64>, m: usize, n: usize) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let nu = n;
    let mut s = vec![0.0; n.min(m + 1)];
    let mut u = vec![0.0; m * nu];
    let mut v = vec![0.0; n * n];
    let mut e = vec![0.0; n];
    let mut work = vec![0.0; m];

    if n == 0 {
        return Ok((u, v, s));
    }

    // Reduce to bidiagonal form, storing the diagonal in s and the
    // superdiagonal in e.
    let nct = (m - 1).min(n);
    let nrt = n.saturating_sub(2).min(m);
    for k in 0..nct.max(nrt) {
        if k < nct {
            // Left Householder reflector for column k; the diagonal
            // lands in s[k].
            s[k] = 0.0;
            for i in k..m {
                s[k] = s[k].hypot(a[i * n + k]);
            }
            if s[k] != 0.0 {
                if a[k * n + k] < 0.0 {
                    s[k] = -s[k];
                }
                for i in k..m {
                    a[i * n + k] /= s[k];
                }
                a[k * n + k] += 1.0;
            }
            s[k] = -s[k];
        }

        for j in k + 1..n {
            if k < nct && s[k] != 0.0 {
                let mut t = 0.0;
                for i in k..m {
                    t += a[i * n + k] * a[i * n + j];
                }
                t = -t / a[k * n + k];
                for i in k..m {
                    a[i * n + j] += t * a[i * n + k];
                }
            }
            e[j] = a[k * n + j];
        }

        if k < nct {
            for i in k..m {
                u[i * nu + k] = a[i * n + k];
            }
        }

        if k < nrt {
            // Right Householder reflector for row k; the superdiagonal
            // lands in e[k].
            e[k] = 0.0;
            for i in k + 1..n {
                e[k] = e[k].hypot(e[i]);
            }
            if e[k] != 0.0 {
                if e[k + 1] < 0.0 {
                    e[k] = -e[k];
                }
                for i in k + 1..n {
                    e[i] /= e[k];
                }
                e[k + 1] += 1.0;
            }
            e[k] = -e[k];

            if k + 1 < m && e[k] != 0.0 {
                for item in work.iter_mut().take(m).skip(k + 1) {
                    *item = 0.0;
                }
                for j in k + 1..n {
                    for i in k + 1..m {
                        work[i] += e[j] * a[i * n + j];
                    }
                }
                for j in k + 1..n {
                    let t = -e[j] / e[k + 1];
                    for i in k + 1..m {
                        a[i * n + j] += t * work[i];
                    }
                }
            }

            for i in k + 1..n {
                v[i * n + k] = e[i];
            }
        }
    }

    // Set up the final bidiagonal matrix of order p.
    let p = n.min(m + 1);
    if nct < n {
        s[nct] = a[nct * n + nct];
    }
    if m < p {
        s[p - 1] = 0.0;
    }
    if nrt + 1 < p {
        e[nrt] = a[nrt * n + p - 1];
    }
    e[p - 1] = 0.0;

    // Generate U.
    for j in nct..nu {
        for i in 0..m {
            u[i * nu + j] = 0.0;
        }
        u[j * nu + j] = 1.0;
    }
    for k in (0..nct).rev() {
        if s[k] != 0.0 {
            for j in k + 1..nu {
                let mut t = 0.0;
                for i in k..m {
                    t += u[i * nu + k] * u[i * nu + j];
                }
                t = -t / u[k * nu + k];
                for i in k..m {
                    u[i * nu + j] += t * u[i * nu + k];
                }
            }
            for i in k..m {
                u[i * nu + k] = -u[i * nu + k];
            }
            u[k * nu + k] += 1.0;
            for i in 0..k.saturating_sub(1) {
                u[i * nu + k] = 0.0;
            }
        } else {
            for i in 0..m {
                u[i * nu + k] = 0.0;
            }
            u[k * nu + k] = 1.0;
        }
    }

    // Generate V.
    for k in (0..n).rev() {
        if k < nrt && e[k] != 0.0 {
            for j in k + 1..nu {
                let mut t = 0.0;
                for i in k + 1..n {
                    t += v[i * n + k] * v[i * n + j];
                }
                t = -t / v[(k + 1) * n + k];
                for i in k + 1..n {
                    v[i * n + j] += t * v[i * n + k];
                }
            }
        }
        for i in 0..n {
            v[i * n + k] = 0.0;
        }
        v[k * n + k] = 1.0;
    }

    // Main iteration over the bidiagonal matrix.
    let pp_full = p - 1;
    let max_iterations = MAX_SWEEPS_PER_DIM * n;
    let mut iterations = 0usize;
    let mut p = p;

    while p > 0 {
        // Find the deflation point: kase 1 when s[p-1] is negligible,
        // kase 2 when some s[k] splits the matrix, kase 3 for a QR
        // step, kase 4 on convergence of s[p-1].
        let mut k: isize = -1;
        for kk in (0..p as isize - 1).rev() {
            let kku = kk as usize;
            if e[kku].abs() <= TINY + EPS * (s[kku].abs() + s[kku + 1].abs()) {
                e[kku] = 0.0;
                k = kk;
                break;
            }
        }

        let kase;
        if k == p as isize - 2 {
            kase = 4;
        } else {
            let mut ks = p as isize - 1;
            while ks > k {
                let ksu = ks as usize;
                let t = if ksu != p { e[ksu].abs() } else { 0.0 }
                    + if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 };
                if s[ksu].abs() <= TINY + EPS * t {
                    s[ksu] = 0.0;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                kase = 3;
            } else if ks == p as isize - 1 {
                kase = 1;
            } else {
                kase = 2;
                k = ks;
            }
        }
        let k = (k + 1) as usize;

        match kase {
            // Deflate negligible s[p-1].
            1 => {
                let mut f = e[p - 2];
                e[p - 2] = 0.0;
                for j in (k..p - 1).rev() {
                    let mut t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] *= cs;
                    }
                    for i in 0..n {
                        t = cs * v[i * n + j] + sn * v[i * n + p - 1];
                        v[i * n + p - 1] = -sn * v[i * n + j] + cs * v[i * n + p - 1];
                        v[i * n + j] = t;
                    }
                }
            }

            // Split at negligible s[k-1].
            2 => {
                let mut f = e[k - 1];
                e[k - 1] = 0.0;
                for j in k..p {
                    let mut t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] *= cs;
                    for i in 0..m {
                        t = cs * u[i * nu + j] + sn * u[i * nu + k - 1];
                        u[i * nu + k - 1] = -sn * u[i * nu + j] + cs * u[i * nu + k - 1];
                        u[i * nu + j] = t;
                    }
                }
            }

            // One implicit-shift QR step.
            3 => {
                iterations += 1;
                if iterations > max_iterations {
                    return Err(Error::NoConvergence {
                        iterations: max_iterations,
                    });
                }

                // Wilkinson shift from the trailing 2×2.
                let scale = s[p - 1]
                    .abs()
                    .max(s[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(s[k].abs())
                    .max(e[k].abs());
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                // Chase the bulge down the bidiagonal.
                for j in k..p - 1 {
                    let mut t = f.hypot(g);
                    let mut cs = f / t;
                    let mut sn = g / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    g = sn * s[j + 1];
                    s[j + 1] *= cs;
                    for i in 0..n {
                        t = cs * v[i * n + j] + sn * v[i * n + j + 1];
                        v[i * n + j + 1] = -sn * v[i * n + j] + cs * v[i * n + j + 1];
                        v[i * n + j] = t;
                    }

                    t = f.hypot(g);
                    cs = f / t;
                    sn = g / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    g = sn * e[j + 1];
                    e[j + 1] *= cs;
                    if j < m - 1 {
                        for i in 0..m {
                            t = cs * u[i * nu + j] + sn * u[i * nu + j + 1];
                            u[i * nu + j + 1] = -sn * u[i * nu + j] + cs * u[i * nu + j + 1];
                            u[i * nu + j] = t;
                        }
                    }
                }
                e[p - 2] = f;
            }

            // Convergence: make the value non-negative, then bubble it
            // into descending position.
            _ => {
                let mut k = k;
                if s[k] <= 0.0 {
                    s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                    for i in 0..=pp_full {
                        v[i * n + k] = -v[i * n + k];
                    }
                }
                while k < pp_full {
                    if s[k] >= s[k + 1] {
                        break;
                    }
                    s.swap(k, k + 1);
                    if k < n - 1 {
                        for i in 0..n {
                            v.swap(i * n + k, i * n + k + 1);
                        }
                    }
                    if k < m - 1 {
                        for i in 0..m {
                            u.swap(i * nu + k, i * nu + k + 1);
                        }
                    }
                    k += 1;
                }
                p -= 1;
            }
        }
    }

    s.truncate(n.min(m));
    Ok((u, v, s))
}
