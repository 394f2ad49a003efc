//! Eigendecomposition of dense double matrices.
//!
//! Symmetric inputs (under the active numerical context) go through
//! Householder tridiagonalization followed by symmetric QL iteration
//! with implicit shifts, yielding real eigenvalues in ascending order
//! and an orthogonal eigenvector matrix.
//!
//! General inputs are reduced to upper Hessenberg form and driven to
//! quasi-triangular form by double-shift QR iteration. Complex
//! conjugate pairs show up as 2×2 blocks: the real parts in `D`, the
//! imaginary parts in `E`, and `V` satisfying `A·V = V·D` with the
//! blocks encoding the complex eigenvectors.

use num_complex::Complex64;

use crate::context::NumericalContext;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::{Error, Result};

const EPS: f64 = f64::EPSILON;

/// Iteration cap for the QL/QR sweeps, as a multiple of the dimension.
const MAX_SWEEPS_PER_DIM: usize = 30;

/// The result of an eigendecomposition `A·V = V·D`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    n: usize,
    symmetric: bool,
    d: Vec<f64>,
    e: Vec<f64>,
    v: Vec<f64>,
}

impl EigenDecomposition {
    /// Decompose under the process-wide numerical context.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self> {
        Self::decompose_with(a, &NumericalContext::get())
    }

    /// Decompose a square matrix, dispatching on symmetry under the
    /// given context.
    pub fn decompose_with(a: &DoubleGrid2d, context: &NumericalContext) -> Result<Self> {
        let n = a.rows();
        if a.cols() != n {
            return Err(Error::InvalidArgument(
                "eigendecomposition requires a square matrix",
            ));
        }

        let symmetric =
            (0..n).all(|i| (i + 1..n).all(|j| context.equals(a.get(i, j), a.get(j, i))));

        let mut d = vec![0.0; n];
        let mut e = vec![0.0; n];

        if symmetric {
            let mut v = a.to_row_major();
            tred2(&mut v, &mut d, &mut e, n);
            tql2(&mut v, &mut d, &mut e, n)?;
            Ok(Self {
                n,
                symmetric,
                d,
                e,
                v,
            })
        } else {
            let mut h = a.to_row_major();
            let mut v = vec![0.0; n * n];
            let mut ort = vec![0.0; n];
            orthes(&mut h, &mut v, &mut ort, n);
            hqr2(&mut h, &mut v, &mut d, &mut e, n)?;
            Ok(Self {
                n,
                symmetric,
                d,
                e,
                v,
            })
        }
    }

    /// Whether the symmetric path was taken.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Real parts of the eigenvalues.
    pub fn real_eigenvalues(&self) -> &[f64] {
        &self.d
    }

    /// Imaginary parts of the eigenvalues; all zero for symmetric
    /// inputs.
    pub fn imag_eigenvalues(&self) -> &[f64] {
        &self.e
    }

    /// The eigenvalues as complex numbers.
    pub fn eigenvalues(&self) -> Vec<Complex64> {
        self.d
            .iter()
            .zip(&self.e)
            .map(|(&re, &im)| Complex64::new(re, im))
            .collect()
    }

    /// The eigenvector matrix `V`.
    pub fn v(&self) -> DoubleGrid2d {
        let n = self.n;
        DoubleGrid2d::from_fn(Extent2d::derived(n, n, 1), |row, col| self.v[row * n + col])
    }

    /// The block-diagonal eigenvalue matrix `D`: eigenvalues on the
    /// diagonal, complex pairs as 2×2 blocks with `±e` off it.
    pub fn d(&self) -> DoubleGrid2d {
        let n = self.n;
        let mut block = DoubleGrid2d::dense(Extent2d::derived(n, n, 1));
        for i in 0..n {
            block.set(i, i, self.d[i]);
            if self.e[i] > 0.0 {
                block.set(i, i + 1, self.e[i]);
            } else if self.e[i] < 0.0 {
                block.set(i, i - 1, self.e[i]);
            }
        }
        block
    }
}

// ============================================================================
// Symmetric path
// ============================================================================

/// Householder reduction to symmetric tridiagonal form. On return `d`
/// holds the diagonal, `e` the subdiagonal, and `v` the accumulated
/// orthogonal transform.
fn tred2(v: &mut [f64], d: &mut [f64], e: &mut [f64], n: usize) {
    if n == 0 {
        return;
    }

    d.copy_from_slice(&v[(n - 1) * n..]);

    for i in (1..n).rev() {
        // Scale to avoid under/overflow.
        let mut scale = 0.0;
        let mut h = 0.0;
        for item in d.iter().take(i) {
            scale += item.abs();
        }

        if scale == 0.0 {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = 0.0;
                v[j * n + i] = 0.0;
            }
        } else {
            // Generate the Householder vector.
            for item in d.iter_mut().take(i) {
                *item /= scale;
                h += *item * *item;
            }
            let f = d[i - 1];
            let mut g = h.sqrt();
            if f > 0.0 {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            for item in e.iter_mut().take(i) {
                *item = 0.0;
            }

            // Apply the similarity transformation to the remaining
            // columns.
            for j in 0..i {
                let f = d[j];
                v[j * n + i] = f;
                let mut g = e[j] + v[j * n + j] * f;
                for k in j + 1..i {
                    g += v[k * n + j] * d[k];
                    e[k] += v[k * n + j] * f;
                }
                e[j] = g;
            }
            let mut f = 0.0;
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                let f = d[j];
                let g = e[j];
                for k in j..i {
                    v[k * n + j] -= f * e[k] + g * d[k];
                }
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = 0.0;
            }
        }
        d[i] = h;
    }

    // Accumulate the transformations.
    for i in 0..n - 1 {
        v[(n - 1) * n + i] = v[i * n + i];
        v[i * n + i] = 1.0;
        let h = d[i + 1];
        if h != 0.0 {
            for k in 0..=i {
                d[k] = v[k * n + i + 1] / h;
            }
            for j in 0..=i {
                let mut g = 0.0;
                for k in 0..=i {
                    g += v[k * n + i + 1] * v[k * n + j];
                }
                for k in 0..=i {
                    v[k * n + j] -= g * d[k];
                }
            }
        }
        for k in 0..=i {
            v[k * n + i + 1] = 0.0;
        }
    }
    for j in 0..n {
        d[j] = v[(n - 1) * n + j];
        v[(n - 1) * n + j] = 0.0;
    }
    v[(n - 1) * n + n - 1] = 1.0;
    e[0] = 0.0;
}

/// Symmetric tridiagonal QL iteration with implicit shifts. Leaves the
/// eigenvalues in `d` ascending and the eigenvectors in `v`.
fn tql2(v: &mut [f64], d: &mut [f64], e: &mut [f64], n: usize) -> Result<()> {
    if n == 0 {
        return Ok(());
    }

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = 0.0;

    let max_iterations = MAX_SWEEPS_PER_DIM * n;
    let mut iterations = 0;
    let mut f: f64 = 0.0;
    let mut tst1: f64 = 0.0;

    for l in 0..n {
        tst1 = tst1.max(d[l].abs() + e[l].abs());

        let mut m = l;
        while m < n {
            if e[m].abs() <= EPS * tst1 {
                break;
            }
            m += 1;
        }

        if m > l {
            loop {
                iterations += 1;
                if iterations > max_iterations {
                    return Err(Error::NoConvergence {
                        iterations: max_iterations,
                    });
                }

                // Implicit shift from the leading 2×2.
                let g = d[l];
                let mut p = (d[l + 1] - g) / (2.0 * e[l]);
                let mut r = p.hypot(1.0);
                if p < 0.0 {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for item in d.iter_mut().take(n).skip(l + 2) {
                    *item -= h;
                }
                f += h;

                // QL sweep.
                p = d[m];
                let mut c = 1.0;
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = 0.0;
                let mut s2 = 0.0;
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    let g = c * e[i];
                    h = c * p;
                    r = p.hypot(e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);

                    for k in 0..n {
                        let h = v[k * n + i + 1];
                        v[k * n + i + 1] = s * v[k * n + i] + c * h;
                        v[k * n + i] = c * v[k * n + i] - s * h;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if e[l].abs() <= EPS * tst1 {
                    break;
                }
            }
        }
        d[l] += f;
        e[l] = 0.0;
    }

    // Sort eigenvalues ascending, carrying the vectors along.
    for i in 0..n.saturating_sub(1) {
        let mut k = i;
        let mut p = d[i];
        for j in i + 1..n {
            if d[j] < p {
                k = j;
                p = d[j];
            }
        }
        if k != i {
            d[k] = d[i];
            d[i] = p;
            for j in 0..n {
                v.swap(j * n + i, j * n + k);
            }
        }
    }

    Ok(())
}

// ============================================================================
// General path
// ============================================================================

/// Householder reduction of a general matrix to upper Hessenberg form,
/// accumulating the orthogonal transform into `v`.
fn orthes(h: &mut [f64], v: &mut [f64], ort: &mut [f64], n: usize) {
    if n == 0 {
        return;
    }
    let high = n - 1;

    for m in 1..high {
        let mut scale = 0.0;
        for i in m..=high {
            scale += h[i * n + m - 1].abs();
        }

        if scale != 0.0 {
            // Compute the Householder transformation.
            let mut sum = 0.0;
            for i in (m..=high).rev() {
                ort[i] = h[i * n + m - 1] / scale;
                sum += ort[i] * ort[i];
            }
            let mut g = sum.sqrt();
            if ort[m] > 0.0 {
                g = -g;
            }
            sum -= ort[m] * g;
            ort[m] -= g;

            // Apply it on the left and right.
            for j in m..n {
                let mut f = 0.0;
                for i in (m..=high).rev() {
                    f += ort[i] * h[i * n + j];
                }
                f /= sum;
                for i in m..=high {
                    h[i * n + j] -= f * ort[i];
                }
            }
            for i in 0..=high {
                let mut f = 0.0;
                for j in (m..=high).rev() {
                    f += ort[j] * h[i * n + j];
                }
                f /= sum;
                for j in m..=high {
                    h[i * n + j] -= f * ort[j];
                }
            }

            ort[m] *= scale;
            h[m * n + m - 1] = scale * g;
        }
    }

    // Accumulate the transformations.
    for i in 0..n {
        for j in 0..n {
            v[i * n + j] = if i == j { 1.0 } else { 0.0 };
        }
    }
    for m in (1..high).rev() {
        if h[m * n + m - 1] != 0.0 {
            for i in m + 1..=high {
                ort[i] = h[i * n + m - 1];
            }
            for j in m..=high {
                let mut g = 0.0;
                for i in m..=high {
                    g += ort[i] * v[i * n + j];
                }
                g = (g / ort[m]) / h[m * n + m - 1];
                for i in m..=high {
                    v[i * n + j] += g * ort[i];
                }
            }
        }
    }
}

/// Complex scalar division `(xr + i·xi) / (yr + i·yi)` without
/// intermediate overflow.
fn cdiv(xr: f64, xi: f64, yr: f64, yi: f64) -> (f64, f64) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Double-shift QR iteration on an upper Hessenberg matrix, followed by
/// backsubstitution for the eigenvectors of the original matrix.
#[allow(clippy::too_many_lines)]
fn hqr2(h: &mut [f64], v: &mut [f64], d: &mut [f64], e: &mut [f64], nn: usize) -> Result<()> {
    if nn == 0 {
        return Ok(());
    }

    let low = 0usize;
    let high = nn - 1;
    let max_iterations = MAX_SWEEPS_PER_DIM * nn;
    let mut total_iterations = 0usize;

    let n = nn; // row stride of the flat buffers

    let mut exshift = 0.0;
    let mut p = 0.0;
    let mut q = 0.0;
    let mut r = 0.0;
    let mut s = 0.0;
    let mut z = 0.0;
    let mut w = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;

    // Matrix norm over the Hessenberg band.
    let mut norm = 0.0;
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += h[i * n + j].abs();
        }
    }

    let mut en = high as isize;
    let mut iter = 0usize;
    while en >= low as isize {
        let enu = en as usize;

        // Look for a single small subdiagonal element.
        let mut l = enu;
        while l > low {
            s = h[(l - 1) * n + l - 1].abs() + h[l * n + l].abs();
            if s == 0.0 {
                s = norm;
            }
            if h[l * n + l - 1].abs() < EPS * s {
                break;
            }
            l -= 1;
        }

        if l == enu {
            // One root found.
            h[enu * n + enu] += exshift;
            d[enu] = h[enu * n + enu];
            e[enu] = 0.0;
            en -= 1;
            iter = 0;
        } else if l + 1 == enu {
            // Two roots found.
            w = h[enu * n + enu - 1] * h[(enu - 1) * n + enu];
            p = (h[(enu - 1) * n + enu - 1] - h[enu * n + enu]) / 2.0;
            q = p * p + w;
            z = q.abs().sqrt();
            h[enu * n + enu] += exshift;
            h[(enu - 1) * n + enu - 1] += exshift;
            x = h[enu * n + enu];

            if q >= 0.0 {
                // Real pair.
                z = if p >= 0.0 { p + z } else { p - z };
                d[enu - 1] = x + z;
                d[enu] = d[enu - 1];
                if z != 0.0 {
                    d[enu] = x - w / z;
                }
                e[enu - 1] = 0.0;
                e[enu] = 0.0;
                x = h[enu * n + enu - 1];
                s = x.abs() + z.abs();
                p = x / s;
                q = z / s;
                r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;

                for j in enu - 1..nn {
                    z = h[(enu - 1) * n + j];
                    h[(enu - 1) * n + j] = q * z + p * h[enu * n + j];
                    h[enu * n + j] = q * h[enu * n + j] - p * z;
                }
                for i in 0..=enu {
                    z = h[i * n + enu - 1];
                    h[i * n + enu - 1] = q * z + p * h[i * n + enu];
                    h[i * n + enu] = q * h[i * n + enu] - p * z;
                }
                for i in low..=high {
                    z = v[i * n + enu - 1];
                    v[i * n + enu - 1] = q * z + p * v[i * n + enu];
                    v[i * n + enu] = q * v[i * n + enu] - p * z;
                }
            } else {
                // Complex pair.
                d[enu - 1] = x + p;
                d[enu] = x + p;
                e[enu - 1] = z;
                e[enu] = -z;
            }
            en -= 2;
            iter = 0;
        } else {
            // No convergence yet: form a shift.
            x = h[enu * n + enu];
            y = 0.0;
            w = 0.0;
            if l < enu {
                y = h[(enu - 1) * n + enu - 1];
                w = h[enu * n + enu - 1] * h[(enu - 1) * n + enu];
            }

            // Exceptional shift after ten stalled sweeps.
            if iter == 10 {
                exshift += x;
                for i in low..=enu {
                    h[i * n + i] -= x;
                }
                s = h[enu * n + enu - 1].abs() + h[(enu - 1) * n + enu - 2].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }
            if iter == 30 {
                s = (y - x) / 2.0;
                s = s * s + w;
                if s > 0.0 {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / 2.0 + s);
                    for i in low..=enu {
                        h[i * n + i] -= s;
                    }
                    exshift += s;
                    x = 0.964;
                    y = 0.964;
                    w = 0.964;
                }
            }

            iter += 1;
            total_iterations += 1;
            if total_iterations > max_iterations {
                return Err(Error::NoConvergence {
                    iterations: max_iterations,
                });
            }

            // Look for two consecutive small subdiagonal elements.
            let mut m = enu - 2;
            loop {
                z = h[m * n + m];
                r = x - z;
                s = y - z;
                p = (r * s - w) / h[(m + 1) * n + m] + h[m * n + m + 1];
                q = h[(m + 1) * n + m + 1] - z - r - s;
                r = h[(m + 2) * n + m + 1];
                s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                if h[m * n + m - 1].abs() * (q.abs() + r.abs())
                    < EPS
                        * (p.abs()
                            * (h[(m - 1) * n + m - 1].abs()
                                + z.abs()
                                + h[(m + 1) * n + m + 1].abs()))
                {
                    break;
                }
                m -= 1;
            }

            for i in m + 2..=enu {
                h[i * n + i - 2] = 0.0;
                if i > m + 2 {
                    h[i * n + i - 3] = 0.0;
                }
            }

            // Double QR step on rows l..=en and columns m..=en.
            for k in m..enu {
                let notlast = k != enu - 1;
                if k != m {
                    p = h[k * n + k - 1];
                    q = h[(k + 1) * n + k - 1];
                    r = if notlast { h[(k + 2) * n + k - 1] } else { 0.0 };
                    x = p.abs() + q.abs() + r.abs();
                    if x == 0.0 {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }

                s = (p * p + q * q + r * r).sqrt();
                if p < 0.0 {
                    s = -s;
                }
                if s != 0.0 {
                    if k != m {
                        h[k * n + k - 1] = -s * x;
                    } else if l != m {
                        h[k * n + k - 1] = -h[k * n + k - 1];
                    }
                    p += s;
                    x = p / s;
                    y = q / s;
                    z = r / s;
                    q /= p;
                    r /= p;

                    // Row modification.
                    for j in k..nn {
                        p = h[k * n + j] + q * h[(k + 1) * n + j];
                        if notlast {
                            p += r * h[(k + 2) * n + j];
                            h[(k + 2) * n + j] -= p * z;
                        }
                        h[k * n + j] -= p * x;
                        h[(k + 1) * n + j] -= p * y;
                    }

                    // Column modification.
                    for i in 0..=enu.min(k + 3) {
                        p = x * h[i * n + k] + y * h[i * n + k + 1];
                        if notlast {
                            p += z * h[i * n + k + 2];
                            h[i * n + k + 2] -= p * r;
                        }
                        h[i * n + k] -= p;
                        h[i * n + k + 1] -= p * q;
                    }

                    // Accumulate transformations.
                    for i in low..=high {
                        p = x * v[i * n + k] + y * v[i * n + k + 1];
                        if notlast {
                            p += z * v[i * n + k + 2];
                            v[i * n + k + 2] -= p * r;
                        }
                        v[i * n + k] -= p;
                        v[i * n + k + 1] -= p * q;
                    }
                }
            }
        }
    }

    // Backsubstitute to find the vectors of the triangular form.
    if norm == 0.0 {
        return Ok(());
    }

    for en in (0..nn).rev() {
        p = d[en];
        q = e[en];

        if q == 0.0 {
            // Real vector.
            let mut l = en;
            h[en * n + en] = 1.0;
            for i in (0..en).rev() {
                w = h[i * n + i] - p;
                r = 0.0;
                for j in l..=en {
                    r += h[i * n + j] * h[j * n + en];
                }
                if e[i] < 0.0 {
                    z = w;
                    s = r;
                } else {
                    l = i;
                    if e[i] == 0.0 {
                        h[i * n + en] = if w != 0.0 { -r / w } else { -r / (EPS * norm) };
                    } else {
                        // Solve the 2×2 real block.
                        x = h[i * n + i + 1];
                        y = h[(i + 1) * n + i];
                        q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                        let t = (x * s - z * r) / q;
                        h[i * n + en] = t;
                        h[(i + 1) * n + en] = if x.abs() > z.abs() {
                            (-r - w * t) / x
                        } else {
                            (-s - y * t) / z
                        };
                    }

                    // Overflow control.
                    let t = h[i * n + en].abs();
                    if (EPS * t) * t > 1.0 {
                        for j in i..=en {
                            h[j * n + en] /= t;
                        }
                    }
                }
            }
        } else if q < 0.0 && en > 0 {
            // Complex vector; the last component is chosen imaginary.
            let mut l = en - 1;

            if h[en * n + en - 1].abs() > h[(en - 1) * n + en].abs() {
                h[(en - 1) * n + en - 1] = q / h[en * n + en - 1];
                h[(en - 1) * n + en] = -(h[en * n + en] - p) / h[en * n + en - 1];
            } else {
                let (re, im) = cdiv(0.0, -h[(en - 1) * n + en], h[(en - 1) * n + en - 1] - p, q);
                h[(en - 1) * n + en - 1] = re;
                h[(en - 1) * n + en] = im;
            }
            h[en * n + en - 1] = 0.0;
            h[en * n + en] = 1.0;

            if en >= 2 {
                for i in (0..=en - 2).rev() {
                    let mut ra = 0.0;
                    let mut sa = 0.0;
                    for j in l..=en {
                        ra += h[i * n + j] * h[j * n + en - 1];
                        sa += h[i * n + j] * h[j * n + en];
                    }
                    w = h[i * n + i] - p;

                    if e[i] < 0.0 {
                        z = w;
                        r = ra;
                        s = sa;
                    } else {
                        l = i;
                        if e[i] == 0.0 {
                            let (re, im) = cdiv(-ra, -sa, w, q);
                            h[i * n + en - 1] = re;
                            h[i * n + en] = im;
                        } else {
                            // Solve the 2×2 complex block.
                            x = h[i * n + i + 1];
                            y = h[(i + 1) * n + i];
                            let mut vr =
                                (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                            let vi = (d[i] - p) * 2.0 * q;
                            if vr == 0.0 && vi == 0.0 {
                                vr = EPS
                                    * norm
                                    * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                            }
                            let (re, im) = cdiv(
                                x * r - z * ra + q * sa,
                                x * s - z * sa - q * ra,
                                vr,
                                vi,
                            );
                            h[i * n + en - 1] = re;
                            h[i * n + en] = im;

                            if x.abs() > z.abs() + q.abs() {
                                h[(i + 1) * n + en - 1] = (-ra - w * h[i * n + en - 1]
                                    + q * h[i * n + en])
                                    / x;
                                h[(i + 1) * n + en] =
                                    (-sa - w * h[i * n + en] - q * h[i * n + en - 1]) / x;
                            } else {
                                let (re, im) = cdiv(
                                    -r - y * h[i * n + en - 1],
                                    -s - y * h[i * n + en],
                                    z,
                                    q,
                                );
                                h[(i + 1) * n + en - 1] = re;
                                h[(i + 1) * n + en] = im;
                            }
                        }

                        // Overflow control.
                        let t = h[i * n + en - 1].abs().max(h[i * n + en].abs());
                        if (EPS * t) * t > 1.0 {
                            for j in i..=en {
                                h[j * n + en - 1] /= t;
                                h[j * n + en] /= t;
                            }
                        }
                    }
                }
            }
        }
    }

    // Back transformation to the eigenvectors of the original matrix.
    for j in (low..nn).rev() {
        for i in low..=high {
            let mut sum = 0.0;
            for k in low..=j.min(high) {
                sum += v[i * n + k] * h[k * n + j];
            }
            v[i * n + j] = sum;
        }
    }

    Ok(())
}
