//! Tolerance-aware floating point comparison.
//!
//! A [`NumericalContext`] carries the epsilon under which two doubles
//! count as equal. One context can be installed process-wide at program
//! start and is read everywhere as a fallback; operations that need a
//! local tolerance take an explicit context instead.

use std::sync::OnceLock;

static CONTEXT: OnceLock<NumericalContext> = OnceLock::new();

/// A comparison tolerance for `f64` values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericalContext {
    epsilon: f64,
}

impl NumericalContext {
    /// Exact comparison: `ε = 0`.
    pub const EXACT: Self = Self { epsilon: 0.0 };

    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }

    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Whether `a` and `b` are equal within the tolerance. Exactly equal
    /// values compare equal regardless of epsilon, so infinities of the
    /// same sign match.
    #[inline]
    pub fn equals(&self, a: f64, b: f64) -> bool {
        a == b || (a - b).abs() <= self.epsilon
    }

    /// Whether `a` counts as zero within the tolerance.
    #[inline]
    pub fn is_zero(&self, a: f64) -> bool {
        a == 0.0 || a.abs() <= self.epsilon
    }

    /// Install `context` as the process-wide default. Succeeds only
    /// once; returns `false` if a context has already been installed.
    pub fn install(context: NumericalContext) -> bool {
        CONTEXT.set(context).is_ok()
    }

    /// The process-wide context, or [`NumericalContext::EXACT`] when
    /// none has been installed.
    pub fn get() -> NumericalContext {
        *CONTEXT.get().unwrap_or(&Self::EXACT)
    }
}

impl Default for NumericalContext {
    fn default() -> Self {
        Self::EXACT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_context_compares_bitwise() {
        let context = NumericalContext::EXACT;
        assert!(context.equals(1.0, 1.0));
        assert!(!context.equals(1.0, 1.0 + f64::EPSILON));
        assert!(context.is_zero(0.0));
        assert!(context.is_zero(-0.0));
    }

    #[test]
    fn tolerant_context_absorbs_noise() {
        let context = NumericalContext::new(1e-9);
        assert!(context.equals(1.0, 1.0 + 1e-10));
        assert!(!context.equals(1.0, 1.0 + 1e-8));
        assert!(context.is_zero(-1e-10));
    }

    #[test]
    fn epsilon_sign_is_ignored() {
        assert_eq!(NumericalContext::new(-0.5).epsilon(), 0.5);
    }

    #[test]
    fn install_succeeds_only_once() {
        assert!(NumericalContext::install(NumericalContext::EXACT));
        assert!(!NumericalContext::install(NumericalContext::new(1e-3)));
        assert_eq!(NumericalContext::get(), NumericalContext::EXACT);
    }

    #[test]
    fn infinities_compare_equal_to_themselves() {
        let context = NumericalContext::EXACT;
        assert!(context.equals(f64::INFINITY, f64::INFINITY));
        assert!(!context.equals(f64::INFINITY, f64::NEG_INFINITY));
    }
}
