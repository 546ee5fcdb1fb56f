//! Generic sample type for single- and double-precision processing.
//!
//! The filter engines are generic over [`Sample`] so the same recursion code
//! serves both `f32` (real-time audio paths) and `f64` (offline rendering,
//! reference tests). All transcendentals route through `libm`, keeping the
//! crate `no_std`-compatible.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Floating-point sample type used by the filter engines.
///
/// Implemented for `f32` and `f64`. The associated constants cover the
/// literals the coefficient formulas need; [`Sample::from_f64`] lifts
/// everything else (sample rates, thresholds) out of `f64`.
pub trait Sample:
    Copy
    + PartialEq
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Two.
    const TWO: Self;
    /// Archimedes' constant.
    const PI: Self;
    /// Full circle, `2π`.
    const TAU: Self;
    /// Values with magnitude below this are flushed to zero by the
    /// denormal pass. Kept well above the subnormal range for margin.
    const FLUSH_THRESHOLD: Self;

    /// Convert from `f64` (used to lift configuration values and literals).
    fn from_f64(v: f64) -> Self;

    /// Convert to `f64`.
    fn to_f64(self) -> f64;

    /// Absolute value.
    fn abs(self) -> Self;

    /// Square root.
    fn sqrt(self) -> Self;

    /// Sine.
    fn sin(self) -> Self;

    /// Cosine.
    fn cos(self) -> Self;

    /// Hyperbolic tangent (the soft-clip nonlinearity).
    fn tanh(self) -> Self;

    /// Inverse sine (the output warp of the folded nonlinearity).
    fn asin(self) -> Self;

    /// `self` raised to the power `n`.
    fn powf(self, n: Self) -> Self;

    /// Clamp into `[lo, hi]`.
    fn clamp(self, lo: Self, hi: Self) -> Self;

    /// Reciprocal, `1 / self`.
    #[inline]
    fn recip(self) -> Self {
        Self::ONE / self
    }
}

impl Sample for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;
    const PI: Self = core::f32::consts::PI;
    const TAU: Self = core::f32::consts::TAU;
    const FLUSH_THRESHOLD: Self = 1e-20;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn abs(self) -> Self {
        libm::fabsf(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrtf(self)
    }

    #[inline]
    fn sin(self) -> Self {
        libm::sinf(self)
    }

    #[inline]
    fn cos(self) -> Self {
        libm::cosf(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        libm::tanhf(self)
    }

    #[inline]
    fn asin(self) -> Self {
        libm::asinf(self)
    }

    #[inline]
    fn powf(self, n: Self) -> Self {
        libm::powf(self, n)
    }

    #[inline]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        f32::clamp(self, lo, hi)
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;
    const PI: Self = core::f64::consts::PI;
    const TAU: Self = core::f64::consts::TAU;
    const FLUSH_THRESHOLD: Self = 1e-20;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn abs(self) -> Self {
        libm::fabs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrt(self)
    }

    #[inline]
    fn sin(self) -> Self {
        libm::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        libm::cos(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        libm::tanh(self)
    }

    #[inline]
    fn asin(self) -> Self {
        libm::asin(self)
    }

    #[inline]
    fn powf(self, n: Self) -> Self {
        libm::pow(self, n)
    }

    #[inline]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        f64::clamp(self, lo, hi)
    }
}
