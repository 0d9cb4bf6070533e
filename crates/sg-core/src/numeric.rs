use crate::SgError;

/// Floating point type used throughout system
pub type Real = f64;

/// Floor used where a quantity must stay strictly positive but may
/// legitimately be tiny (strain-model denominators, KK before k^1.5).
pub const SMALL: Real = 1e-15;

/// Floor used only to keep a division finite.
pub const VSMALL: Real = 1e-300;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SgError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SgError::NonFinite { what, value: v })
    }
}

/// Half-wave rectification: `0.5 * (|x| + x)`.
///
/// Negative values map to zero, non-negative values pass through unchanged.
#[inline]
pub fn rectify(x: Real) -> Real {
    0.5 * (x.abs() + x)
}
