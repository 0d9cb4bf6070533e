//! Vector and rank-2 tensor algebra used by the closure.
//!
//! Tensors are stored as full 3x3 matrices. Gradients follow the
//! `grad(U)_ij = dU_j/dx_i` convention, so `S_f ⊗ U_f` summed over faces
//! gives the Gauss gradient directly.

use crate::numeric::Real;
use core::ops::{Add, Mul, Sub};
use nalgebra::{Matrix3, Vector3};

pub type Vector = Vector3<Real>;
pub type Tensor = Matrix3<Real>;

/// Values that can live in a cell field and pass through linear operators
/// (interpolation, filtering, averaging).
pub trait FieldValue:
    Copy + Send + Sync + Add<Output = Self> + Sub<Output = Self> + Mul<Real, Output = Self> + 'static
{
    fn zero() -> Self;

    /// Squared magnitude (`x*x`, `|v|^2`, `T:T`).
    fn mag_sqr(&self) -> Real;
}

impl FieldValue for Real {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn mag_sqr(&self) -> Real {
        self * self
    }
}

impl FieldValue for Vector {
    #[inline]
    fn zero() -> Self {
        Vector::zeros()
    }

    #[inline]
    fn mag_sqr(&self) -> Real {
        self.norm_squared()
    }
}

impl FieldValue for Tensor {
    #[inline]
    fn zero() -> Self {
        Tensor::zeros()
    }

    #[inline]
    fn mag_sqr(&self) -> Real {
        double_dot(self, self)
    }
}

/// Trace.
#[inline]
pub fn tr(t: &Tensor) -> Real {
    t[(0, 0)] + t[(1, 1)] + t[(2, 2)]
}

/// Symmetric part: `0.5 * (T + T^T)`.
#[inline]
pub fn symm(t: &Tensor) -> Tensor {
    (t + t.transpose()) * 0.5
}

/// Deviatoric part: `T - tr(T)/3 I`.
#[inline]
pub fn dev(t: &Tensor) -> Tensor {
    t - Tensor::identity() * (tr(t) / 3.0)
}

/// Double inner product `A:B = sum_ij A_ij B_ij`.
#[inline]
pub fn double_dot(a: &Tensor, b: &Tensor) -> Real {
    a.component_mul(b).sum()
}

/// Outer product `a ⊗ b`.
#[inline]
pub fn outer(a: &Vector, b: &Vector) -> Tensor {
    a * b.transpose()
}

/// `sqr(U) = U ⊗ U`, always symmetric.
#[inline]
pub fn sqr_vector(u: &Vector) -> Tensor {
    outer(u, u)
}

/// Strain-rate magnitude `sqrt(2 S:S)`.
#[inline]
pub fn strain_magnitude(s: &Tensor) -> Real {
    (2.0 * double_dot(s, s)).sqrt()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn tensor() -> impl Strategy<Value = Tensor> {
        prop::array::uniform9(-1e3..1e3f64).prop_map(|a| Tensor::from_row_slice(&a))
    }

    proptest! {
        #[test]
        fn dev_and_trace_split_the_tensor(t in tensor()) {
            let d = dev(&t);
            prop_assert!(tr(&d).abs() <= 1e-9 * (1.0 + t.abs().max()));
            let rebuilt = d + Tensor::identity() * (tr(&t) / 3.0);
            prop_assert!((rebuilt - t).abs().max() <= 1e-9 * (1.0 + t.abs().max()));
        }

        #[test]
        fn strain_magnitude_is_non_negative_and_symmetric(t in tensor()) {
            let s = symm(&t);
            prop_assert!(strain_magnitude(&s) >= 0.0);
            prop_assert_eq!(s, s.transpose());
        }
    }
}
