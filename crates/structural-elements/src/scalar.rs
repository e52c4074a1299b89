//! Scalar types the element formulation is generic over.
//!
//! Static and transient analyses run with `f64`; frequency-domain flutter and
//! small-disturbance aeroelastic coupling run with `Complex64`. Geometry,
//! quadrature weights and shape functions stay real and are lifted into the
//! scalar type where they meet state or load data.

use nalgebra::{ComplexField, DMatrix, DVector, Vector3};
use num_complex::Complex64;

/// Numeric kind of a scalar, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Real,
    Complex,
}

/// Field scalar accepted by [`StructuralElement`](crate::elements::StructuralElement).
pub trait FieldScalar: ComplexField<RealField = f64> + Copy + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn lift(value: f64) -> Self {
        Self::from_real(value)
    }

    fn lift_vector(v: &DVector<f64>) -> DVector<Self> {
        v.map(Self::from_real)
    }

    fn lift_matrix(m: &DMatrix<f64>) -> DMatrix<Self> {
        m.map(Self::from_real)
    }

    fn lift_vector3(v: &Vector3<f64>) -> Vector3<Self> {
        v.map(Self::from_real)
    }
}

impl FieldScalar for f64 {
    const KIND: ScalarKind = ScalarKind::Real;
}

impl FieldScalar for Complex64 {
    const KIND: ScalarKind = ScalarKind::Complex;
}
