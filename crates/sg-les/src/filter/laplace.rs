use sg_core::{Field, FieldValue, Real, ScalarField, TensorField, VectorField};
use sg_fvm::fvc;
use sg_mesh::Mesh;

use super::{kind_mismatch, FilterConfig, LesFilter};
use crate::error::{LesError, LesResult};

/// Diffusive filter `phi + div(c grad(phi))` with `c = delta^2 / width_coeff`.
#[derive(Debug, Clone, Copy)]
pub struct LaplaceFilter {
    width_coeff: Real,
}

impl LaplaceFilter {
    pub fn new(width_coeff: Real) -> LesResult<Self> {
        if !(width_coeff.is_finite() && width_coeff > 0.0) {
            return Err(LesError::config("laplace filter width_coeff must be positive"));
        }
        Ok(Self { width_coeff })
    }

    pub fn width_coeff(&self) -> Real {
        self.width_coeff
    }

    fn apply<T: FieldValue>(&self, mesh: &Mesh, delta: &ScalarField, vf: &Field<T>) -> Field<T> {
        let coeff = delta.map("filterCoeff", |d| d * d / self.width_coeff);
        let smoothing = fvc::laplacian(mesh, &coeff, vf);
        vf.zip_map(&smoothing, format!("laplaceFilter({})", vf.name()), |v, s| *v + *s)
    }
}

impl LesFilter for LaplaceFilter {
    fn kind(&self) -> &'static str {
        "laplace"
    }

    fn filter_scalar(&self, mesh: &Mesh, delta: &ScalarField, vf: &ScalarField) -> ScalarField {
        self.apply(mesh, delta, vf)
    }

    fn filter_vector(&self, mesh: &Mesh, delta: &ScalarField, vf: &VectorField) -> VectorField {
        self.apply(mesh, delta, vf)
    }

    fn filter_tensor(&self, mesh: &Mesh, delta: &ScalarField, vf: &TensorField) -> TensorField {
        self.apply(mesh, delta, vf)
    }

    fn read(&mut self, config: &FilterConfig) -> LesResult<()> {
        match *config {
            FilterConfig::Laplace { width_coeff } => {
                *self = LaplaceFilter::new(width_coeff)?;
                Ok(())
            }
            ref other => Err(kind_mismatch(self.kind(), other)),
        }
    }
}
