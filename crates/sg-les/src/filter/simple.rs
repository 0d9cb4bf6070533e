use sg_core::{ScalarField, TensorField, VectorField};
use sg_fvm::fvc;
use sg_mesh::Mesh;

use super::{kind_mismatch, FilterConfig, LesFilter};
use crate::error::LesResult;

/// Neighbourhood filter: the face-area weighted average of linearly
/// interpolated face values. Independent of the LES width.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFilter;

impl LesFilter for SimpleFilter {
    fn kind(&self) -> &'static str {
        "simple"
    }

    fn filter_scalar(&self, mesh: &Mesh, _delta: &ScalarField, vf: &ScalarField) -> ScalarField {
        fvc::average(mesh, vf)
    }

    fn filter_vector(&self, mesh: &Mesh, _delta: &ScalarField, vf: &VectorField) -> VectorField {
        fvc::average(mesh, vf)
    }

    fn filter_tensor(&self, mesh: &Mesh, _delta: &ScalarField, vf: &TensorField) -> TensorField {
        fvc::average(mesh, vf)
    }

    fn read(&mut self, config: &FilterConfig) -> LesResult<()> {
        match config {
            FilterConfig::Simple => Ok(()),
            other => Err(kind_mismatch(self.kind(), other)),
        }
    }
}
