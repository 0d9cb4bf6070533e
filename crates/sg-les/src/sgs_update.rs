//! Eddy-viscosity update from the dynamic coefficient.

use sg_core::{strain_magnitude, ScalarField, TensorField};
use sg_fvm::fvc;
use sg_mesh::Mesh;

use crate::coefficients::CoefficientEngine;
use crate::host::TurbulenceHost;
use crate::sources::SourceHook;

/// Result of one eddy-viscosity update.
#[derive(Debug, Clone)]
pub struct SgsUpdate {
    pub cd: ScalarField,
    /// Cells where the raw eddy viscosity fell below `-nu`.
    pub nut_floored: usize,
}

/// `max(cD delta^2 sqrt(2 S:S), -nu)` per cell, plus the number of cells
/// held at the floor.
pub fn bounded_eddy_viscosity(
    mesh: &Mesh,
    cd: &ScalarField,
    delta: &ScalarField,
    sij: &TensorField,
    nu: &ScalarField,
) -> (ScalarField, usize) {
    let raw = fvc::gather(mesh, "nut", |c| {
        cd[c] * delta[c] * delta[c] * strain_magnitude(&sij[c])
    });
    let floored = (0..mesh.n_cells()).filter(|&c| raw[c] < -nu[c]).count();
    let nut = raw.zip_map(nu, "nut", |n, nu| n.max(-nu));
    (nut, floored)
}

/// Recompute `nut` in place for the strain-rate field `sij`, then apply the
/// host boundary conditions and the source-hook correction.
pub fn update_sgs_fields(
    engine: &CoefficientEngine<'_>,
    mesh: &Mesh,
    delta: &ScalarField,
    sij: &TensorField,
    host: &dyn TurbulenceHost,
    sources: &dyn SourceHook,
    nut: &mut ScalarField,
) -> SgsUpdate {
    let cd = engine.c_d(sij);
    let (fresh, nut_floored) = bounded_eddy_viscosity(mesh, &cd, delta, sij, host.nu());
    nut.values_mut().copy_from_slice(fresh.values());
    host.correct_boundary_conditions(nut);
    sources.correct_field(nut);
    SgsUpdate { cd, nut_floored }
}
