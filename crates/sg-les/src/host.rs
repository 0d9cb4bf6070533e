//! Capabilities the closure consumes from, and offers to, a flow solver.

use sg_core::{ScalarField, VectorField};
use sg_fvm::{FaceFlux, TimeState};
use sg_mesh::Mesh;

use crate::error::{check_cells, LesError, LesResult};
use crate::model::CorrectReport;
use crate::properties::LesProperties;

/// Mesh and time level for one closure call.
#[derive(Clone, Copy)]
pub struct LesContext<'a> {
    pub mesh: &'a Mesh,
    pub time: &'a TimeState,
}

impl<'a> LesContext<'a> {
    pub fn new(mesh: &'a Mesh, time: &'a TimeState) -> Self {
        Self { mesh, time }
    }
}

/// Resolved-flow quantities supplied by the flow solver.
///
/// All fields are read-only for the closure. Cell fields have one value per
/// mesh cell; fluxes follow the mesh face addressing.
pub trait TurbulenceHost: Sync {
    /// Phase fraction (one for single-phase flow).
    fn alpha(&self) -> &ScalarField;

    fn rho(&self) -> &ScalarField;

    fn velocity(&self) -> &VectorField;

    /// Volumetric face flux `U_f . S_f`, absolute (not relative to a moving mesh).
    fn phi(&self) -> &FaceFlux;

    /// Face flux of `alpha rho U`.
    fn alpha_rho_phi(&self) -> &FaceFlux;

    /// Molecular kinematic viscosity.
    fn nu(&self) -> &ScalarField;

    /// Apply the host's boundary conditions to a freshly computed
    /// eddy-viscosity field.
    fn correct_boundary_conditions(&self, _nut: &mut ScalarField) {}
}

/// Check that every host field matches the mesh.
pub fn check_host(mesh: &Mesh, host: &dyn TurbulenceHost) -> LesResult<()> {
    let n = mesh.n_cells();
    check_cells("alpha", n, host.alpha().len())?;
    check_cells("rho", n, host.rho().len())?;
    check_cells("U", n, host.velocity().len())?;
    check_cells("nu", n, host.nu().len())?;
    for (what, flux) in [("phi", host.phi()), ("alphaRhoPhi", host.alpha_rho_phi())] {
        if !flux.matches(mesh) {
            return Err(LesError::FieldSize {
                what,
                expected: mesh.n_internal_faces() + mesh.n_boundary_faces(),
                actual: flux.internal.len() + flux.boundary.len(),
            });
        }
    }
    Ok(())
}

/// A subgrid-scale closure as seen by the flow solver.
pub trait SgsClosure {
    /// Update the closure for the current time level. Called once per
    /// solver iteration or time step.
    fn correct(
        &mut self,
        ctx: &LesContext<'_>,
        host: &dyn TurbulenceHost,
    ) -> LesResult<CorrectReport>;

    /// Eddy viscosity.
    fn nut(&self) -> &ScalarField;

    /// Subgrid kinetic energy.
    fn k(&self) -> &ScalarField;

    /// Hook run after every eddy-viscosity update.
    fn correct_nut(&mut self) {}

    /// Effective viscosity `nut + nu`.
    fn nu_eff(&self, host: &dyn TurbulenceHost) -> ScalarField {
        self.nut().zip_map(host.nu(), "nuEff", |nut, nu| nut + nu)
    }

    /// Re-read configuration. On error the previous configuration stays in
    /// force.
    fn read(&mut self, ctx: &LesContext<'_>, props: &LesProperties) -> LesResult<()>;
}
