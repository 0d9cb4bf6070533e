//! Implicit finite-volume operators: each returns the [`FvMatrix`] of one
//! term, to be combined with `+`/`-` into an equation.

use sg_core::{Real, ScalarField};
use sg_mesh::Mesh;

use crate::error::{check_len, FvmResult};
use crate::matrix::FvMatrix;
use crate::surface::FaceFlux;
use crate::time::TimeState;

fn check_cells(mesh: &Mesh, what: &'static str, field: &ScalarField) -> FvmResult<()> {
    check_len(what, mesh.n_cells(), field.len())
}

/// Implicit Euler `d(alpha rho psi)/dt` with `psi_old` taken from `psi`.
pub fn ddt<'m>(
    mesh: &'m Mesh,
    time: &TimeState,
    alpha: &ScalarField,
    rho: &ScalarField,
    psi: &ScalarField,
) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "ddt alpha", alpha)?;
    check_cells(mesh, "ddt rho", rho)?;
    check_cells(mesh, "ddt field", psi)?;

    let mut m = FvMatrix::new(mesh);
    let rdt = 1.0 / time.delta_t;
    for cell in 0..mesh.n_cells() {
        let coeff = alpha[cell] * rho[cell] * mesh.cell_volume(cell) * rdt;
        m.diag[cell] = coeff;
        m.source[cell] = coeff * psi[cell];
    }
    Ok(m)
}

/// Upwind convection `div(flux, psi)`.
///
/// Boundary faces are zero-gradient, so their flux always multiplies the
/// owner value.
pub fn div<'m>(mesh: &'m Mesh, flux: &FaceFlux, psi: &ScalarField) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "div field", psi)?;
    check_len("div internal flux", mesh.n_internal_faces(), flux.internal.len())?;
    check_len("div boundary flux", mesh.n_boundary_faces(), flux.boundary.len())?;

    let mut m = FvMatrix::new(mesh);
    for (f, face) in mesh.internal_faces().iter().enumerate() {
        let phi = flux.internal[f];
        m.diag[face.owner] += phi.max(0.0);
        m.upper[f] += phi.min(0.0);
        m.diag[face.neighbour] -= phi.min(0.0);
        m.lower[f] -= phi.max(0.0);
    }
    for (f, face) in mesh.boundary_faces().iter().enumerate() {
        m.diag[face.owner] += flux.boundary[f];
    }
    Ok(m)
}

/// Upwind convection with the continuity error removed:
/// `div(flux, psi) - Sp(div(flux), psi)`.
///
/// For a flux that does not conserve mass the plain operator puts the net
/// inflow on the diagonal; here each row sums to zero with non-positive
/// off-diagonals, so the term never weakens diagonal dominance. Equal to
/// [`div`] when the flux is divergence-free.
pub fn bounded_div<'m>(
    mesh: &'m Mesh,
    flux: &FaceFlux,
    psi: &ScalarField,
) -> FvmResult<FvMatrix<'m>> {
    let mut m = div(mesh, flux, psi)?;
    for (cell, d) in m.diag.iter_mut().enumerate() {
        let net_outflow: Real = mesh
            .cell_faces(cell)
            .iter()
            .map(|&face| flux.outward(face))
            .sum();
        *d -= net_outflow;
    }
    Ok(m)
}

/// Diffusion `div(gamma grad(psi))` with linearly interpolated `gamma`.
pub fn laplacian<'m>(
    mesh: &'m Mesh,
    gamma: &ScalarField,
    psi: &ScalarField,
) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "laplacian gamma", gamma)?;
    check_cells(mesh, "laplacian field", psi)?;

    let mut m = FvMatrix::new(mesh);
    for (f, face) in mesh.internal_faces().iter().enumerate() {
        let gamma_f = gamma[face.owner] * face.weight + gamma[face.neighbour] * (1.0 - face.weight);
        let coeff = gamma_f * face.sf.norm() * face.delta_coeff;
        m.upper[f] += coeff;
        m.lower[f] += coeff;
        m.diag[face.owner] -= coeff;
        m.diag[face.neighbour] -= coeff;
    }
    Ok(m)
}

/// Implicit linear term `sp * psi`.
pub fn sp<'m>(mesh: &'m Mesh, sp: &ScalarField, psi: &ScalarField) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "Sp coefficient", sp)?;
    check_cells(mesh, "Sp field", psi)?;

    let mut m = FvMatrix::new(mesh);
    for cell in 0..mesh.n_cells() {
        m.diag[cell] = mesh.cell_volume(cell) * sp[cell];
    }
    Ok(m)
}

/// Sign-dependent linear term `sp * psi`.
///
/// Where `sp > 0` the term goes on the diagonal (implicit); where `sp < 0`
/// it is evaluated with the current `psi` and goes to the source
/// (explicit). Either way the diagonal is never weakened.
pub fn su_sp<'m>(mesh: &'m Mesh, sp: &ScalarField, psi: &ScalarField) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "SuSp coefficient", sp)?;
    check_cells(mesh, "SuSp field", psi)?;

    let mut m = FvMatrix::new(mesh);
    for cell in 0..mesh.n_cells() {
        let v = mesh.cell_volume(cell);
        m.diag[cell] = v * sp[cell].max(0.0);
        m.source[cell] = -v * sp[cell].min(0.0) * psi[cell];
    }
    Ok(m)
}

/// Explicit source `su`.
pub fn su<'m>(mesh: &'m Mesh, su: &ScalarField) -> FvmResult<FvMatrix<'m>> {
    check_cells(mesh, "Su source", su)?;

    let mut m = FvMatrix::new(mesh);
    for cell in 0..mesh.n_cells() {
        m.source[cell] = -mesh.cell_volume(cell) * su[cell];
    }
    Ok(m)
}
