//! Mesh validation logic.

use sg_core::Vector;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{BoundaryFace, InternalFace, Mesh};

/// Relative tolerance for the closed-cell check.
const CLOSURE_TOL: f64 = 1e-9;

/// Validate face addressing: every reference points at an existing cell or
/// patch and no face connects a cell to itself.
pub(crate) fn validate_addressing(
    n_cells: usize,
    internal: &[InternalFace],
    boundary: &[BoundaryFace],
    n_patches: usize,
) -> MeshResult<()> {
    for (f, face) in internal.iter().enumerate() {
        for cell in [face.owner, face.neighbour] {
            if cell >= n_cells {
                return Err(MeshError::InvalidCellRef { face: f, cell });
            }
        }
        if face.owner == face.neighbour {
            return Err(MeshError::SelfConnectedFace {
                face: f,
                cell: face.owner,
            });
        }
        if !(face.sf.norm().is_finite() && face.sf.norm() > 0.0) {
            return Err(MeshError::DegenerateFace { face: f });
        }
        if !(face.weight > 0.0 && face.weight < 1.0) {
            return Err(MeshError::InvalidWeight {
                face: f,
                weight: face.weight,
            });
        }
    }

    // Boundary faces are numbered after internal faces in error reports
    for (b, face) in boundary.iter().enumerate() {
        let f = internal.len() + b;
        if face.owner >= n_cells {
            return Err(MeshError::InvalidCellRef {
                face: f,
                cell: face.owner,
            });
        }
        if face.patch >= n_patches {
            return Err(MeshError::InvalidPatchRef {
                face: f,
                patch: face.patch,
            });
        }
        if !(face.sf.norm().is_finite() && face.sf.norm() > 0.0) {
            return Err(MeshError::DegenerateFace { face: f });
        }
    }

    Ok(())
}

/// Validate cell geometry: positive volumes and closed cells.
pub(crate) fn validate_geometry(mesh: &Mesh) -> MeshResult<()> {
    for cell in 0..mesh.n_cells() {
        let volume = mesh.cell_volume(cell);
        if !(volume.is_finite() && volume > 0.0) {
            return Err(MeshError::NonPositiveVolume { cell, volume });
        }

        let mut sum = Vector::zeros();
        let mut area = 0.0;
        for &face in mesh.cell_faces(cell) {
            sum += mesh.outward_sf(face);
            area += mesh.mag_sf(face);
        }
        let residual = sum.norm();
        if residual > CLOSURE_TOL * area.max(1.0) {
            return Err(MeshError::OpenCell { cell, residual });
        }
    }
    Ok(())
}
