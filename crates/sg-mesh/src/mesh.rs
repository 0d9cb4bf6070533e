//! Immutable mesh produced by [`MeshBuilder`](crate::MeshBuilder).

use sg_core::{Real, Vector};

/// Face between two cells.
///
/// `sf` points from owner to neighbour and has the face area as magnitude.
/// Cyclic (periodic) connections are ordinary internal faces whose geometry
/// has been corrected across the periodic jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalFace {
    pub owner: usize,
    pub neighbour: usize,
    pub sf: Vector,
    /// Owner-side linear interpolation weight: `phi_f = w phi_P + (1-w) phi_N`.
    pub weight: Real,
    /// `1 / |d|`, `d` the owner-to-neighbour centre distance.
    pub delta_coeff: Real,
}

/// Face on the domain boundary. Boundary values are zero-gradient
/// (equal to the owner value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryFace {
    pub owner: usize,
    pub sf: Vector,
    pub patch: usize,
}

/// A face seen from one of its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceRef {
    /// Internal face index; the cell is its owner.
    Owner(usize),
    /// Internal face index; the cell is its neighbour.
    Neighbour(usize),
    /// Boundary face index.
    Boundary(usize),
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) cell_centres: Vec<Vector>,
    pub(crate) cell_volumes: Vec<Real>,
    pub(crate) internal_faces: Vec<InternalFace>,
    pub(crate) boundary_faces: Vec<BoundaryFace>,
    pub(crate) patch_names: Vec<String>,
    /// Offsets into `cell_face_refs`, length n_cells + 1.
    pub(crate) cell_face_offsets: Vec<usize>,
    pub(crate) cell_face_refs: Vec<FaceRef>,
}

impl Mesh {
    pub fn n_cells(&self) -> usize {
        self.cell_volumes.len()
    }

    pub fn n_internal_faces(&self) -> usize {
        self.internal_faces.len()
    }

    pub fn n_boundary_faces(&self) -> usize {
        self.boundary_faces.len()
    }

    pub fn cell_centres(&self) -> &[Vector] {
        &self.cell_centres
    }

    pub fn cell_volumes(&self) -> &[Real] {
        &self.cell_volumes
    }

    pub fn cell_centre(&self, cell: usize) -> Vector {
        self.cell_centres[cell]
    }

    pub fn cell_volume(&self, cell: usize) -> Real {
        self.cell_volumes[cell]
    }

    pub fn internal_faces(&self) -> &[InternalFace] {
        &self.internal_faces
    }

    pub fn boundary_faces(&self) -> &[BoundaryFace] {
        &self.boundary_faces
    }

    pub fn patch_names(&self) -> &[String] {
        &self.patch_names
    }

    /// Faces of a cell, in insertion order.
    pub fn cell_faces(&self, cell: usize) -> &[FaceRef] {
        let start = self.cell_face_offsets[cell];
        let end = self.cell_face_offsets[cell + 1];
        &self.cell_face_refs[start..end]
    }

    /// Outward area vector of a face as seen from the given reference.
    pub fn outward_sf(&self, face: FaceRef) -> Vector {
        match face {
            FaceRef::Owner(f) => self.internal_faces[f].sf,
            FaceRef::Neighbour(f) => -self.internal_faces[f].sf,
            FaceRef::Boundary(f) => self.boundary_faces[f].sf,
        }
    }

    /// Face area of a face as seen from the given reference.
    pub fn mag_sf(&self, face: FaceRef) -> Real {
        match face {
            FaceRef::Owner(f) | FaceRef::Neighbour(f) => self.internal_faces[f].sf.norm(),
            FaceRef::Boundary(f) => self.boundary_faces[f].sf.norm(),
        }
    }

    pub fn total_volume(&self) -> Real {
        self.cell_volumes.iter().sum()
    }
}
