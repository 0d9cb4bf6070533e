//! Incremental mesh builder.

use sg_core::{Real, Vector};

use crate::error::MeshResult;
use crate::mesh::{BoundaryFace, FaceRef, InternalFace, Mesh};
use crate::validate;

/// Builder for constructing a mesh cell by cell and face by face.
///
/// Call `build()` to validate and freeze the mesh.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    cell_centres: Vec<Vector>,
    cell_volumes: Vec<Real>,
    internal_faces: Vec<InternalFace>,
    boundary_faces: Vec<BoundaryFace>,
    patch_names: Vec<String>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell and return its index.
    pub fn add_cell(&mut self, centre: Vector, volume: Real) -> usize {
        self.cell_centres.push(centre);
        self.cell_volumes.push(volume);
        self.cell_volumes.len() - 1
    }

    /// Add a named boundary patch and return its index.
    pub fn add_patch(&mut self, name: impl Into<String>) -> usize {
        self.patch_names.push(name.into());
        self.patch_names.len() - 1
    }

    /// Add a face between two cells, computing the interpolation weight and
    /// delta coefficient from the face centre.
    ///
    /// Cell indices must already exist; out-of-range owners/neighbours are
    /// rejected by `build()`.
    pub fn add_internal_face(
        &mut self,
        owner: usize,
        neighbour: usize,
        centre: Vector,
        sf: Vector,
    ) -> usize {
        let (weight, delta_coeff) = match (
            self.cell_centres.get(owner),
            self.cell_centres.get(neighbour),
        ) {
            (Some(&cp), Some(&cn)) => {
                let n = sf.normalize();
                let d_pf = (centre - cp).dot(&n).abs();
                let d_fn = (cn - centre).dot(&n).abs();
                let d = cn - cp;
                (d_fn / (d_pf + d_fn), 1.0 / d.norm())
            }
            // Invalid references are reported by validation
            _ => (0.5, 0.0),
        };
        self.push_internal(InternalFace {
            owner,
            neighbour,
            sf,
            weight,
            delta_coeff,
        })
    }

    /// Add a cyclic face whose owner-to-neighbour centre vector `d` has
    /// already been corrected across the periodic jump.
    pub fn add_cyclic_face(
        &mut self,
        owner: usize,
        neighbour: usize,
        sf: Vector,
        d: Vector,
        weight: Real,
    ) -> usize {
        self.push_internal(InternalFace {
            owner,
            neighbour,
            sf,
            weight,
            delta_coeff: 1.0 / d.norm(),
        })
    }

    pub fn add_boundary_face(&mut self, owner: usize, patch: usize, sf: Vector) -> usize {
        self.boundary_faces.push(BoundaryFace { owner, sf, patch });
        self.boundary_faces.len() - 1
    }

    fn push_internal(&mut self, face: InternalFace) -> usize {
        self.internal_faces.push(face);
        self.internal_faces.len() - 1
    }

    /// Validate and build the immutable mesh.
    pub fn build(self) -> MeshResult<Mesh> {
        validate::validate_addressing(
            self.cell_volumes.len(),
            &self.internal_faces,
            &self.boundary_faces,
            self.patch_names.len(),
        )?;

        let (cell_face_offsets, cell_face_refs) = Self::build_adjacency(
            self.cell_volumes.len(),
            &self.internal_faces,
            &self.boundary_faces,
        );

        let mesh = Mesh {
            cell_centres: self.cell_centres,
            cell_volumes: self.cell_volumes,
            internal_faces: self.internal_faces,
            boundary_faces: self.boundary_faces,
            patch_names: self.patch_names,
            cell_face_offsets,
            cell_face_refs,
        };

        validate::validate_geometry(&mesh)?;
        Ok(mesh)
    }

    /// Compact cell -> faces adjacency (CSR layout).
    fn build_adjacency(
        n_cells: usize,
        internal: &[InternalFace],
        boundary: &[BoundaryFace],
    ) -> (Vec<usize>, Vec<FaceRef>) {
        let mut counts = vec![0usize; n_cells];
        for face in internal {
            counts[face.owner] += 1;
            counts[face.neighbour] += 1;
        }
        for face in boundary {
            counts[face.owner] += 1;
        }

        let mut offsets = Vec::with_capacity(n_cells + 1);
        offsets.push(0);
        for count in &counts {
            let last = *offsets.last().unwrap_or(&0);
            offsets.push(last + count);
        }

        let mut cursor = offsets[..n_cells].to_vec();
        let mut refs = vec![FaceRef::Boundary(0); offsets[n_cells]];
        for (f, face) in internal.iter().enumerate() {
            refs[cursor[face.owner]] = FaceRef::Owner(f);
            cursor[face.owner] += 1;
            refs[cursor[face.neighbour]] = FaceRef::Neighbour(f);
            cursor[face.neighbour] += 1;
        }
        for (f, face) in boundary.iter().enumerate() {
            refs[cursor[face.owner]] = FaceRef::Boundary(f);
            cursor[face.owner] += 1;
        }

        (offsets, refs)
    }
}
