//! Face-centred fields.

use sg_core::{Real, Vector};
use sg_mesh::{FaceRef, Mesh};

/// Values on internal faces (owner -> neighbour orientation) and boundary
/// faces (outward orientation).
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceField<T> {
    name: String,
    pub internal: Vec<T>,
    pub boundary: Vec<T>,
}

/// Face flux, e.g. `phi = U_f . S_f`.
pub type FaceFlux = SurfaceField<Real>;

impl<T: Copy> SurfaceField<T> {
    pub fn new(name: impl Into<String>, internal: Vec<T>, boundary: Vec<T>) -> Self {
        Self {
            name: name.into(),
            internal,
            boundary,
        }
    }

    pub fn uniform(name: impl Into<String>, mesh: &Mesh, value: T) -> Self {
        Self::new(
            name,
            vec![value; mesh.n_internal_faces()],
            vec![value; mesh.n_boundary_faces()],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Face value as stored (no orientation change).
    pub fn face_value(&self, face: FaceRef) -> T {
        match face {
            FaceRef::Owner(f) | FaceRef::Neighbour(f) => self.internal[f],
            FaceRef::Boundary(f) => self.boundary[f],
        }
    }

    pub fn matches(&self, mesh: &Mesh) -> bool {
        self.internal.len() == mesh.n_internal_faces()
            && self.boundary.len() == mesh.n_boundary_faces()
    }
}

impl FaceFlux {
    /// Flux leaving the cell through the referenced face.
    pub fn outward(&self, face: FaceRef) -> Real {
        match face {
            FaceRef::Owner(f) => self.internal[f],
            FaceRef::Neighbour(f) => -self.internal[f],
            FaceRef::Boundary(f) => self.boundary[f],
        }
    }

    /// Pointwise product with another flux-like field.
    pub fn scaled(&self, name: impl Into<String>, by: &SurfaceField<Real>) -> FaceFlux {
        FaceFlux::new(
            name,
            self.internal
                .iter()
                .zip(&by.internal)
                .map(|(a, b)| a * b)
                .collect(),
            self.boundary
                .iter()
                .zip(&by.boundary)
                .map(|(a, b)| a * b)
                .collect(),
        )
    }

    /// Flux of a uniform velocity through every face.
    pub fn from_uniform_velocity(name: impl Into<String>, mesh: &Mesh, u: Vector) -> FaceFlux {
        FaceFlux::new(
            name,
            mesh.internal_faces().iter().map(|f| f.sf.dot(&u)).collect(),
            mesh.boundary_faces().iter().map(|f| f.sf.dot(&u)).collect(),
        )
    }
}
