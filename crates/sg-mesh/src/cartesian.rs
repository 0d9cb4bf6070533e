//! Cartesian box meshes.

use serde::{Deserialize, Serialize};
use sg_core::{Real, Vector};

use crate::builder::MeshBuilder;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Uniform box `[0, L]^3` split into `n` cells per axis.
///
/// Non-periodic axes get `<axis>min` / `<axis>max` zero-gradient patches.
/// A periodic axis with a single cell carries no faces at all, which makes
/// the mesh effectively two-dimensional in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianSpec {
    pub cells: [usize; 3],
    pub lengths: [Real; 3],
    #[serde(default)]
    pub periodic: [bool; 3],
}

impl CartesianSpec {
    pub fn new(cells: [usize; 3], lengths: [Real; 3]) -> Self {
        Self {
            cells,
            lengths,
            periodic: [false; 3],
        }
    }

    pub fn with_periodic(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn n_cells(&self) -> usize {
        self.cells.iter().product()
    }

    pub fn spacing(&self) -> [Real; 3] {
        [0, 1, 2].map(|a| self.lengths[a] / self.cells[a] as Real)
    }

    /// Linear cell index of `(i, j, k)`.
    pub fn cell_index(&self, ijk: [usize; 3]) -> usize {
        ijk[0] + self.cells[0] * (ijk[1] + self.cells[1] * ijk[2])
    }

    pub fn cell_centre(&self, ijk: [usize; 3]) -> Vector {
        let h = self.spacing();
        Vector::new(
            (ijk[0] as Real + 0.5) * h[0],
            (ijk[1] as Real + 0.5) * h[1],
            (ijk[2] as Real + 0.5) * h[2],
        )
    }

    pub fn validate(&self) -> MeshResult<()> {
        if self.cells.contains(&0) {
            return Err(MeshError::InvalidSpec {
                what: "every axis needs at least one cell",
            });
        }
        if self.lengths.iter().any(|l| !(l.is_finite() && *l > 0.0)) {
            return Err(MeshError::InvalidSpec {
                what: "box lengths must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn build(&self) -> MeshResult<Mesh> {
        self.validate()?;
        let h = self.spacing();
        let volume = h[0] * h[1] * h[2];
        let face_area = [h[1] * h[2], h[0] * h[2], h[0] * h[1]];

        let mut builder = MeshBuilder::new();
        for k in 0..self.cells[2] {
            for j in 0..self.cells[1] {
                for i in 0..self.cells[0] {
                    builder.add_cell(self.cell_centre([i, j, k]), volume);
                }
            }
        }

        for axis in 0..3 {
            let mut e = Vector::zeros();
            e[axis] = 1.0;
            let sf = e * face_area[axis];
            let n = self.cells[axis];
            let patches = (!self.periodic[axis]).then(|| {
                (
                    builder.add_patch(format!("{}min", AXIS_NAMES[axis])),
                    builder.add_patch(format!("{}max", AXIS_NAMES[axis])),
                )
            });

            for k in 0..self.cells[2] {
                for j in 0..self.cells[1] {
                    for i in 0..self.cells[0] {
                        let ijk = [i, j, k];
                        let owner = self.cell_index(ijk);
                        let idx = ijk[axis];

                        if idx + 1 < n {
                            let mut next = ijk;
                            next[axis] += 1;
                            let centre = self.cell_centre(ijk) + e * (0.5 * h[axis]);
                            builder.add_internal_face(owner, self.cell_index(next), centre, sf);
                        } else if let Some((_, max_patch)) = patches {
                            builder.add_boundary_face(owner, max_patch, sf);
                        } else if n > 1 {
                            let mut wrap = ijk;
                            wrap[axis] = 0;
                            builder.add_cyclic_face(
                                owner,
                                self.cell_index(wrap),
                                sf,
                                e * h[axis],
                                0.5,
                            );
                        }

                        if idx == 0 {
                            if let Some((min_patch, _)) = patches {
                                builder.add_boundary_face(owner, min_patch, -sf);
                            }
                        }
                    }
                }
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_box_face_counts() {
        let mesh = CartesianSpec::new([3, 2, 1], [3.0, 2.0, 1.0]).build().unwrap();
        assert_eq!(mesh.n_cells(), 6);
        // x: 2 per row * 2 rows, y: 1 per column * 3 columns
        assert_eq!(mesh.n_internal_faces(), 4 + 3);
        // 2*(2*1) + 2*(3*1) + 2*(3*2)
        assert_eq!(mesh.n_boundary_faces(), 4 + 6 + 12);
        assert!((mesh.total_volume() - 6.0).abs() < 1e-12);
        assert_eq!(mesh.patch_names().len(), 6);
    }

    #[test]
    fn periodic_axis_wraps() {
        let spec = CartesianSpec::new([4, 1, 1], [4.0, 1.0, 1.0]).with_periodic([true, false, false]);
        let mesh = spec.build().unwrap();
        assert_eq!(mesh.n_internal_faces(), 4);
        let wrap = mesh.internal_faces()[3];
        assert_eq!((wrap.owner, wrap.neighbour), (3, 0));
        assert!((wrap.delta_coeff - 1.0).abs() < 1e-12);
        assert!(mesh.patch_names().iter().all(|p| !p.starts_with('x')));
    }

    #[test]
    fn single_periodic_cell_has_no_faces_on_that_axis() {
        let spec = CartesianSpec::new([2, 2, 1], [1.0, 1.0, 1.0]).with_periodic([false, false, true]);
        let mesh = spec.build().unwrap();
        assert_eq!(mesh.n_boundary_faces(), 8);
        for cell in 0..mesh.n_cells() {
            assert_eq!(mesh.cell_faces(cell).len(), 4);
        }
    }

    #[test]
    fn rejects_empty_axis() {
        assert!(CartesianSpec::new([0, 1, 1], [1.0; 3]).build().is_err());
        assert!(CartesianSpec::new([1, 1, 1], [1.0, -1.0, 1.0]).build().is_err());
    }
}
