//! Face-addressed finite-volume matrix.
//!
//! A matrix represents the discretised term `A psi - b`: `diag`, `upper`
//! and `lower` make up `A`, `source` is `b`. Coefficients are
//! volume-integrated. For internal face `f`, `upper[f]` multiplies the
//! neighbour value in the owner's row and `lower[f]` multiplies the owner
//! value in the neighbour's row.

use std::ops::{Add, Neg, Sub};

use sg_core::{Real, ScalarField, SgError};
use sg_mesh::{FaceRef, Mesh};

use crate::error::{check_len, FvmResult};

#[derive(Debug, Clone)]
pub struct FvMatrix<'m> {
    mesh: &'m Mesh,
    pub diag: Vec<Real>,
    pub upper: Vec<Real>,
    pub lower: Vec<Real>,
    pub source: Vec<Real>,
}

impl<'m> FvMatrix<'m> {
    pub fn new(mesh: &'m Mesh) -> Self {
        Self {
            mesh,
            diag: vec![0.0; mesh.n_cells()],
            upper: vec![0.0; mesh.n_internal_faces()],
            lower: vec![0.0; mesh.n_internal_faces()],
            source: vec![0.0; mesh.n_cells()],
        }
    }

    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    pub fn n_cells(&self) -> usize {
        self.diag.len()
    }

    /// Off-diagonal contribution to the row of `cell`: `sum_N a_PN psi_N`.
    #[inline]
    pub fn off_diag_sum(&self, cell: usize, psi: &[Real]) -> Real {
        let faces = self.mesh.internal_faces();
        self.mesh
            .cell_faces(cell)
            .iter()
            .map(|&face| match face {
                FaceRef::Owner(f) => self.upper[f] * psi[faces[f].neighbour],
                FaceRef::Neighbour(f) => self.lower[f] * psi[faces[f].owner],
                FaceRef::Boundary(_) => 0.0,
            })
            .sum()
    }

    /// Sum of absolute off-diagonal coefficients in a row.
    pub fn off_diag_mag(&self, cell: usize) -> Real {
        self.mesh
            .cell_faces(cell)
            .iter()
            .map(|&face| match face {
                FaceRef::Owner(f) => self.upper[f].abs(),
                FaceRef::Neighbour(f) => self.lower[f].abs(),
                FaceRef::Boundary(_) => 0.0,
            })
            .sum()
    }

    /// `A psi`.
    pub fn amul(&self, psi: &[Real]) -> Vec<Real> {
        (0..self.n_cells())
            .map(|cell| self.diag[cell] * psi[cell] + self.off_diag_sum(cell, psi))
            .collect()
    }

    /// `b - A psi`.
    pub fn residual(&self, psi: &[Real]) -> Vec<Real> {
        self.amul(psi)
            .iter()
            .zip(&self.source)
            .map(|(a, b)| b - a)
            .collect()
    }

    /// Normalisation factor for residuals, insensitive to the absolute level
    /// of `psi`: `sum(|A psi - A psi_ref| + |b - A psi_ref|)`, `psi_ref` the
    /// mean of `psi`.
    pub fn norm_factor(&self, psi: &[Real]) -> Real {
        let n = psi.len().max(1) as Real;
        let psi_ref = psi.iter().sum::<Real>() / n;
        let reference = vec![psi_ref; psi.len()];
        let a_psi = self.amul(psi);
        let a_ref = self.amul(&reference);
        a_psi
            .iter()
            .zip(&a_ref)
            .zip(&self.source)
            .map(|((ap, ar), b)| (ap - ar).abs() + (b - ar).abs())
            .sum::<Real>()
            + 1e-20
    }

    /// Normalised residual `sum|b - A psi| / norm_factor`.
    pub fn normalised_residual(&self, psi: &[Real]) -> Real {
        let r: Real = self.residual(psi).iter().map(|r| r.abs()).sum();
        r / self.norm_factor(psi)
    }

    /// Implicit under-relaxation.
    ///
    /// The diagonal is raised to at least the off-diagonal magnitude and
    /// divided by `factor`; the source takes the matching explicit
    /// correction so the converged solution is unchanged.
    pub fn relax(&mut self, factor: Real, psi: &ScalarField) -> FvmResult<()> {
        check_len("relaxed field", self.n_cells(), psi.len())?;
        if factor >= 1.0 {
            return Ok(());
        }
        for cell in 0..self.n_cells() {
            let d0 = self.diag[cell];
            let dominant = d0.abs().max(self.off_diag_mag(cell));
            let d1 = dominant / factor;
            self.source[cell] += (d1 - d0) * psi[cell];
            self.diag[cell] = d1;
        }
        Ok(())
    }

    /// Fix the solution in the given cells.
    ///
    /// Each fixed row becomes `diag * psi = diag * value`; the fixed value's
    /// coupling into neighbouring rows is moved to their sources.
    pub fn set_values(&mut self, cells: &[usize], values: &[Real]) -> FvmResult<()> {
        check_len("fixed values", cells.len(), values.len())?;
        let mesh = self.mesh;
        let faces = mesh.internal_faces();
        for (&cell, &value) in cells.iter().zip(values) {
            if cell >= self.n_cells() {
                return Err(SgError::IndexOob {
                    what: "fixed cell",
                    index: cell,
                    len: self.n_cells(),
                }
                .into());
            }
            if self.diag[cell] == 0.0 {
                self.diag[cell] = 1.0;
            }
            self.source[cell] = self.diag[cell] * value;
            for &face in mesh.cell_faces(cell) {
                match face {
                    FaceRef::Owner(f) => {
                        self.source[faces[f].neighbour] -= self.lower[f] * value;
                        self.upper[f] = 0.0;
                        self.lower[f] = 0.0;
                    }
                    FaceRef::Neighbour(f) => {
                        self.source[faces[f].owner] -= self.upper[f] * value;
                        self.upper[f] = 0.0;
                        self.lower[f] = 0.0;
                    }
                    FaceRef::Boundary(_) => {}
                }
            }
        }
        Ok(())
    }

    fn combine(mut self, rhs: &FvMatrix<'m>, sign: Real) -> Self {
        for (a, b) in self.diag.iter_mut().zip(&rhs.diag) {
            *a += sign * b;
        }
        for (a, b) in self.upper.iter_mut().zip(&rhs.upper) {
            *a += sign * b;
        }
        for (a, b) in self.lower.iter_mut().zip(&rhs.lower) {
            *a += sign * b;
        }
        for (a, b) in self.source.iter_mut().zip(&rhs.source) {
            *a += sign * b;
        }
        self
    }
}

impl<'m> Add for FvMatrix<'m> {
    type Output = FvMatrix<'m>;

    fn add(self, rhs: FvMatrix<'m>) -> FvMatrix<'m> {
        self.combine(&rhs, 1.0)
    }
}

impl<'m> Sub for FvMatrix<'m> {
    type Output = FvMatrix<'m>;

    fn sub(self, rhs: FvMatrix<'m>) -> FvMatrix<'m> {
        self.combine(&rhs, -1.0)
    }
}

impl<'m> Neg for FvMatrix<'m> {
    type Output = FvMatrix<'m>;

    fn neg(mut self) -> FvMatrix<'m> {
        for v in self
            .diag
            .iter_mut()
            .chain(self.upper.iter_mut())
            .chain(self.lower.iter_mut())
            .chain(self.source.iter_mut())
        {
            *v = -*v;
        }
        self
    }
}
