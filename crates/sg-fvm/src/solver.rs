//! Linear solvers for [`FvMatrix`] equations.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use sg_core::{ensure_finite, Real, ScalarField};

use crate::error::{check_len, FvmError, FvmResult};
use crate::matrix::FvMatrix;

/// Largest system `DenseLu` will factorise.
pub const DENSE_LU_MAX_CELLS: usize = 4096;

/// Outcome of one linear solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverPerformance {
    pub solver: &'static str,
    pub field: String,
    pub initial_residual: Real,
    pub final_residual: Real,
    pub iterations: usize,
    pub converged: bool,
}

/// Solves `A psi = b` in place.
pub trait LinearSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, matrix: &FvMatrix<'_>, psi: &mut ScalarField) -> FvmResult<SolverPerformance>;
}

/// Gauss-Seidel sweeps with normalised-residual convergence checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussSeidel {
    /// Maximum number of sweeps
    pub max_iterations: usize,
    /// Absolute tolerance on the normalised residual
    pub tolerance: Real,
    /// Tolerance relative to the initial residual (0 disables)
    pub rel_tol: Real,
}

impl Default for GaussSeidel {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            rel_tol: 0.0,
        }
    }
}

impl GaussSeidel {
    fn sweep(matrix: &FvMatrix<'_>, psi: &mut [Real]) {
        for cell in 0..psi.len() {
            let off = matrix.off_diag_sum(cell, psi);
            psi[cell] = (matrix.source[cell] - off) / matrix.diag[cell];
        }
    }

    fn converged(&self, residual: Real, initial: Real) -> bool {
        residual < self.tolerance || (self.rel_tol > 0.0 && residual < self.rel_tol * initial)
    }
}

impl LinearSolver for GaussSeidel {
    fn name(&self) -> &'static str {
        "GaussSeidel"
    }

    fn solve(&self, matrix: &FvMatrix<'_>, psi: &mut ScalarField) -> FvmResult<SolverPerformance> {
        check_len("solved field", matrix.n_cells(), psi.len())?;
        if let Some(cell) = matrix.diag.iter().position(|d| *d == 0.0) {
            return Err(FvmError::Singular {
                what: format!("zero diagonal in row {cell}"),
            });
        }

        let initial = matrix.normalised_residual(psi.values());
        let mut residual = initial;
        let mut iterations = 0;

        while !self.converged(residual, initial) && iterations < self.max_iterations {
            Self::sweep(matrix, psi.values_mut());
            iterations += 1;
            residual = ensure_finite(
                matrix.normalised_residual(psi.values()),
                "GaussSeidel residual",
            )?;
        }

        let converged = self.converged(residual, initial);
        if !converged {
            tracing::warn!(
                field = psi.name(),
                iterations,
                residual,
                "GaussSeidel reached its iteration cap"
            );
        }

        Ok(SolverPerformance {
            solver: self.name(),
            field: psi.name().to_string(),
            initial_residual: initial,
            final_residual: residual,
            iterations,
            converged,
        })
    }
}

/// Direct solve through a dense LU factorisation. Intended for small meshes
/// and as a reference for the iterative solver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DenseLu;

impl LinearSolver for DenseLu {
    fn name(&self) -> &'static str {
        "DenseLu"
    }

    fn solve(&self, matrix: &FvMatrix<'_>, psi: &mut ScalarField) -> FvmResult<SolverPerformance> {
        let n = matrix.n_cells();
        check_len("solved field", n, psi.len())?;
        if n > DENSE_LU_MAX_CELLS {
            return Err(FvmError::InvalidArg {
                what: "mesh too large for DenseLu",
            });
        }

        let mut a = DMatrix::<Real>::zeros(n, n);
        for (cell, d) in matrix.diag.iter().enumerate() {
            a[(cell, cell)] = *d;
        }
        for (f, face) in matrix.mesh().internal_faces().iter().enumerate() {
            a[(face.owner, face.neighbour)] += matrix.upper[f];
            a[(face.neighbour, face.owner)] += matrix.lower[f];
        }
        let b = DVector::from_column_slice(&matrix.source);

        let initial = matrix.normalised_residual(psi.values());
        let x = a.lu().solve(&b).ok_or_else(|| FvmError::Singular {
            what: format!("LU factorisation of {} failed", psi.name()),
        })?;
        psi.values_mut().copy_from_slice(x.as_slice());
        let final_residual = matrix.normalised_residual(psi.values());

        Ok(SolverPerformance {
            solver: self.name(),
            field: psi.name().to_string(),
            initial_residual: initial,
            final_residual,
            iterations: 1,
            converged: true,
        })
    }
}

/// Solver selection as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolverSettings {
    GaussSeidel(GaussSeidel),
    DenseLu,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::GaussSeidel(GaussSeidel::default())
    }
}

impl SolverSettings {
    pub fn build(&self) -> Box<dyn LinearSolver> {
        match *self {
            SolverSettings::GaussSeidel(gs) => Box::new(gs),
            SolverSettings::DenseLu => Box::new(DenseLu),
        }
    }

    pub fn validate(&self) -> FvmResult<()> {
        match self {
            SolverSettings::GaussSeidel(gs) => {
                if gs.max_iterations == 0 {
                    return Err(FvmError::InvalidArg {
                        what: "max_iterations must be positive",
                    });
                }
                if !(gs.tolerance >= 0.0 && gs.rel_tol >= 0.0) {
                    return Err(FvmError::InvalidArg {
                        what: "solver tolerances must be non-negative",
                    });
                }
                Ok(())
            }
            SolverSettings::DenseLu => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fvm;
    use sg_core::units::s;
    use sg_mesh::{CartesianSpec, Mesh};

    fn mesh() -> Mesh {
        CartesianSpec::new([6, 4, 1], [1.5, 1.0, 0.25]).build().unwrap()
    }

    fn diffusion_system<'m>(mesh: &'m Mesh, psi: &ScalarField) -> FvMatrix<'m> {
        let time = crate::TimeState::new(s(0.1)).unwrap();
        let ones = ScalarField::uniform("one", mesh.n_cells(), 1.0);
        let gamma = ScalarField::uniform("gamma", mesh.n_cells(), 0.05);
        fvm::ddt(mesh, &time, &ones, &ones, psi).unwrap()
            - fvm::laplacian(mesh, &gamma, psi).unwrap()
    }

    fn bumpy(mesh: &Mesh) -> ScalarField {
        ScalarField::new(
            "k",
            mesh.cell_centres()
                .iter()
                .map(|c| 1.0 + (3.0 * c.x).sin() * c.y)
                .collect(),
        )
    }

    #[test]
    fn gauss_seidel_matches_dense_lu() {
        let mesh = mesh();
        let k0 = bumpy(&mesh);
        let eqn = diffusion_system(&mesh, &k0);

        let mut k_gs = k0.clone();
        let gs = GaussSeidel {
            tolerance: 1e-12,
            ..GaussSeidel::default()
        };
        let perf = gs.solve(&eqn, &mut k_gs).unwrap();
        assert!(perf.converged);
        assert!(perf.iterations > 0);

        let mut k_lu = k0.clone();
        DenseLu.solve(&eqn, &mut k_lu).unwrap();

        for cell in 0..mesh.n_cells() {
            assert!((k_gs[cell] - k_lu[cell]).abs() < 1e-8);
        }
    }

    #[test]
    fn iteration_cap_is_not_an_error() {
        let mesh = mesh();
        let k0 = bumpy(&mesh);
        let eqn = diffusion_system(&mesh, &k0);
        let mut k = ScalarField::uniform("k", mesh.n_cells(), 0.0);
        let gs = GaussSeidel {
            max_iterations: 1,
            tolerance: 1e-30,
            rel_tol: 0.0,
        };
        let perf = gs.solve(&eqn, &mut k).unwrap();
        assert_eq!(perf.iterations, 1);
        assert!(!perf.converged);
    }

    #[test]
    fn zero_diagonal_is_singular() {
        let mesh = mesh();
        let eqn = FvMatrix::new(&mesh);
        let mut k = ScalarField::uniform("k", mesh.n_cells(), 0.0);
        assert!(matches!(
            GaussSeidel::default().solve(&eqn, &mut k),
            Err(FvmError::Singular { .. })
        ));
    }

    #[test]
    fn relax_with_unit_factor_is_identity() {
        let mesh = mesh();
        let k0 = bumpy(&mesh);
        let mut eqn = diffusion_system(&mesh, &k0);
        let before = eqn.clone();
        eqn.relax(1.0, &k0).unwrap();
        assert_eq!(eqn.diag, before.diag);
        assert_eq!(eqn.source, before.source);
    }

    #[test]
    fn relaxation_keeps_the_solution() {
        let mesh = mesh();
        let k0 = bumpy(&mesh);
        let eqn = diffusion_system(&mesh, &k0);
        let mut exact = k0.clone();
        DenseLu.solve(&eqn, &mut exact).unwrap();

        // Relaxing about the converged solution leaves it a fixed point
        let mut relaxed = eqn.clone();
        relaxed.relax(0.7, &exact).unwrap();
        let mut k = exact.clone();
        DenseLu.solve(&relaxed, &mut k).unwrap();
        for cell in 0..mesh.n_cells() {
            assert!((k[cell] - exact[cell]).abs() < 1e-10);
        }
    }

    #[test]
    fn settings_from_tagged_config() {
        let lu: SolverSettings = serde_yaml::from_str("type: dense_lu").unwrap();
        assert_eq!(lu, SolverSettings::DenseLu);

        let gs: SolverSettings =
            serde_yaml::from_str("type: gauss_seidel\nmax_iterations: 50").unwrap();
        let SolverSettings::GaussSeidel(gs) = gs else {
            panic!("expected gauss_seidel");
        };
        assert_eq!(gs.max_iterations, 50);
        assert_eq!(gs.tolerance, GaussSeidel::default().tolerance);
        assert_eq!(SolverSettings::GaussSeidel(gs).build().name(), "GaussSeidel");
    }

    #[test]
    fn zero_iterations_rejected() {
        let s = SolverSettings::GaussSeidel(GaussSeidel {
            max_iterations: 0,
            ..GaussSeidel::default()
        });
        assert!(s.validate().is_err());
    }
}
