//! Transport equation for the subgrid kinetic energy.

use sg_core::timing::{closure_timing, Timer};
use sg_core::{dev, double_dot, symm, Real, ScalarField, TensorField, SMALL};
use sg_fvm::{fvc, fvm, FvMatrix, LinearSolver, SolverPerformance};

use crate::coefficients::CoefficientEngine;
use crate::error::LesResult;
use crate::host::{LesContext, TurbulenceHost};
use crate::sources::SourceHook;

/// Solver controls for one `k` solve.
#[derive(Clone, Copy)]
pub struct KControls<'a> {
    pub k_min: Real,
    pub relaxation: Real,
    pub solver: &'a dyn LinearSolver,
}

/// Result of one `k` solve.
#[derive(Debug, Clone)]
pub struct KSolve {
    pub performance: SolverPerformance,
    pub ce: ScalarField,
    /// Cells raised to `k_min` after the solve.
    pub k_floored: usize,
    pub production_max: Real,
}

/// Production `G = 2 nut (grad(U) : dev(symm(grad(U))))`.
pub fn production(grad_u: &TensorField, nut: &ScalarField) -> ScalarField {
    grad_u.zip_map(nut, "G", |g, nut| 2.0 * nut * double_dot(g, &dev(&symm(g))))
}

/// Assemble the `k` equation.
///
/// ```text
/// ddt(alpha rho k) + div(alphaRhoPhi, k) - laplacian(alpha rho DkEff, k)
///   == alpha rho G - SuSp(2/3 alpha rho divU, k) - Sp(Ce alpha rho sqrt(k)/delta, k)
///      + sources
/// ```
///
/// with `DkEff = nut + nu`. Convection is bounded upwind, so a host flux
/// that does not conserve mass cannot destroy diagonal dominance.
#[allow(clippy::too_many_arguments)]
pub fn assemble<'m>(
    ctx: &LesContext<'m>,
    host: &dyn TurbulenceHost,
    sources: &dyn SourceHook,
    delta: &ScalarField,
    nut: &ScalarField,
    g: &ScalarField,
    ce: &ScalarField,
    k: &ScalarField,
) -> LesResult<FvMatrix<'m>> {
    let mesh = ctx.mesh;
    let alpha = host.alpha();
    let rho = host.rho();
    let alpha_rho = alpha.zip_map(rho, "alphaRho", |a, r| a * r);

    let dk_eff = fvc::gather(mesh, "alphaRhoDkEff", |c| {
        alpha_rho[c] * (nut[c] + host.nu()[c])
    });
    let div_u = fvc::div(mesh, host.phi());
    let compression = alpha_rho.zip_map(&div_u, "compression", |ar, d| 2.0 / 3.0 * ar * d);
    let dissipation = fvc::gather(mesh, "dissipation", |c| {
        ce[c] * alpha_rho[c] * k[c].sqrt() / delta[c]
    });
    let alpha_rho_g = alpha_rho.zip_map(g, "alphaRhoG", |ar, g| ar * g);

    let lhs = fvm::ddt(mesh, ctx.time, alpha, rho, k)?
        + fvm::bounded_div(mesh, host.alpha_rho_phi(), k)?
        - fvm::laplacian(mesh, &dk_eff, k)?;
    let rhs = fvm::su(mesh, &alpha_rho_g)?
        - fvm::su_sp(mesh, &compression, k)?
        - fvm::sp(mesh, &dissipation, k)?
        + sources.add_sources(mesh, alpha, rho, k)?;
    Ok(lhs - rhs)
}

/// Advance `k` by one step. On error `k` is left unchanged.
///
/// `grad_u` is the velocity gradient of the current step and `nut` the eddy
/// viscosity already updated from it.
#[allow(clippy::too_many_arguments)]
pub fn solve_k(
    ctx: &LesContext<'_>,
    host: &dyn TurbulenceHost,
    engine: &CoefficientEngine<'_>,
    sources: &dyn SourceHook,
    controls: KControls<'_>,
    delta: &ScalarField,
    grad_u: &TensorField,
    nut: &ScalarField,
    k: &mut ScalarField,
) -> LesResult<KSolve> {
    let timer = Timer::start();
    let d = grad_u.map("D", |g| dev(&symm(g)));
    let g = production(grad_u, nut);

    let mut kk = engine.subgrid_energy();
    kk.max_with(SMALL);
    let nu_eff = nut.zip_map(host.nu(), "nuEff", |nut, nu| nut + nu);
    let coeff_timer = Timer::start();
    let ce = engine.c_e(&d, &kk, &nu_eff);
    coeff_timer.stop_into(&closure_timing::COEFFICIENTS);

    let mut eqn = assemble(ctx, host, sources, delta, nut, &g, &ce, k)?;
    eqn.relax(controls.relaxation, k)?;
    sources.constrain(k, &mut eqn)?;
    timer.stop_into(&closure_timing::K_ASSEMBLY);

    // k is only replaced once the solve has succeeded
    let mut k_new = k.clone();
    let timer = Timer::start();
    let performance = controls.solver.solve(&eqn, &mut k_new)?;
    timer.stop_into(&closure_timing::K_SOLVE);

    sources.correct_field(&mut k_new);
    let k_floored = k_new.max_with(controls.k_min);
    *k = k_new;

    Ok(KSolve {
        performance,
        ce,
        k_floored,
        production_max: g.max_value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::units::s;
    use sg_core::{Tensor, Vector, VectorField};
    use sg_fvm::{FaceFlux, FvmError, FvmResult, TimeState};
    use sg_mesh::{CartesianSpec, Mesh};

    use crate::filter::SimpleFilter;
    use crate::sources::NoSources;

    struct AxialFlow {
        alpha: ScalarField,
        rho: ScalarField,
        u: VectorField,
        phi: FaceFlux,
        nu: ScalarField,
    }

    impl AxialFlow {
        /// `U = (rate x, 0, 0)`
        fn new(mesh: &Mesh, rate: Real) -> Self {
            let n = mesh.n_cells();
            let u = VectorField::new(
                "U",
                mesh.cell_centres()
                    .iter()
                    .map(|c| Vector::new(rate * c.x, 0.0, 0.0))
                    .collect(),
            );
            Self {
                alpha: ScalarField::uniform("alpha", n, 1.0),
                rho: ScalarField::uniform("rho", n, 1.0),
                phi: fvc::flux(mesh, &u),
                u,
                nu: ScalarField::uniform("nu", n, 1e-5),
            }
        }
    }

    impl TurbulenceHost for AxialFlow {
        fn alpha(&self) -> &ScalarField {
            &self.alpha
        }
        fn rho(&self) -> &ScalarField {
            &self.rho
        }
        fn velocity(&self) -> &VectorField {
            &self.u
        }
        fn phi(&self) -> &FaceFlux {
            &self.phi
        }
        fn alpha_rho_phi(&self) -> &FaceFlux {
            &self.phi
        }
        fn nu(&self) -> &ScalarField {
            &self.nu
        }
    }

    fn line_mesh() -> Mesh {
        CartesianSpec::new([6, 1, 1], [6.0, 1.0, 1.0]).build().unwrap()
    }

    /// Everything the assembled equation holds except the compressibility
    /// term, which is then isolated as `eqn - base`.
    fn compressibility_term<'m>(
        ctx: &LesContext<'m>,
        host: &AxialFlow,
        k: &ScalarField,
    ) -> FvMatrix<'m> {
        let mesh = ctx.mesh;
        let n = mesh.n_cells();
        let zero = ScalarField::zeros("zero", n);
        let delta = ScalarField::uniform("delta", n, 1.0);
        let eqn = assemble(ctx, host, &NoSources, &delta, &zero, &zero, &zero, k).unwrap();
        let base = fvm::ddt(mesh, ctx.time, &host.alpha, &host.rho, k).unwrap()
            + fvm::bounded_div(mesh, &host.phi, k).unwrap()
            - fvm::laplacian(mesh, &host.nu, k).unwrap();
        eqn - base
    }

    #[test]
    fn compression_adds_explicit_source() {
        let mesh = line_mesh();
        let time = TimeState::new(s(0.1)).unwrap();
        let ctx = LesContext::new(&mesh, &time);
        let host = AxialFlow::new(&mesh, -1.0);
        let k = ScalarField::new("k", vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let div_u = fvc::div(&mesh, &host.phi);

        let term = compressibility_term(&ctx, &host, &k);
        for cell in 0..6 {
            assert!(div_u[cell] < 0.0);
            assert!(term.diag[cell].abs() < 1e-12);
            // Moves to the right-hand side as +2/3 |divU| k V
            let expected = -2.0 / 3.0 * div_u[cell] * k[cell];
            assert!((term.source[cell] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn expansion_goes_on_the_diagonal() {
        let mesh = line_mesh();
        let time = TimeState::new(s(0.1)).unwrap();
        let ctx = LesContext::new(&mesh, &time);
        let host = AxialFlow::new(&mesh, 1.0);
        let k = ScalarField::uniform("k", 6, 0.3);
        let div_u = fvc::div(&mesh, &host.phi);

        let term = compressibility_term(&ctx, &host, &k);
        for cell in 0..6 {
            assert!(div_u[cell] > 0.0);
            assert!((term.diag[cell] - 2.0 / 3.0 * div_u[cell]).abs() < 1e-12);
            assert!(term.source[cell].abs() < 1e-12);
        }
    }

    /// Scribbles over the field, then fails.
    struct Diverging;

    impl LinearSolver for Diverging {
        fn name(&self) -> &'static str {
            "Diverging"
        }

        fn solve(
            &self,
            _matrix: &FvMatrix<'_>,
            psi: &mut ScalarField,
        ) -> FvmResult<SolverPerformance> {
            psi.apply(|v| *v = -1e300);
            Err(FvmError::Singular {
                what: "diverged".into(),
            })
        }
    }

    #[test]
    fn failed_solve_leaves_k_untouched() {
        let mesh = line_mesh();
        let time = TimeState::new(s(10.0)).unwrap();
        let ctx = LesContext::new(&mesh, &time);
        let host = AxialFlow::new(&mesh, -1.0);
        let delta = ScalarField::uniform("delta", 6, 1.0);
        let engine = CoefficientEngine::new(&mesh, &SimpleFilter, &delta, &host.rho, &host.u);
        let grad_u = fvc::grad_vector(&mesh, &host.u);
        let nut = ScalarField::uniform("nut", 6, 0.01);
        let mut k = ScalarField::new("k", vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let before = k.clone();

        let controls = KControls {
            k_min: 1e-8,
            relaxation: 1.0,
            solver: &Diverging,
        };
        let result = solve_k(
            &ctx, &host, &engine, &NoSources, controls, &delta, &grad_u, &nut, &mut k,
        );
        assert!(matches!(
            result,
            Err(crate::LesError::Fvm(FvmError::Singular { .. }))
        ));
        assert_eq!(k, before);
    }

    #[test]
    fn production_of_pure_shear() {
        // dU_x/dy = 2: grad(U)_yx = 2
        let g = Tensor::new(0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let grad_u = TensorField::uniform("grad(U)", 2, g);
        let nut = ScalarField::new("nut", vec![0.5, 0.0]);
        let p = production(&grad_u, &nut);
        // grad(U) : dev(symm(grad(U))) = 2 * 1 = 2
        assert!((p[0] - 2.0).abs() < 1e-14);
        assert_eq!(p[1], 0.0);
    }

    #[test]
    fn production_vanishes_without_strain() {
        let grad_u = TensorField::zeros("grad(U)", 3);
        let nut = ScalarField::uniform("nut", 3, 1.0);
        assert!(production(&grad_u, &nut).iter().all(|g| *g == 0.0));
    }
}
