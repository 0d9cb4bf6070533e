//! The dynamic Smagorinsky closure.

use sg_core::timing::{closure_timing, Timer};
use sg_core::{symm, Real, ScalarField};
use sg_fvm::{fvc, LinearSolver, SolverPerformance};

use crate::coefficients::CoefficientEngine;
use crate::error::{check_cells, LesResult};
use crate::filter::{build_filter, LesFilter};
use crate::host::{check_host, LesContext, SgsClosure, TurbulenceHost};
use crate::k_equation::{solve_k, KControls};
use crate::properties::LesProperties;
use crate::sgs_update::update_sgs_fields;
use crate::sources::{NoSources, SourceHook};

/// Diagnostics from one [`DynamicSmagorinsky::correct`] call.
#[derive(Debug, Clone)]
pub struct CorrectReport {
    pub time_index: usize,
    pub performance: SolverPerformance,
    pub cd_min: Real,
    pub cd_max: Real,
    pub ce_max: Real,
    pub nut_min: Real,
    pub nut_max: Real,
    pub k_min: Real,
    pub k_max: Real,
    pub k_mean: Real,
    pub production_max: Real,
    /// Cells where `nut` was held at `-nu`.
    pub nut_floored: usize,
    /// Cells where `k` was raised to `k_min`.
    pub k_floored: usize,
}

/// Dynamic Smagorinsky model with a transport equation for `k`.
///
/// The model owns `k` (the only state carried between calls) and the eddy
/// viscosity `nut`. Coefficients are recomputed from the resolved flow on
/// every [`correct`](SgsClosure::correct).
pub struct DynamicSmagorinsky {
    props: LesProperties,
    filter: Box<dyn LesFilter>,
    solver: Box<dyn LinearSolver>,
    sources: Box<dyn SourceHook>,
    delta: ScalarField,
    k: ScalarField,
    nut: ScalarField,
}

impl DynamicSmagorinsky {
    /// Build the model around an initial `k`, which is bounded at `k_min`.
    pub fn new(
        ctx: &LesContext<'_>,
        host: &dyn TurbulenceHost,
        props: &LesProperties,
        k0: ScalarField,
    ) -> LesResult<Self> {
        props.validate()?;
        let mesh = ctx.mesh;
        check_host(mesh, host)?;
        check_cells("k", mesh.n_cells(), k0.len())?;

        let mut k = k0.rename("k");
        let raised = k.max_with(props.k_min);
        if raised > 0 {
            tracing::debug!(cells = raised, k_min = props.k_min, "bounded initial k");
        }

        tracing::info!(
            filter = props.filter.kind(),
            delta = ?props.delta,
            k_min = props.k_min,
            k_relaxation = props.k_relaxation,
            "dynamicSmagorinsky coefficients"
        );

        Ok(Self {
            filter: build_filter(&props.filter)?,
            solver: props.solver.build(),
            sources: Box::new(NoSources),
            delta: props.delta.compute(mesh),
            nut: ScalarField::zeros("nut", mesh.n_cells()),
            props: props.clone(),
            k,
        })
    }

    pub fn with_sources(mut self, sources: Box<dyn SourceHook>) -> Self {
        self.sources = sources;
        self
    }

    pub fn delta(&self) -> &ScalarField {
        &self.delta
    }

    pub fn properties(&self) -> &LesProperties {
        &self.props
    }

    pub fn filter(&self) -> &dyn LesFilter {
        self.filter.as_ref()
    }
}

impl SgsClosure for DynamicSmagorinsky {
    fn correct(
        &mut self,
        ctx: &LesContext<'_>,
        host: &dyn TurbulenceHost,
    ) -> LesResult<CorrectReport> {
        let mesh = ctx.mesh;
        check_host(mesh, host)?;
        check_cells("k", mesh.n_cells(), self.k.len())?;
        check_cells("delta", mesh.n_cells(), self.delta.len())?;

        let grad_u = fvc::grad_vector(mesh, host.velocity());
        let sij = grad_u.map("Sij", symm);

        let timer = Timer::start();
        let engine = CoefficientEngine::new(
            mesh,
            self.filter.as_ref(),
            &self.delta,
            host.rho(),
            host.velocity(),
        );
        let sgs = update_sgs_fields(
            &engine,
            mesh,
            &self.delta,
            &sij,
            host,
            self.sources.as_ref(),
            &mut self.nut,
        );
        timer.stop_into(&closure_timing::NUT_UPDATE);
        self.correct_nut();

        let engine = CoefficientEngine::new(
            mesh,
            self.filter.as_ref(),
            &self.delta,
            host.rho(),
            host.velocity(),
        );
        let controls = KControls {
            k_min: self.props.k_min,
            relaxation: self.props.k_relaxation,
            solver: self.solver.as_ref(),
        };
        let solved = solve_k(
            ctx,
            host,
            &engine,
            self.sources.as_ref(),
            controls,
            &self.delta,
            &grad_u,
            &self.nut,
            &mut self.k,
        )?;

        let report = CorrectReport {
            time_index: ctx.time.index,
            cd_min: sgs.cd.min_value(),
            cd_max: sgs.cd.max_value(),
            ce_max: solved.ce.max_value(),
            nut_min: self.nut.min_value(),
            nut_max: self.nut.max_value(),
            k_min: self.k.min_value(),
            k_max: self.k.max_value(),
            k_mean: self.k.mean(),
            production_max: solved.production_max,
            nut_floored: sgs.nut_floored,
            k_floored: solved.k_floored,
            performance: solved.performance,
        };
        tracing::debug!(
            time_index = report.time_index,
            solver = report.performance.solver,
            iterations = report.performance.iterations,
            initial_residual = report.performance.initial_residual,
            final_residual = report.performance.final_residual,
            cd_max = report.cd_max,
            nut_max = report.nut_max,
            k_min = report.k_min,
            k_max = report.k_max,
            nut_floored = report.nut_floored,
            k_floored = report.k_floored,
            "dynamicSmagorinsky correct"
        );
        Ok(report)
    }

    fn nut(&self) -> &ScalarField {
        &self.nut
    }

    fn k(&self) -> &ScalarField {
        &self.k
    }

    fn read(&mut self, ctx: &LesContext<'_>, props: &LesProperties) -> LesResult<()> {
        props.validate()?;
        let delta = props.delta.compute(ctx.mesh);
        if self.filter.kind() == props.filter.kind() {
            self.filter.read(&props.filter)?;
        } else {
            self.filter = build_filter(&props.filter)?;
        }
        self.solver = props.solver.build();
        self.delta = delta;
        self.props = props.clone();
        tracing::info!(filter = props.filter.kind(), "re-read LES properties");
        Ok(())
    }
}
