//! Case runner.

use serde::{Deserialize, Serialize};
use sg_core::timing::closure_timing;
use sg_core::{Real, ScalarField};
use sg_fvm::TimeState;
use sg_les::{build_sources, CorrectReport, DynamicSmagorinsky, LesContext, SgsClosure};

use crate::case::{validate_case, CaseConfig};
use crate::error::SimResult;
use crate::host::PrescribedFlowHost;

/// Summary of the closure state after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub time: Real,
    pub k_mean: Real,
    pub k_min: Real,
    pub k_max: Real,
    pub nut_max: Real,
    pub cd_max: Real,
    pub ce_max: Real,
    pub solver_iterations: usize,
    pub converged: bool,
}

impl StepRecord {
    fn from_report(step: usize, time: Real, report: &CorrectReport) -> Self {
        Self {
            step,
            time,
            k_mean: report.k_mean,
            k_min: report.k_min,
            k_max: report.k_max,
            nut_max: report.nut_max,
            cd_max: report.cd_max,
            ce_max: report.ce_max,
            solver_iterations: report.performance.iterations,
            converged: report.performance.converged,
        }
    }
}

/// Recorded steps of one case run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub case: String,
    pub n_cells: usize,
    pub steps: Vec<StepRecord>,
}

impl RunRecord {
    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }
}

/// Run the closure for `case.time.steps` steps against the case's frozen flow.
pub fn run_case(case: &CaseConfig) -> SimResult<RunRecord> {
    validate_case(case)?;

    let mesh = case.mesh.build()?;
    let n_cells = mesh.n_cells();
    let host = PrescribedFlowHost::new(&mesh, &case.flow, &case.fluid)?;
    let mut time = TimeState::new(case.time.time_step())?;

    let k0 = ScalarField::uniform("k", n_cells, case.initial_k);
    let sources = build_sources(&case.sources, n_cells)?;
    let mut model = DynamicSmagorinsky::new(&LesContext::new(&mesh, &time), &host, &case.les, k0)?
        .with_sources(Box::new(sources));

    closure_timing::reset_all();
    tracing::info!(case = %case.name, cells = n_cells, steps = case.time.steps, "starting run");

    let mut steps = Vec::new();
    for step in 1..=case.time.steps {
        let ctx = LesContext::new(&mesh, &time);
        let report = model.correct(&ctx, &host)?;
        if !report.performance.converged {
            tracing::warn!(step, "k solve did not converge");
        }
        if step % case.time.record_every == 0 || step == case.time.steps {
            steps.push(StepRecord::from_report(step, time.value, &report));
        }
        time.advance();
    }

    closure_timing::log_summary();
    let record = RunRecord {
        case: case.name.clone(),
        n_cells,
        steps,
    };
    if let Some(last) = record.last() {
        tracing::info!(
            case = %case.name,
            time = last.time,
            k_mean = last.k_mean,
            nut_max = last.nut_max,
            "run finished"
        );
    }
    Ok(record)
}
