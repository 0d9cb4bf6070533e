//! sg-sim: reference host for the SGS closure.
//!
//! Runs the dynamic Smagorinsky closure against a prescribed (frozen)
//! resolved flow described by a YAML case file, and records per-step
//! summaries of the closure state.

pub mod case;
pub mod error;
pub mod host;
pub mod run;

pub use case::{load_json, load_yaml, save_yaml, validate_case, CaseConfig, FluidDef, TimeDef};
pub use error::{SimError, SimResult};
pub use host::{FlowProfile, PrescribedFlowHost};
pub use run::{run_case, RunRecord, StepRecord};
