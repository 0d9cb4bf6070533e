//! sg-les: dynamic Smagorinsky subgrid-scale closure.
//!
//! The closure computes its model coefficients from the resolved flow by a
//! least-squares Germano identity between grid and test-filter scales,
//! derives a bounded eddy viscosity and advances a one-equation model for
//! the subgrid kinetic energy `k`.
//!
//! Everything the closure needs from the flow solver comes through
//! [`TurbulenceHost`]; mesh and time are passed explicitly in a
//! [`LesContext`].
//!
//! ```no_run
//! # use sg_les::*;
//! # fn demo(ctx: &LesContext<'_>, host: &dyn TurbulenceHost, k0: sg_core::ScalarField) -> LesResult<()> {
//! let mut model = DynamicSmagorinsky::new(ctx, host, &LesProperties::default(), k0)?;
//! let report = model.correct(ctx, host)?;
//! println!("k in [{}, {}]", report.k_min, report.k_max);
//! # Ok(())
//! # }
//! ```

pub mod coefficients;
pub mod delta;
pub mod error;
pub mod filter;
pub mod host;
pub mod k_equation;
pub mod model;
pub mod properties;
pub mod sgs_update;
pub mod sources;

pub use coefficients::CoefficientEngine;
pub use delta::DeltaConfig;
pub use error::{LesError, LesResult};
pub use filter::{build_filter, FilterConfig, LaplaceFilter, LesFilter, SimpleFilter};
pub use host::{LesContext, SgsClosure, TurbulenceHost};
pub use model::{CorrectReport, DynamicSmagorinsky};
pub use properties::LesProperties;
pub use sources::{
    build_sources, FixedValueConstraint, NoSources, SourceConfig, SourceHook, SourceList,
    UniformSource,
};
