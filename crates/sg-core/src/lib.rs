//! sg-core: stable foundation for sgsflow.
//!
//! Contains:
//! - numeric (Real + tolerances + small-number floors)
//! - tensor (vector/tensor algebra on nalgebra types)
//! - field (cell-centred fields with data-parallel maps)
//! - units (uom SI types + constructors)
//! - timing (opt-in phase timers)
//! - error (shared error types)

pub mod error;
pub mod field;
pub mod numeric;
pub mod tensor;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SgError, SgResult};
pub use field::{Field, ScalarField, TensorField, VectorField};
pub use numeric::*;
pub use tensor::*;
