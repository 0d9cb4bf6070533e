//! Error types for the SGS closure.

use sg_fvm::FvmError;
use thiserror::Error;

/// Errors reported by the closure.
///
/// Numerical degeneracies inside the closure are clamped, not reported;
/// these variants cover configuration and upstream problems only.
#[derive(Error, Debug)]
pub enum LesError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Field size mismatch: {what} has {actual} values, expected {expected}")]
    FieldSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Discretisation error: {0}")]
    Fvm(#[from] FvmError),
}

pub type LesResult<T> = Result<T, LesError>;

impl LesError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        LesError::InvalidConfig { what: what.into() }
    }
}

pub(crate) fn check_cells(what: &'static str, expected: usize, actual: usize) -> LesResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LesError::FieldSize {
            what,
            expected,
            actual,
        })
    }
}
