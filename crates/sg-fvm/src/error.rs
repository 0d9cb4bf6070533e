//! Error types for discretisation and linear solves.

use sg_core::SgError;
use sg_mesh::MeshError;
use thiserror::Error;

/// Errors raised by operators and solvers.
///
/// A linear solve that stops at its iteration cap is *not* an error; it is
/// reported through [`SolverPerformance::converged`](crate::SolverPerformance).
#[derive(Error, Debug)]
pub enum FvmError {
    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Singular matrix: {what}")]
    Singular { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Numeric error: {0}")]
    Core(#[from] SgError),
}

pub type FvmResult<T> = Result<T, FvmError>;

/// Check that a per-cell or per-face container has the expected length.
pub fn check_len(what: &'static str, expected: usize, actual: usize) -> FvmResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FvmError::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}
