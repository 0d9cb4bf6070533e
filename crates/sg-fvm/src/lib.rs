//! Finite-volume operators for sgsflow.
//!
//! This crate provides the discretisation a turbulence closure consumes:
//! explicit operators (`fvc`) producing fields, implicit operators (`fvm`)
//! producing [`FvMatrix`] terms, under-relaxation and iteration-capped linear
//! solvers. Schemes are fixed: Gauss linear gradients, linear interpolation,
//! upwind convection, implicit Euler in time.

pub mod error;
pub mod fvc;
pub mod fvm;
pub mod matrix;
pub mod solver;
pub mod surface;
pub mod time;

pub use error::{FvmError, FvmResult};
pub use matrix::FvMatrix;
pub use solver::{DenseLu, GaussSeidel, LinearSolver, SolverPerformance, SolverSettings};
pub use surface::{FaceFlux, SurfaceField};
pub use time::TimeState;
