//! Mesh construction and validation errors.

use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Cell {cell} has non-positive volume {volume}")]
    NonPositiveVolume { cell: usize, volume: f64 },

    #[error("Face {face} refers to non-existent cell {cell}")]
    InvalidCellRef { face: usize, cell: usize },

    #[error("Face {face} has the same owner and neighbour ({cell})")]
    SelfConnectedFace { face: usize, cell: usize },

    #[error("Face {face} has a degenerate area vector")]
    DegenerateFace { face: usize },

    #[error("Face {face} has interpolation weight {weight} outside (0, 1)")]
    InvalidWeight { face: usize, weight: f64 },

    #[error("Cell {cell} is not closed (|sum Sf| = {residual})")]
    OpenCell { cell: usize, residual: f64 },

    #[error("Boundary face {face} refers to unknown patch {patch}")]
    InvalidPatchRef { face: usize, patch: usize },

    #[error("Invalid mesh definition: {what}")]
    InvalidSpec { what: &'static str },
}
