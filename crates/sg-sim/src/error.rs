//! Error types for case handling and runs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid case: {what}")]
    Config { what: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] sg_mesh::MeshError),

    #[error("Discretisation error: {0}")]
    Fvm(#[from] sg_fvm::FvmError),

    #[error("Closure error: {0}")]
    Les(#[from] sg_les::LesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SimError::Config { what: what.into() }
    }
}
