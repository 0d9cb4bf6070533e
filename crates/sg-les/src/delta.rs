//! LES filter width.

use serde::{Deserialize, Serialize};
use sg_core::units::Length;
use sg_core::{Real, ScalarField};
use sg_mesh::Mesh;

use crate::error::{LesError, LesResult};

fn one() -> Real {
    1.0
}

/// How the filter width `delta` is derived from the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaConfig {
    /// `coeff * V^(1/3)` per cell.
    CubeRootVol {
        #[serde(default = "one")]
        coeff: Real,
    },
    /// The same width everywhere.
    Uniform { value: Real },
}

impl Default for DeltaConfig {
    fn default() -> Self {
        DeltaConfig::CubeRootVol { coeff: 1.0 }
    }
}

impl DeltaConfig {
    pub fn uniform(width: Length) -> Self {
        DeltaConfig::Uniform { value: width.value }
    }

    pub fn validate(&self) -> LesResult<()> {
        let (what, v) = match *self {
            DeltaConfig::CubeRootVol { coeff } => ("cube_root_vol coeff", coeff),
            DeltaConfig::Uniform { value } => ("uniform delta", value),
        };
        if v.is_finite() && v > 0.0 {
            Ok(())
        } else {
            Err(LesError::config(format!("{what} must be positive, got {v}")))
        }
    }

    pub fn compute(&self, mesh: &Mesh) -> ScalarField {
        match *self {
            DeltaConfig::CubeRootVol { coeff } => ScalarField::new(
                "delta",
                mesh.cell_volumes().iter().map(|v| coeff * v.cbrt()).collect(),
            ),
            DeltaConfig::Uniform { value } => ScalarField::uniform("delta", mesh.n_cells(), value),
        }
    }
}
