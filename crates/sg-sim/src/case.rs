//! Case file schema, loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sg_core::units::{s, Density, KinViscosity, Time};
use sg_core::Real;
use sg_les::{LesProperties, SourceConfig};
use sg_mesh::CartesianSpec;

use crate::error::{SimError, SimResult};
use crate::host::FlowProfile;

/// A closure run: mesh, prescribed flow, fluid, time stepping and closure
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    pub name: String,
    pub mesh: CartesianSpec,
    pub flow: FlowProfile,
    #[serde(default)]
    pub fluid: FluidDef,
    pub time: TimeDef,
    /// Uniform initial subgrid kinetic energy (m^2/s^2).
    #[serde(default = "default_initial_k")]
    pub initial_k: Real,
    #[serde(default)]
    pub les: LesProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceConfig>,
}

fn default_initial_k() -> Real {
    1e-4
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidDef {
    /// kg/m^3
    pub density: Real,
    /// Kinematic viscosity, m^2/s
    pub nu: Real,
}

impl Default for FluidDef {
    fn default() -> Self {
        Self {
            density: 1.0,
            nu: 1e-5,
        }
    }
}

impl FluidDef {
    pub fn new(density: Density, nu: KinViscosity) -> Self {
        Self {
            density: density.value,
            nu: nu.value,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(SimError::config("fluid density must be positive"));
        }
        if !(self.nu.is_finite() && self.nu >= 0.0) {
            return Err(SimError::config("fluid nu must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDef {
    /// Time step, seconds
    pub dt: Real,
    pub steps: usize,
    /// Record every N-th step (the last step is always recorded)
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_record_every() -> usize {
    1
}

impl TimeDef {
    pub fn time_step(&self) -> Time {
        s(self.dt)
    }
}

pub fn validate_case(case: &CaseConfig) -> SimResult<()> {
    if case.name.trim().is_empty() {
        return Err(SimError::config("case name must not be empty"));
    }
    case.mesh.validate()?;
    case.flow.validate()?;
    case.fluid.validate()?;
    if !(case.time.dt.is_finite() && case.time.dt > 0.0) {
        return Err(SimError::config(format!(
            "time step must be positive, got {}",
            case.time.dt
        )));
    }
    if case.time.steps == 0 {
        return Err(SimError::config("steps must be positive"));
    }
    if case.time.record_every == 0 {
        return Err(SimError::config("record_every must be positive"));
    }
    if !(case.initial_k.is_finite() && case.initial_k >= 0.0) {
        return Err(SimError::config("initial_k must be non-negative"));
    }
    case.les.validate()?;
    let n_cells = case.mesh.n_cells();
    for source in &case.sources {
        source.validate(n_cells)?;
    }
    Ok(())
}

pub fn load_yaml(path: &Path) -> SimResult<CaseConfig> {
    let content = std::fs::read_to_string(path)?;
    let case: CaseConfig = serde_yaml::from_str(&content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn save_yaml(path: &Path, case: &CaseConfig) -> SimResult<()> {
    validate_case(case)?;
    let content = serde_yaml::to_string(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> SimResult<CaseConfig> {
    let content = std::fs::read_to_string(path)?;
    let case: CaseConfig = serde_json::from_str(&content)?;
    validate_case(&case)?;
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
name: shear
mesh:
  cells: [1, 8, 1]
  lengths: [1.0, 8.0, 1.0]
flow:
  type: shear
  rate: 2.0
time:
  dt: 0.1
  steps: 3
";

    #[test]
    fn minimal_case_fills_defaults() {
        let case: CaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        validate_case(&case).unwrap();
        assert_eq!(case.fluid, FluidDef::default());
        assert_eq!(case.les, LesProperties::default());
        assert_eq!(case.time.record_every, 1);
        assert_eq!(case.initial_k, 1e-4);
        assert!(case.sources.is_empty());
    }

    #[test]
    fn rejects_zero_steps() {
        let mut case: CaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        case.time.steps = 0;
        assert!(matches!(validate_case(&case), Err(SimError::Config { .. })));
    }

    #[test]
    fn rejects_invalid_closure_settings() {
        let mut case: CaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        case.les.k_min = -1.0;
        assert!(matches!(validate_case(&case), Err(SimError::Les(_))));
    }

    #[test]
    fn rejects_unknown_flow() {
        let text = MINIMAL.replace("type: shear", "type: vortex_ring");
        assert!(serde_yaml::from_str::<CaseConfig>(&text).is_err());
    }

    #[test]
    fn yaml_file_round_trip() {
        let case: CaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        let path = std::env::temp_dir().join(format!("sg-sim-case-{}.yaml", std::process::id()));
        save_yaml(&path, &case).unwrap();
        let back = load_yaml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, case);
    }
}
