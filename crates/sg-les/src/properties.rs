//! Closure configuration.

use serde::{Deserialize, Serialize};
use sg_core::units::SpecificEnergy;
use sg_core::{Real, SMALL};
use sg_fvm::SolverSettings;

use crate::delta::DeltaConfig;
use crate::error::{LesError, LesResult};
use crate::filter::FilterConfig;

/// Settings read at construction and on every `read()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LesProperties {
    pub filter: FilterConfig,
    pub delta: DeltaConfig,
    /// Lower bound applied to `k` after every solve (m^2/s^2).
    pub k_min: Real,
    /// Implicit under-relaxation factor for the `k` equation; 1 disables.
    pub k_relaxation: Real,
    pub solver: SolverSettings,
}

impl Default for LesProperties {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            delta: DeltaConfig::default(),
            k_min: SMALL,
            k_relaxation: 1.0,
            solver: SolverSettings::default(),
        }
    }
}

impl LesProperties {
    pub fn with_k_min(mut self, k_min: SpecificEnergy) -> Self {
        self.k_min = k_min.value;
        self
    }

    pub fn validate(&self) -> LesResult<()> {
        self.filter.validate()?;
        self.delta.validate()?;
        if !(self.k_min.is_finite() && self.k_min >= 0.0) {
            return Err(LesError::config(format!(
                "k_min must be non-negative, got {}",
                self.k_min
            )));
        }
        if !(self.k_relaxation > 0.0 && self.k_relaxation <= 1.0) {
            return Err(LesError::config(format!(
                "k_relaxation must be in (0, 1], got {}",
                self.k_relaxation
            )));
        }
        self.solver
            .validate()
            .map_err(|e| LesError::config(e.to_string()))
    }
}
