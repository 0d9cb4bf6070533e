//! Test filters for the dynamic procedure.
//!
//! A filter is a stateless low-pass transform over a cell field. Filters
//! that scale with the LES width receive `delta` on every call.

mod laplace;
mod simple;

pub use laplace::LaplaceFilter;
pub use simple::SimpleFilter;

use serde::{Deserialize, Serialize};
use sg_core::{Real, ScalarField, TensorField, VectorField};
use sg_mesh::Mesh;

use crate::error::{LesError, LesResult};

pub const DEFAULT_WIDTH_COEFF: Real = 24.0;

fn default_width_coeff() -> Real {
    DEFAULT_WIDTH_COEFF
}

/// Filter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    #[default]
    /// Face-area weighted average of the neighbouring face values.
    Simple,
    /// `phi + div((delta^2 / width_coeff) grad(phi))`.
    Laplace {
        #[serde(default = "default_width_coeff")]
        width_coeff: Real,
    },
}

impl FilterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterConfig::Simple => "simple",
            FilterConfig::Laplace { .. } => "laplace",
        }
    }

    pub fn validate(&self) -> LesResult<()> {
        match *self {
            FilterConfig::Simple => Ok(()),
            FilterConfig::Laplace { width_coeff } => {
                if width_coeff.is_finite() && width_coeff > 0.0 {
                    Ok(())
                } else {
                    Err(LesError::config(format!(
                        "laplace filter width_coeff must be positive, got {width_coeff}"
                    )))
                }
            }
        }
    }
}

/// A spatial test filter.
pub trait LesFilter: Send + Sync {
    fn kind(&self) -> &'static str;

    fn filter_scalar(&self, mesh: &Mesh, delta: &ScalarField, vf: &ScalarField) -> ScalarField;

    fn filter_vector(&self, mesh: &Mesh, delta: &ScalarField, vf: &VectorField) -> VectorField;

    fn filter_tensor(&self, mesh: &Mesh, delta: &ScalarField, vf: &TensorField) -> TensorField;

    /// Re-read coefficients. Changing the filter type is not a read; use
    /// [`build_filter`] for that.
    fn read(&mut self, config: &FilterConfig) -> LesResult<()>;
}

/// Construct the filter a configuration selects.
pub fn build_filter(config: &FilterConfig) -> LesResult<Box<dyn LesFilter>> {
    config.validate()?;
    Ok(match *config {
        FilterConfig::Simple => Box::new(SimpleFilter),
        FilterConfig::Laplace { width_coeff } => Box::new(LaplaceFilter::new(width_coeff)?),
    })
}

fn kind_mismatch(have: &'static str, config: &FilterConfig) -> LesError {
    LesError::config(format!(
        "cannot re-read a {have} filter from a {} configuration",
        config.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_rejected() {
        let r: Result<FilterConfig, _> = serde_yaml::from_str("type: box");
        assert!(r.is_err());
    }

    #[test]
    fn laplace_width_defaults() {
        let c: FilterConfig = serde_yaml::from_str("type: laplace").unwrap();
        assert_eq!(
            c,
            FilterConfig::Laplace {
                width_coeff: DEFAULT_WIDTH_COEFF
            }
        );
    }

    #[test]
    fn build_selects_kind() {
        assert_eq!(build_filter(&FilterConfig::Simple).unwrap().kind(), "simple");
        let laplace = FilterConfig::Laplace { width_coeff: 12.0 };
        assert_eq!(build_filter(&laplace).unwrap().kind(), "laplace");
        assert!(build_filter(&FilterConfig::Laplace { width_coeff: 0.0 }).is_err());
    }

    #[test]
    fn read_refuses_kind_change() {
        let mut f = build_filter(&FilterConfig::Simple).unwrap();
        assert!(f.read(&FilterConfig::Laplace { width_coeff: 24.0 }).is_err());
        assert!(f.read(&FilterConfig::Simple).is_ok());
    }
}
