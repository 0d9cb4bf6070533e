//! External source-term hooks applied to closure equations and fields.

use serde::{Deserialize, Serialize};
use sg_core::{Real, ScalarField};
use sg_fvm::{fvm, FvMatrix};
use sg_mesh::Mesh;

use crate::error::{LesError, LesResult};

/// Generic source injection for a transported or derived field.
///
/// Hooks select the fields they act on by name.
pub trait SourceHook: Send + Sync {
    /// Source contribution to the equation for `psi`, as a right-hand-side
    /// term.
    fn add_sources<'m>(
        &self,
        mesh: &'m Mesh,
        _alpha: &ScalarField,
        _rho: &ScalarField,
        _psi: &ScalarField,
    ) -> LesResult<FvMatrix<'m>> {
        Ok(FvMatrix::new(mesh))
    }

    /// Modify the assembled equation for `psi` before it is solved.
    fn constrain(&self, _psi: &ScalarField, _eqn: &mut FvMatrix<'_>) -> LesResult<()> {
        Ok(())
    }

    /// Adjust a field after it has been solved for or updated.
    fn correct_field(&self, _field: &mut ScalarField) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoSources;

impl SourceHook for NoSources {}

/// Constant explicit source `alpha rho rate` for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSource {
    pub field: String,
    pub rate: Real,
}

impl SourceHook for UniformSource {
    fn add_sources<'m>(
        &self,
        mesh: &'m Mesh,
        alpha: &ScalarField,
        rho: &ScalarField,
        psi: &ScalarField,
    ) -> LesResult<FvMatrix<'m>> {
        if psi.name() != self.field {
            return Ok(FvMatrix::new(mesh));
        }
        let su = alpha.zip_map(rho, "alphaRhoSource", |a, r| a * r * self.rate);
        Ok(fvm::su(mesh, &su)?)
    }
}

/// Holds a field at a fixed value in selected cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedValueConstraint {
    pub field: String,
    pub cells: Vec<usize>,
    pub value: Real,
}

impl SourceHook for FixedValueConstraint {
    fn constrain(&self, psi: &ScalarField, eqn: &mut FvMatrix<'_>) -> LesResult<()> {
        if psi.name() == self.field {
            let values = vec![self.value; self.cells.len()];
            eqn.set_values(&self.cells, &values)?;
        }
        Ok(())
    }

    fn correct_field(&self, field: &mut ScalarField) {
        if field.name() == self.field {
            for &cell in &self.cells {
                if cell < field.len() {
                    field[cell] = self.value;
                }
            }
        }
    }
}

/// Several hooks applied in order.
#[derive(Default)]
pub struct SourceList {
    hooks: Vec<Box<dyn SourceHook>>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Box<dyn SourceHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl SourceHook for SourceList {
    fn add_sources<'m>(
        &self,
        mesh: &'m Mesh,
        alpha: &ScalarField,
        rho: &ScalarField,
        psi: &ScalarField,
    ) -> LesResult<FvMatrix<'m>> {
        let mut total = FvMatrix::new(mesh);
        for hook in &self.hooks {
            total = total + hook.add_sources(mesh, alpha, rho, psi)?;
        }
        Ok(total)
    }

    fn constrain(&self, psi: &ScalarField, eqn: &mut FvMatrix<'_>) -> LesResult<()> {
        for hook in &self.hooks {
            hook.constrain(psi, eqn)?;
        }
        Ok(())
    }

    fn correct_field(&self, field: &mut ScalarField) {
        for hook in &self.hooks {
            hook.correct_field(field);
        }
    }
}

/// Source hook selection as read from a case file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Uniform { field: String, rate: Real },
    FixedValue {
        field: String,
        cells: Vec<usize>,
        value: Real,
    },
}

impl SourceConfig {
    pub fn validate(&self, n_cells: usize) -> LesResult<()> {
        match self {
            SourceConfig::Uniform { rate, .. } if !rate.is_finite() => {
                Err(LesError::config("uniform source rate must be finite"))
            }
            SourceConfig::FixedValue { cells, value, .. } => {
                if let Some(cell) = cells.iter().find(|&&c| c >= n_cells) {
                    return Err(LesError::config(format!(
                        "fixed_value cell {cell} outside mesh of {n_cells} cells"
                    )));
                }
                if !value.is_finite() {
                    return Err(LesError::config("fixed_value value must be finite"));
                }
                Ok(())
            }
            SourceConfig::Uniform { .. } => Ok(()),
        }
    }

    pub fn build(&self) -> Box<dyn SourceHook> {
        match self {
            SourceConfig::Uniform { field, rate } => Box::new(UniformSource {
                field: field.clone(),
                rate: *rate,
            }),
            SourceConfig::FixedValue {
                field,
                cells,
                value,
            } => Box::new(FixedValueConstraint {
                field: field.clone(),
                cells: cells.clone(),
                value: *value,
            }),
        }
    }
}

/// Build a hook list from configuration entries.
pub fn build_sources(configs: &[SourceConfig], n_cells: usize) -> LesResult<SourceList> {
    let mut list = SourceList::new();
    for config in configs {
        config.validate(n_cells)?;
        list.push(config.build());
    }
    Ok(list)
}
