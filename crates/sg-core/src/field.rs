//! Cell-centred fields.
//!
//! Element-wise operations run as rayon parallel maps. Binary operations
//! require operands defined on the same mesh; hosts check sizes once at the
//! model boundary, so the maps here only `debug_assert!` it.

use crate::numeric::Real;
use crate::tensor::{FieldValue, Tensor, Vector};
use rayon::prelude::*;
use std::ops::{Index, IndexMut};

/// Named values, one per mesh cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    name: String,
    values: Vec<T>,
}

pub type ScalarField = Field<Real>;
pub type VectorField = Field<Vector>;
pub type TensorField = Field<Tensor>;

impl<T: Copy + Send + Sync> Field<T> {
    pub fn new(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn uniform(name: impl Into<String>, n_cells: usize, value: T) -> Self {
        Self::new(name, vec![value; n_cells])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Per-cell map into a new field.
    pub fn map<U, F>(&self, name: impl Into<String>, f: F) -> Field<U>
    where
        U: Copy + Send + Sync,
        F: Fn(&T) -> U + Sync + Send,
    {
        Field::new(name, self.values.par_iter().map(f).collect())
    }

    /// Per-cell binary map into a new field.
    pub fn zip_map<U, V, F>(&self, other: &Field<U>, name: impl Into<String>, f: F) -> Field<V>
    where
        U: Copy + Send + Sync,
        V: Copy + Send + Sync,
        F: Fn(&T, &U) -> V + Sync + Send,
    {
        debug_assert_eq!(self.len(), other.len(), "zip_map on fields of different size");
        Field::new(
            name,
            self.values
                .par_iter()
                .zip(other.values.par_iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        )
    }

    /// In-place per-cell update.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(&mut T) + Sync + Send,
    {
        self.values.par_iter_mut().for_each(f);
    }
}

impl<T: FieldValue> Field<T> {
    pub fn zeros(name: impl Into<String>, n_cells: usize) -> Self {
        Self::uniform(name, n_cells, T::zero())
    }

    /// `magSqr(field)`.
    pub fn mag_sqr(&self, name: impl Into<String>) -> ScalarField {
        self.map(name, |v| v.mag_sqr())
    }

    /// Scale every value by the matching cell of a scalar field.
    pub fn scale_by(&self, s: &ScalarField, name: impl Into<String>) -> Field<T> {
        self.zip_map(s, name, |v, s| *v * *s)
    }

    /// Divide every value by the matching cell of a scalar field.
    pub fn divide_by(&self, s: &ScalarField, name: impl Into<String>) -> Field<T> {
        self.zip_map(s, name, |v, s| *v * (1.0 / *s))
    }
}

impl ScalarField {
    /// Pointwise `max(field, floor)`; returns the number of cells raised.
    pub fn max_with(&mut self, floor: Real) -> usize {
        self.values
            .par_iter_mut()
            .map(|v| {
                if *v < floor {
                    *v = floor;
                    1
                } else {
                    0
                }
            })
            .sum()
    }

    pub fn min_value(&self) -> Real {
        self.values.iter().copied().fold(Real::INFINITY, Real::min)
    }

    pub fn max_value(&self) -> Real {
        self.values
            .iter()
            .copied()
            .fold(Real::NEG_INFINITY, Real::max)
    }

    pub fn mean(&self) -> Real {
        if self.values.is_empty() {
            0.0
        } else {
            self.values.par_iter().sum::<Real>() / self.values.len() as Real
        }
    }

    pub fn all_finite(&self) -> bool {
        self.values.par_iter().all(|v| v.is_finite())
    }
}

impl<T> Index<usize> for Field<T> {
    type Output = T;

    fn index(&self, cell: usize) -> &T {
        &self.values[cell]
    }
}

impl<T> IndexMut<usize> for Field<T> {
    fn index_mut(&mut self, cell: usize) -> &mut T {
        &mut self.values[cell]
    }
}
