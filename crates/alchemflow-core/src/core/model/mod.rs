//! Surrogate models that predict molecular properties from substitution levels.
//!
//! A [`PropertyModel`] maps a point in substitution space (one coordinate per
//! site) to a fixed, named set of output quantities. [`taylor::TaylorModel`] is
//! the polynomial expansion fitted to a training set.

pub mod taylor;

use crate::core::io::dataset::DatasetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Training set has no rows")]
    EmptyTrainingSet,
    #[error("Expected a point of dimension {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("No output columns selected")]
    NoOutputs,
    #[error(
        "Least-squares system is singular: rank {rank} for {terms} expansion terms ({rows} rows)"
    )]
    Singular {
        rank: usize,
        terms: usize,
        rows: usize,
    },
    #[error("Least-squares solve failed: {0}")]
    Solve(&'static str),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Named output values of one model query, aligned with [`PropertyModel::outputs`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPrediction<'a> {
    names: &'a [String],
    values: Vec<f64>,
}

impl<'a> PropertyPrediction<'a> {
    pub fn new(names: &'a [String], values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// A fitted model that can be queried concurrently.
pub trait PropertyModel: Sync {
    /// Number of input coordinates a query point must have.
    fn input_dimension(&self) -> usize;

    /// Names of the predicted quantities, in output order.
    fn outputs(&self) -> &[String];

    fn query(&self, point: &[f64]) -> Result<PropertyPrediction<'_>, ModelError>;
}
