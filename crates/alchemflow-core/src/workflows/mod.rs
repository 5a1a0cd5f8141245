//! # Workflows Module
//!
//! End-to-end procedures of the alchemical substitution pipeline. Each workflow
//! takes a validated configuration from [`crate::engine::config`] and a
//! [`crate::engine::progress::ProgressReporter`], and returns a report.
//!
//! - **Generation** ([`generate`]) - Writes one XYZ geometry per single/double substitution
//!   of a reference structure.
//! - **Collection** ([`collect`]) - Condenses ORCA `.out`/`.hess` pairs into a training-set CSV.
//! - **Prediction** ([`predict`]) - Fits the Taylor model and scores every symmetry-unique,
//!   charge-bounded candidate.
//!
//! Quantum-chemistry calculations on the generated geometries run outside this crate,
//! between generation and collection.

pub mod collect;
pub mod generate;
pub mod predict;

use crate::core::io::dataset::DatasetError;
use crate::core::io::xyz::XyzError;
use crate::core::model::ModelError;
use crate::engine::error::{EngineError, EnumerationError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Reference structure not found: {0}")]
    ReferenceNotFound(PathBuf),

    #[error("Results directory not found: {0}")]
    ResultsDirNotFound(PathBuf),

    #[error("Training set not found: {0}")]
    TrainingSetNotFound(PathBuf),

    #[error("I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Structure file error for '{path}': {source}")]
    Xyz { path: PathBuf, source: XyzError },

    #[error("CSV error for '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Model fitting failed: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
