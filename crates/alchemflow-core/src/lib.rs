//! # alchemflow
//!
//! An alchemical-perturbation workflow for substituted porphyrin-like scaffolds:
//! generate single and double B/N substitutions of a reference geometry, collect
//! the quantum-chemistry results into a training set, fit a multivariate Taylor
//! expansion in the per-site substitution levels, and score every symmetry-unique,
//! charge-bounded substitution pattern with it.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularStructure`,
//!   `SubstitutionVector`, `ScaffoldConfig`), file formats and the Taylor model.
//!
//! - **[`engine`]: The Logic Core.** The per-site and symmetry-partitioned enumerators,
//!   parallel model querying, configuration builders and progress reporting.
//!
//! - **[`workflows`]: The Public API.** `generate`, `collect` and `predict`, each a
//!   single call that takes a configuration and a progress reporter.

pub mod core;
pub mod engine;
pub mod workflows;
