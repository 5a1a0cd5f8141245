//! # Core Module
//!
//! Stateless building blocks of the substitution workflow.
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, structures, substitution
//!   vectors and scaffold symmetry partitions
//! - **File I/O** ([`io`]) - XYZ geometries, ORCA outputs and Hessians, training-set CSV
//! - **Property Models** ([`model`]) - Taylor expansions fitted to a training set
//!
//! Nothing in this module holds state across calls; substituted structures, parsed
//! outputs and fitted models are all plain values.

pub mod io;
pub mod model;
pub mod models;
