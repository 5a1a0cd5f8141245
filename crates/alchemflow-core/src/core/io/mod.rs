//! Reading and writing the file formats of the substitution workflow.
//!
//! Structures travel as XYZ coordinates through the [`traits::MolecularFile`]
//! interface. Quantum-chemistry results are read from ORCA outputs ([`orca`]) and
//! their `.hess` companions ([`hessian`]), and condensed into the tabular training
//! set of [`dataset`].

pub mod dataset;
pub mod hessian;
pub mod orca;
pub mod traits;
pub mod xyz;
