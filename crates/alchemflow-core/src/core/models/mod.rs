//! # Core Models Module
//!
//! This module contains the data structures used to describe a substitutable
//! scaffold and the variants generated from it.
//!
//! ## Key Components
//!
//! - [`element`] - Periodic-table lookup and element shifting
//! - [`atom`] - Individual atom with element identity and position
//! - [`structure`] - Immutable molecular structure with copy-on-substitute semantics
//! - [`substitution`] - Site changes and per-site substitution vectors
//! - [`scaffold`] - Site count, reference element and symmetry-group partition
//!
//! ## Usage
//!
//! ```ignore
//! use alchemflow::core::models::substitution::SiteChange;
//!
//! let variant = reference.substituted(&[SiteChange::up(0), SiteChange::down(5)])?;
//! ```

pub mod atom;
pub mod element;
pub mod scaffold;
pub mod structure;
pub mod substitution;
