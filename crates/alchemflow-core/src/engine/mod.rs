//! # Engine Module
//!
//! The stateful and combinatorial machinery behind the workflows.
//!
//! - **Configuration** ([`config`]) - Builders for the generation, collection and prediction workflows
//! - **Enumeration** ([`enumeration`]) - Per-site substitutions and symmetry-partitioned candidates
//! - **Querying** ([`query`]) - Order-preserving, optionally parallel model evaluation
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod enumeration;
pub mod error;
pub mod progress;
pub mod query;
