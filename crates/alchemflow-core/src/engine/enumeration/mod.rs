//! The two combinatorial enumerators of the workflow.
//!
//! - [`sites`] produces the single and double substitutions of a reference
//!   structure that are sent to quantum-chemistry calculations.
//! - [`groups`] produces the symmetry-reduced, charge-bounded candidate vectors
//!   that are scored with the fitted property model.

pub mod groups;
pub mod sites;

pub use groups::{GroupPattern, count_structures, generate_structures, group_patterns};
pub use sites::{
    Candidate, SiteSelector, eligible_sites, enumerate_substitutions, expected_candidate_count,
};
