use crate::core::io::xyz::XyzError;
use crate::core::models::element::ElementError;
use crate::core::models::structure::StructureError;
use crate::core::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EnumerationError {
    #[error("Invalid site selector '{0}': expected an element symbol or atomic number")]
    InvalidSelector(String),

    #[error("No atoms of element {selector} found in structure '{structure}'")]
    NoEligibleSites { selector: String, structure: String },

    #[error("Maximum charge must be non-negative, got {0}")]
    NegativeChargeBound(i32),

    #[error("Candidate refers to site {site}, which is not among the eligible sites")]
    SiteNotEligible { site: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    #[error("Failed to derive substituted structure: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Element lookup failed: {source}")]
    Element {
        #[from]
        source: ElementError,
    },

    #[error("Structure file error for '{path}': {source}")]
    StructureFile { path: String, source: XyzError },

    #[error("Model query failed for candidate {index}: {source}")]
    Query { index: usize, source: ModelError },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
