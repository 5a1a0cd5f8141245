use crate::core::model::taylor::TaylorSpec;
use crate::core::models::element::Element;
use crate::core::models::scaffold::ScaffoldConfig;
use crate::engine::enumeration::SiteSelector;
use std::path::PathBuf;
use thiserror::Error;

/// Default file name of the training set written by the collection workflow.
pub const DEFAULT_TRAINING_SET_NAME: &str = "final_training_set.csv";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub reference_path: PathBuf,
    pub output_dir: PathBuf,
    pub selector: SiteSelector,
    pub base_charge: i32,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    reference_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    selector: Option<SiteSelector>,
    base_charge: Option<i32>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_path(mut self, path: PathBuf) -> Self {
        self.reference_path = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn selector(mut self, selector: SiteSelector) -> Self {
        self.selector = Some(selector);
        self
    }
    pub fn base_charge(mut self, charge: i32) -> Self {
        self.base_charge = Some(charge);
        self
    }

    /// Builds the configuration. The selector defaults to carbon and the base
    /// charge to zero.
    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        Ok(GenerationConfig {
            reference_path: self
                .reference_path
                .ok_or(ConfigError::MissingParameter("reference_path"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            selector: self
                .selector
                .unwrap_or_else(|| SiteSelector::new(Element::CARBON)),
            base_charge: self.base_charge.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    pub results_dir: PathBuf,
    pub output_path: PathBuf,
    pub scaffold: ScaffoldConfig,
}

#[derive(Default)]
pub struct CollectionConfigBuilder {
    results_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    scaffold: Option<ScaffoldConfig>,
}

impl CollectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_dir(mut self, path: PathBuf) -> Self {
        self.results_dir = Some(path);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
    pub fn scaffold(mut self, scaffold: ScaffoldConfig) -> Self {
        self.scaffold = Some(scaffold);
        self
    }

    /// Builds the configuration. Without an explicit output path the training set
    /// is written as [`DEFAULT_TRAINING_SET_NAME`] inside the results directory.
    pub fn build(self) -> Result<CollectionConfig, ConfigError> {
        let results_dir = self
            .results_dir
            .ok_or(ConfigError::MissingParameter("results_dir"))?;
        let output_path = self
            .output_path
            .unwrap_or_else(|| results_dir.join(DEFAULT_TRAINING_SET_NAME));
        Ok(CollectionConfig {
            results_dir,
            output_path,
            scaffold: self.scaffold.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    pub training_set_path: PathBuf,
    pub output_dir: PathBuf,
    pub scaffold: ScaffoldConfig,
    pub max_charge: i32,
    pub taylor: TaylorSpec,
}

#[derive(Default)]
pub struct PredictionConfigBuilder {
    training_set_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    scaffold: Option<ScaffoldConfig>,
    max_charge: Option<i32>,
    taylor: Option<TaylorSpec>,
}

impl PredictionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn training_set_path(mut self, path: PathBuf) -> Self {
        self.training_set_path = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn scaffold(mut self, scaffold: ScaffoldConfig) -> Self {
        self.scaffold = Some(scaffold);
        self
    }
    pub fn max_charge(mut self, charge: i32) -> Self {
        self.max_charge = Some(charge);
        self
    }
    pub fn taylor(mut self, spec: TaylorSpec) -> Self {
        self.taylor = Some(spec);
        self
    }

    pub fn build(self) -> Result<PredictionConfig, ConfigError> {
        Ok(PredictionConfig {
            training_set_path: self
                .training_set_path
                .ok_or(ConfigError::MissingParameter("training_set_path"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            scaffold: self.scaffold.unwrap_or_default(),
            max_charge: self
                .max_charge
                .ok_or(ConfigError::MissingParameter("max_charge"))?,
            taylor: self.taylor.unwrap_or_default(),
        })
    }
}
