use crate::cli::{CollectArgs, GenerateArgs, PredictArgs};
use crate::error::{CliError, Result};
use alchemflow::core::model::taylor::TaylorSpec;
use alchemflow::core::models::scaffold::ScaffoldConfig;
use alchemflow::engine::config as core_config;
use alchemflow::engine::enumeration::SiteSelector;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_REFERENCE: &str = "data/porph.xyz";
const DEFAULT_GEOMETRY_DIR: &str = "data/raw_geometries";
const DEFAULT_RESULTS_DIR: &str = "data/calc_results";
const DEFAULT_TRAINING_SET: &str = "data/final_training_set.csv";
const DEFAULT_PREDICTION_DIR: &str = ".";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGenerateConfig {
    reference: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    element: Option<String>,
    charge: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialCollectConfig {
    results_dir: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPredictConfig {
    training_set: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    max_charge: Option<i32>,
    order: Option<usize>,
    center: Option<Vec<f64>>,
    outputs: Option<Vec<String>>,
}

/// Workflow settings read from a TOML file. Every field is optional; values
/// given on the command line take precedence, then the file, then the defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialConfig {
    scaffold: Option<ScaffoldConfig>,
    generate: Option<PartialGenerateConfig>,
    collect: Option<PartialCollectConfig>,
    predict: Option<PartialPredictConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file when one is given, otherwise starts empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// The scaffold from the file, or the porphyrin scaffold.
    pub fn scaffold(&self) -> ScaffoldConfig {
        self.scaffold.clone().unwrap_or_default()
    }

    pub fn merge_generate(mut self, args: &GenerateArgs) -> Result<core_config::GenerationConfig> {
        let file = self.generate.take().unwrap_or_default();

        let mut builder = core_config::GenerationConfigBuilder::new()
            .reference_path(
                args.reference
                    .clone()
                    .or(file.reference)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REFERENCE)),
            )
            .output_dir(
                args.output_dir
                    .clone()
                    .or(file.output_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_GEOMETRY_DIR)),
            );

        if let Some(element) = args.element.as_ref().or(file.element.as_ref()) {
            let selector = element
                .parse::<SiteSelector>()
                .map_err(|e| CliError::Argument(e.to_string()))?;
            builder = builder.selector(selector);
        }
        if let Some(charge) = args.charge.or(file.charge) {
            builder = builder.base_charge(charge);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_collect(mut self, args: &CollectArgs) -> Result<core_config::CollectionConfig> {
        let scaffold = self.scaffold();
        let file = self.collect.take().unwrap_or_default();

        core_config::CollectionConfigBuilder::new()
            .results_dir(
                args.results_dir
                    .clone()
                    .or(file.results_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR)),
            )
            .output_path(
                args.output
                    .clone()
                    .or(file.output)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAINING_SET)),
            )
            .scaffold(scaffold)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_predict(mut self, args: &PredictArgs) -> Result<core_config::PredictionConfig> {
        let scaffold = self.scaffold();
        let file = self.predict.take().unwrap_or_default();

        let max_charge = args.max_charge.or(file.max_charge).ok_or_else(|| {
            CliError::Config(
                "A value for 'predict.max-charge' is required either in the config file or via --max-charge."
                    .to_string(),
            )
        })?;

        let defaults = TaylorSpec::default();
        let taylor = TaylorSpec {
            order: args.order.or(file.order).unwrap_or(defaults.order),
            center: file.center,
            outputs: file.outputs.unwrap_or(defaults.outputs),
        };

        core_config::PredictionConfigBuilder::new()
            .training_set_path(
                args.training_set
                    .clone()
                    .or(file.training_set)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAINING_SET)),
            )
            .output_dir(
                args.output_dir
                    .clone()
                    .or(file.output_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTION_DIR)),
            )
            .scaffold(scaffold)
            .max_charge(max_charge)
            .taylor(taylor)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// The charge bound for `enumerate`: the argument, else `predict.max-charge`.
    pub fn max_charge(&self, cli_value: Option<i32>) -> Result<i32> {
        cli_value
            .or(self.predict.as_ref().and_then(|p| p.max_charge))
            .ok_or_else(|| {
                CliError::Config(
                    "A charge bound is required either via --max-charge or 'predict.max-charge'."
                        .to_string(),
                )
            })
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "generate.reference" => {
                    self.generate_mut().reference = Some(PathBuf::from(value_str));
                }
                "generate.output-dir" => {
                    self.generate_mut().output_dir = Some(PathBuf::from(value_str));
                }
                "generate.element" => {
                    self.generate_mut().element = Some(value_str.trim().to_string());
                }
                "generate.charge" => {
                    self.generate_mut().charge = Some(parse_value(key, value_str, "integer")?);
                }
                "collect.results-dir" => {
                    self.collect_mut().results_dir = Some(PathBuf::from(value_str));
                }
                "collect.output" => {
                    self.collect_mut().output = Some(PathBuf::from(value_str));
                }
                "predict.training-set" => {
                    self.predict_mut().training_set = Some(PathBuf::from(value_str));
                }
                "predict.output-dir" => {
                    self.predict_mut().output_dir = Some(PathBuf::from(value_str));
                }
                "predict.max-charge" => {
                    self.predict_mut().max_charge = Some(parse_value(key, value_str, "integer")?);
                }
                "predict.order" => {
                    self.predict_mut().order = Some(parse_value(key, value_str, "integer")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn generate_mut(&mut self) -> &mut PartialGenerateConfig {
        self.generate.get_or_insert_with(Default::default)
    }

    fn collect_mut(&mut self) -> &mut PartialCollectConfig {
        self.collect.get_or_insert_with(Default::default)
    }

    fn predict_mut(&mut self) -> &mut PartialPredictConfig {
        self.predict.get_or_insert_with(Default::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemflow::core::models::element::Element;
    use std::fs;
    use tempfile::tempdir;

    const FULL_CONFIG: &str = r#"
[generate]
reference = "inputs/porph.xyz"
element = "N"
charge = -1

[collect]
results-dir = "orca"

[predict]
max-charge = 2
order = 2
outputs = ["Energy"]

[scaffold]
site-count = 2
groups = [{ name = "pair", indices = [0, 1], max-substitutions = 2 }]
"#;

    fn load(content: &str) -> PartialConfig {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alchemflow.toml");
        fs::write(&path, content).unwrap();
        PartialConfig::from_file(&path).unwrap()
    }

    #[test]
    fn empty_config_uses_builtin_defaults() {
        let generation = PartialConfig::default()
            .merge_generate(&GenerateArgs::default())
            .unwrap();
        assert_eq!(generation.reference_path, PathBuf::from(DEFAULT_REFERENCE));
        assert_eq!(generation.output_dir, PathBuf::from(DEFAULT_GEOMETRY_DIR));
        assert_eq!(generation.selector.element(), Element::CARBON);
        assert_eq!(generation.base_charge, 0);

        let collection = PartialConfig::default()
            .merge_collect(&CollectArgs::default())
            .unwrap();
        assert_eq!(collection.results_dir, PathBuf::from(DEFAULT_RESULTS_DIR));
        assert_eq!(collection.output_path, PathBuf::from(DEFAULT_TRAINING_SET));
        assert_eq!(collection.scaffold, ScaffoldConfig::porphyrin());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = load(FULL_CONFIG);
        let scaffold = config.scaffold();
        assert_eq!(scaffold.site_count(), 2);

        let prediction = config.merge_predict(&PredictArgs::default()).unwrap();
        assert_eq!(prediction.max_charge, 2);
        assert_eq!(prediction.taylor.order, 2);
        assert_eq!(prediction.taylor.outputs, vec!["Energy".to_string()]);
        assert_eq!(prediction.scaffold, scaffold);
        assert_eq!(
            prediction.training_set_path,
            PathBuf::from(DEFAULT_TRAINING_SET)
        );
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let config = load(FULL_CONFIG);
        let args = GenerateArgs {
            element: Some("5".to_string()),
            charge: Some(1),
            ..Default::default()
        };

        let generation = config.merge_generate(&args).unwrap();

        assert_eq!(generation.reference_path, PathBuf::from("inputs/porph.xyz"));
        assert_eq!(generation.selector.element(), Element::BORON);
        assert_eq!(generation.base_charge, 1);
    }

    #[test]
    fn set_values_override_file_values() {
        let mut config = load(FULL_CONFIG);
        config
            .apply_set_values(&[
                "predict.max-charge=4".to_string(),
                "collect.output=train.csv".to_string(),
            ])
            .unwrap();

        assert_eq!(config.max_charge(None).unwrap(), 4);
        assert_eq!(config.max_charge(Some(1)).unwrap(), 1);
        let collection = config.merge_collect(&CollectArgs::default()).unwrap();
        assert_eq!(collection.results_dir, PathBuf::from("orca"));
        assert_eq!(collection.output_path, PathBuf::from("train.csv"));
    }

    #[test]
    fn predict_requires_a_charge_bound() {
        let result = PartialConfig::default().merge_predict(&PredictArgs::default());
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(PartialConfig::default().max_charge(None).is_err());
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let mut config = PartialConfig::default();
        assert!(matches!(
            config.apply_set_values(&["predict.order".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["predict.order=two".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["optimization.max-iterations=3".to_string()]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_element_is_an_argument_error() {
        let args = GenerateArgs {
            element: Some("Xx".to_string()),
            ..Default::default()
        };
        let result = PartialConfig::default().merge_generate(&args);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[predict]\nmax-charges = 3\n").unwrap();

        let result = PartialConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_scaffold_fails_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            "[scaffold]\nsite-count = 3\ngroups = [{ name = \"g\", indices = [0, 1], max-substitutions = 2 }]\n",
        )
        .unwrap();

        let result = PartialConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
