pub mod collect;
pub mod enumerate;
pub mod generate;
pub mod predict;

use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use std::path::Path;
use tracing::info;

/// Settings shared by every subcommand.
pub struct CommandContext<'a> {
    pub config_path: Option<&'a Path>,
    pub set_values: &'a [String],
    pub quiet: bool,
}

impl CommandContext<'_> {
    /// Loads the configuration file (if any) and applies `--set` overrides.
    pub fn load_config(&self) -> Result<PartialConfig> {
        if let Some(path) = self.config_path {
            info!("Loading configuration from {:?}", path);
        }
        let mut config = PartialConfig::load(self.config_path)?;
        config.apply_set_values(self.set_values)?;
        Ok(config)
    }

    pub fn progress_handler(&self) -> CliProgressHandler {
        if self.quiet {
            CliProgressHandler::hidden()
        } else {
            CliProgressHandler::new()
        }
    }
}
