mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::CommandContext;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }

    match run_app(cli) {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => {
            error!("❌ Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_app(cli: Cli) -> Result<()> {
    info!(
        "🚀 alchemflow CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let context = CommandContext {
        config_path: cli.config.as_deref(),
        set_values: &cli.set_values,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args, &context)
        }
        Commands::Collect(args) => {
            info!("Dispatching to 'collect' command.");
            commands::collect::run(args, &context)
        }
        Commands::Enumerate(args) => {
            info!("Dispatching to 'enumerate' command.");
            commands::enumerate::run(args, &context)
        }
        Commands::Predict(args) => {
            info!("Dispatching to 'predict' command.");
            commands::predict::run(args, &context)
        }
    }
}
