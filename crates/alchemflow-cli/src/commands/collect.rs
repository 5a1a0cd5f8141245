use super::CommandContext;
use crate::cli::CollectArgs;
use crate::error::Result;
use alchemflow::engine::progress::ProgressReporter;
use alchemflow::workflows;
use tracing::{info, warn};

pub fn run(args: CollectArgs, context: &CommandContext) -> Result<()> {
    let config = context.load_config()?.merge_collect(&args)?;
    info!(
        sites = config.scaffold.site_count(),
        "Collecting ORCA results from {:?}", config.results_dir
    );

    let progress_handler = context.progress_handler();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Collecting calculation results from {}...",
        config.results_dir.display()
    );
    let report = workflows::collect::run(&config, &reporter)?;

    match &report.output_path {
        Some(path) => println!(
            "✓ Training set with {} of {} outputs written to: {}",
            report.collected,
            report.discovered,
            path.display()
        ),
        None if report.discovered == 0 => {
            println!("Warning: no '.out' files found; no training set written.")
        }
        None => println!("Warning: no output could be parsed; no training set written."),
    }

    if !report.failures.is_empty() {
        warn!("{} outputs were skipped.", report.failures.len());
        println!("  Skipped {} file(s):", report.failures.len());
        for failure in &report.failures {
            println!("    {}: {}", failure.file.display(), failure.reason);
        }
    }
    Ok(())
}
