use super::CommandContext;
use crate::cli::GenerateArgs;
use crate::error::Result;
use alchemflow::engine::progress::ProgressReporter;
use alchemflow::workflows;
use tracing::info;

pub fn run(args: GenerateArgs, context: &CommandContext) -> Result<()> {
    let config = context.load_config()?.merge_generate(&args)?;
    info!(
        "Generating {} substitutions of {:?} into {:?}",
        config.selector, config.reference_path, config.output_dir
    );

    let progress_handler = context.progress_handler();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating substituted geometries from {}...",
        config.reference_path.display()
    );
    let report = workflows::generate::run(&config, &reporter)?;

    println!(
        "✓ Wrote {} geometries for {} eligible '{}' sites of '{}' to: {}",
        report.count(),
        report.eligible_sites.len(),
        config.selector,
        report.reference_name,
        config.output_dir.display()
    );
    println!("Run the quantum-chemistry calculations on these files, then use 'alchemflow collect'.");
    Ok(())
}
