use super::CommandContext;
use crate::cli::PredictArgs;
use crate::error::Result;
use alchemflow::engine::progress::ProgressReporter;
use alchemflow::workflows;
use tracing::{info, warn};

pub fn run(args: PredictArgs, context: &CommandContext) -> Result<()> {
    let config = context.load_config()?.merge_predict(&args)?;
    info!(
        order = config.taylor.order,
        outputs = ?config.taylor.outputs,
        "Predicting from training set {:?}", config.training_set_path
    );

    let progress_handler = context.progress_handler();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Fitting an order-{} Taylor model and scoring candidates with |charge| <= {}...",
        config.taylor.order, config.max_charge
    );
    let report = workflows::predict::run(&config, &reporter)?;

    if report.candidate_count == 0 {
        warn!("No candidate satisfies the charge bound.");
        println!("Warning: no candidate satisfies the charge bound; wrote an empty table.");
    }
    println!(
        "✓ Scored {} candidates using {} training rows. Predictions written to: {}",
        report.candidate_count,
        report.training_rows,
        report.output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use alchemflow::workflows::WorkflowError;
    use tempfile::tempdir;

    #[test]
    fn missing_training_set_fails_after_config_merge() {
        let dir = tempdir().unwrap();
        let args = PredictArgs {
            training_set: Some(dir.path().join("absent.csv")),
            max_charge: Some(2),
            order: None,
            output_dir: Some(dir.path().to_path_buf()),
        };
        let context = CommandContext {
            config_path: None,
            set_values: &[],
            quiet: true,
        };

        let result = run(args, &context);

        assert!(matches!(
            result,
            Err(CliError::Workflow(WorkflowError::TrainingSetNotFound(_)))
        ));
    }

    #[test]
    fn charge_bound_is_required() {
        let context = CommandContext {
            config_path: None,
            set_values: &[],
            quiet: true,
        };

        let result = run(PredictArgs::default(), &context);

        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
