use super::WorkflowError;
use crate::core::io::dataset::{DatasetError, TrainingRecord, TrainingSet};
use crate::core::io::hessian::OrcaHessian;
use crate::core::io::orca::OrcaOutput;
use crate::core::models::scaffold::ScaffoldConfig;
use crate::engine::config::CollectionConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const OUTPUT_EXTENSION: &str = "out";
const HESSIAN_EXTENSION: &str = "hess";

/// A calculation output that could not be turned into a training row.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionFailure {
    pub file: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionReport {
    /// Number of `.out` files found.
    pub discovered: usize,
    /// Number of rows written to the training set.
    pub collected: usize,
    pub failures: Vec<CollectionFailure>,
    /// Where the training set was written; `None` when no row succeeded.
    pub output_path: Option<PathBuf>,
}

fn list_outputs(results_dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    let entries = std::fs::read_dir(results_dir).map_err(WorkflowError::io(results_dir))?;
    let mut outputs = Vec::new();
    for entry in entries {
        let path = entry.map_err(WorkflowError::io(results_dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == OUTPUT_EXTENSION) {
            outputs.push(path);
        }
    }
    outputs.sort();
    Ok(outputs)
}

fn collect_file(path: &Path, scaffold: &ScaffoldConfig) -> Result<TrainingRecord, DatasetError> {
    let output = OrcaOutput::from_path(path)?;
    let hessian = OrcaHessian::from_path(&path.with_extension(HESSIAN_EXTENSION))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    TrainingRecord::from_orca(file_name, &output, &hessian, scaffold)
}

#[instrument(
    skip_all,
    name = "collection_workflow",
    fields(results_dir = %config.results_dir.display())
)]
pub fn run(
    config: &CollectionConfig,
    reporter: &ProgressReporter,
) -> Result<CollectionReport, WorkflowError> {
    if !config.results_dir.is_dir() {
        return Err(WorkflowError::ResultsDirNotFound(config.results_dir.clone()));
    }

    let outputs = list_outputs(&config.results_dir)?;
    if outputs.is_empty() {
        warn!(
            "No '.{}' files found in '{}'; no training set written.",
            OUTPUT_EXTENSION,
            config.results_dir.display()
        );
        return Ok(CollectionReport::default());
    }
    info!("Found {} calculation outputs to process.", outputs.len());

    reporter.report(Progress::PhaseStart {
        name: "Parsing Outputs",
    });
    let site_columns = config.scaffold.site_columns();
    let mut failures = Vec::new();
    let mut set: Option<TrainingSet> = None;

    reporter.task(outputs.len() as u64, |increment| {
        for path in &outputs {
            let result = collect_file(path, &config.scaffold).and_then(|record| {
                if let Some(existing) = set.as_mut() {
                    return existing.push_row(record.file.clone(), record.values());
                }
                // The first parsed output fixes the column layout.
                set = Some(TrainingSet::from_records(
                    std::slice::from_ref(&record),
                    &site_columns,
                )?);
                Ok(())
            });
            if let Err(e) = result {
                warn!(file = %path.display(), "Skipping output: {}", e);
                reporter.report(Progress::Message(format!(
                    "Skipped {}: {}",
                    path.display(),
                    e
                )));
                failures.push(CollectionFailure {
                    file: path.clone(),
                    reason: e.to_string(),
                });
            }
            increment();
        }
    });
    reporter.report(Progress::PhaseFinish);

    let mut report = CollectionReport {
        discovered: outputs.len(),
        collected: 0,
        failures,
        output_path: None,
    };

    let Some(set) = set else {
        warn!("None of the {} outputs could be parsed; no training set written.", outputs.len());
        return Ok(report);
    };

    if let Some(parent) = config.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(WorkflowError::io(parent))?;
    }
    set.write_csv(&config.output_path)?;
    info!(
        rows = set.len(),
        failures = report.failures.len(),
        "Training set written to '{}'.",
        config.output_path.display()
    );

    report.collected = set.len();
    report.output_path = Some(config.output_path.clone());
    Ok(report)
}
