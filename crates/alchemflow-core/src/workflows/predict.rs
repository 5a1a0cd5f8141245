use super::WorkflowError;
use crate::core::io::dataset::{HOMO_COLUMN, LUMO_COLUMN, TrainingSet};
use crate::core::model::PropertyModel;
use crate::core::model::taylor::TaylorModel;
use crate::core::models::substitution::SubstitutionVector;
use crate::engine::config::PredictionConfig;
use crate::engine::enumeration::generate_structures;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::query::{CandidateScore, score_candidates};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const GAP_COLUMN: &str = "Gap";
pub const INDEX_COLUMN: &str = "Index";

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub training_rows: usize,
    pub candidate_count: usize,
    pub output_path: PathBuf,
}

/// Name of the prediction file for `count` candidates.
pub fn output_file_name(count: usize) -> String {
    format!("out_{}.csv", count)
}

#[instrument(skip_all, name = "prediction_workflow", fields(max_charge = config.max_charge))]
pub fn run(
    config: &PredictionConfig,
    reporter: &ProgressReporter,
) -> Result<PredictionReport, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Fitting Model",
    });
    if !config.training_set_path.is_file() {
        return Err(WorkflowError::TrainingSetNotFound(
            config.training_set_path.clone(),
        ));
    }
    let set = TrainingSet::read_csv(&config.training_set_path)?;
    let inputs = config.scaffold.site_columns();
    let model = TaylorModel::fit(&set, &inputs, &config.taylor)?;
    info!(
        rows = set.len(),
        order = model.order(),
        terms = model.term_count(),
        "Fitted Taylor model."
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Enumerating Candidates",
    });
    let candidates = generate_structures(&config.scaffold, config.max_charge)?;
    info!(
        "Generated {} candidate structures with |charge| <= {}.",
        candidates.len(),
        config.max_charge
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Scoring Candidates",
    });
    let scores = reporter.task(candidates.len() as u64, |increment| {
        score_candidates(&model, &candidates, increment)
    })?;
    reporter.report(Progress::PhaseFinish);

    std::fs::create_dir_all(&config.output_dir).map_err(WorkflowError::io(&config.output_dir))?;
    let output_path = config.output_dir.join(output_file_name(candidates.len()));
    write_predictions(&output_path, &inputs, model.outputs(), &candidates, &scores)?;
    info!("Saved predictions to '{}'.", output_path.display());

    Ok(PredictionReport {
        training_rows: set.len(),
        candidate_count: candidates.len(),
        output_path,
    })
}

/// Writes one row per candidate: its levels, the model outputs, the HOMO-LUMO gap
/// (when both orbitals are predicted) and the candidate index.
fn write_predictions(
    path: &Path,
    inputs: &[String],
    outputs: &[String],
    candidates: &[SubstitutionVector],
    scores: &[CandidateScore],
) -> Result<(), WorkflowError> {
    let csv_err = |source: csv::Error| WorkflowError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let position = |name: &str| outputs.iter().position(|o| o == name);
    let gap = position(HOMO_COLUMN).zip(position(LUMO_COLUMN));

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    let mut header: Vec<&str> = inputs.iter().map(String::as_str).collect();
    header.extend(outputs.iter().map(String::as_str));
    if gap.is_some() {
        header.push(GAP_COLUMN);
    }
    header.push(INDEX_COLUMN);
    writer.write_record(&header).map_err(csv_err)?;

    for score in scores {
        let mut record: Vec<String> = candidates[score.index]
            .levels()
            .iter()
            .map(|level| level.to_string())
            .collect();
        record.extend(score.values.iter().map(|v| v.to_string()));
        if let Some((homo, lumo)) = gap {
            record.push((score.values[lumo] - score.values[homo]).to_string());
        }
        record.push(score.index.to_string());
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(WorkflowError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use crate::core::models::scaffold::{ScaffoldConfig, SymmetryGroup};
    use crate::engine::config::PredictionConfigBuilder;
    use crate::engine::error::EnumerationError;
    use tempfile::tempdir;

    fn scaffold() -> ScaffoldConfig {
        ScaffoldConfig::new(
            3,
            Element::CARBON,
            vec![
                SymmetryGroup::new("pair", vec![0, 2], 2),
                SymmetryGroup::new("center", vec![1], 1),
            ],
        )
        .unwrap()
    }

    /// Energy = 1 + z0 - z1 + 2 z2, HOMO = -5 + z1, LUMO = -1 - z0.
    fn write_training_set(path: &Path) {
        let mut set = TrainingSet::new(
            ["z0", "z1", "z2", "Energy", "HOMO", "LUMO"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [-1.0, 1.0, 0.0],
            [0.0, -1.0, -1.0],
        ];
        for (i, [a, b, c]) in points.into_iter().enumerate() {
            set.push_row(
                format!("mol{}.out", i),
                vec![a, b, c, 1.0 + a - b + 2.0 * c, -5.0 + b, -1.0 - a],
            )
            .unwrap();
        }
        set.write_csv(path).unwrap();
    }

    fn config(dir: &Path, max_charge: i32) -> PredictionConfig {
        PredictionConfigBuilder::new()
            .training_set_path(dir.join("set.csv"))
            .output_dir(dir.join("predictions"))
            .scaffold(scaffold())
            .max_charge(max_charge)
            .build()
            .unwrap()
    }

    #[test]
    fn writes_predictions_for_every_candidate() {
        let dir = tempdir().unwrap();
        write_training_set(&dir.path().join("set.csv"));

        let report = run(&config(dir.path(), 0), &ProgressReporter::new()).unwrap();

        // neutral combinations of (pair, center): (00, 0), (+0, -), (-0, +), (-+, 0)
        assert_eq!(report.candidate_count, 4);
        assert_eq!(report.training_rows, 6);
        assert_eq!(report.output_path, dir.path().join("predictions/out_4.csv"));

        let mut reader = csv::Reader::from_path(&report.output_path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(
            header,
            vec!["z0", "z1", "z2", "Energy", "HOMO", "LUMO", "Gap", "Index"]
        );
        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][..3], &[0.0, 0.0, 0.0]);
        assert!((rows[0][3] - 1.0).abs() < 1e-9);
        assert!((rows[0][6] - 4.0).abs() < 1e-9);
        assert_eq!(rows[0][7], 0.0);

        assert_eq!(&rows[1][..3], &[1.0, -1.0, 0.0]);
        assert!((rows[1][3] - 3.0).abs() < 1e-9);

        assert_eq!(&rows[3][..3], &[-1.0, 0.0, 1.0]);
        assert!((rows[3][3] - 2.0).abs() < 1e-9);
        assert!(rows[3][5].abs() < 1e-9);
        assert!((rows[3][6] - 5.0).abs() < 1e-9);
        assert_eq!(rows[3][7], 3.0);
    }

    #[test]
    fn missing_training_set_is_reported() {
        let dir = tempdir().unwrap();
        let result = run(&config(dir.path(), 1), &ProgressReporter::new());
        assert!(matches!(result, Err(WorkflowError::TrainingSetNotFound(_))));
    }

    #[test]
    fn negative_charge_bound_is_rejected() {
        let dir = tempdir().unwrap();
        write_training_set(&dir.path().join("set.csv"));
        let result = run(&config(dir.path(), -1), &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(WorkflowError::Enumeration(
                EnumerationError::NegativeChargeBound(-1)
            ))
        ));
    }

    #[test]
    fn output_file_is_named_after_candidate_count() {
        assert_eq!(output_file_name(3080), "out_3080.csv");
    }
}
