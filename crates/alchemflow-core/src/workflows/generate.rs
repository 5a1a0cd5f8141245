use super::WorkflowError;
use crate::core::io::traits::MolecularFile;
use crate::core::io::xyz::{XyzFile, XyzMetadata};
use crate::engine::config::GenerationConfig;
use crate::engine::enumeration::{eligible_sites, enumerate_substitutions};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub reference_name: String,
    pub eligible_sites: Vec<usize>,
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

#[instrument(
    skip_all,
    name = "generation_workflow",
    fields(reference = %config.reference_path.display())
)]
pub fn run(
    config: &GenerationConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationReport, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Reading Reference",
    });
    if !config.reference_path.is_file() {
        return Err(WorkflowError::ReferenceNotFound(
            config.reference_path.clone(),
        ));
    }
    let (reference, _) =
        XyzFile::read_from_path(&config.reference_path).map_err(|source| WorkflowError::Xyz {
            path: config.reference_path.clone(),
            source,
        })?;
    let eligible = eligible_sites(&reference, config.selector)?;
    info!(
        atoms = reference.len(),
        eligible = eligible.len(),
        "Found {} eligible '{}' sites in '{}'.",
        eligible.len(),
        config.selector,
        reference.name()
    );
    reporter.report(Progress::PhaseFinish);

    std::fs::create_dir_all(&config.output_dir).map_err(WorkflowError::io(&config.output_dir))?;

    let candidates = enumerate_substitutions(&eligible, config.base_charge);
    reporter.report(Progress::PhaseStart {
        name: "Writing Geometries",
    });
    let written = reporter.task(candidates.len() as u64, |increment| {
        let mut written = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let variant = reference
                .substituted(candidate.changes())
                .map_err(EngineError::from)?;
            let label = candidate
                .label(reference.name(), &variant)
                .map_err(EngineError::from)?;
            let path = config.output_dir.join(format!("{}.xyz", label));
            let metadata = XyzMetadata::new(format!("{} charge={}", label, candidate.charge()));

            XyzFile::write_to_path(&variant.with_name(label), &metadata, &path).map_err(
                |source| WorkflowError::Xyz {
                    path: path.clone(),
                    source,
                },
            )?;
            debug!(path = %path.display(), "Wrote substituted geometry.");
            written.push(path);
            increment();
        }
        Ok::<_, WorkflowError>(written)
    })?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Generated {} substituted geometries in '{}'.",
        written.len(),
        config.output_dir.display()
    );
    Ok(GenerationReport {
        reference_name: reference.name().to_string(),
        eligible_sites: eligible,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GenerationConfigBuilder;
    use crate::engine::enumeration::{SiteSelector, expected_candidate_count};
    use crate::engine::error::EnumerationError;
    use std::fs;
    use tempfile::tempdir;

    const MINI_RING: &str = "4\nmini ring\nC 0.0 0.0 0.0\nC 1.4 0.0 0.0\nH 2.0 1.0 0.0\nC 0.0 1.4 0.0\n";

    fn config(dir: &std::path::Path, reference: &str) -> GenerationConfig {
        GenerationConfigBuilder::new()
            .reference_path(dir.join(reference))
            .output_dir(dir.join("geoms"))
            .build()
            .unwrap()
    }

    #[test]
    fn writes_one_geometry_per_candidate() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ring.xyz"), MINI_RING).unwrap();

        let report = run(&config(dir.path(), "ring.xyz"), &ProgressReporter::new()).unwrap();

        assert_eq!(report.reference_name, "ring");
        assert_eq!(report.eligible_sites, vec![0, 1, 3]);
        assert_eq!(report.count(), expected_candidate_count(3));
        let files = fs::read_dir(dir.path().join("geoms")).unwrap().count();
        assert_eq!(files, 18);

        let first = fs::read_to_string(dir.path().join("geoms/ring_N0_c1.xyz")).unwrap();
        let lines: Vec<&str> = first.lines().collect();
        assert_eq!(lines[0], "4");
        assert_eq!(lines[1], "ring_N0_c1 charge=1");
        assert!(lines[2].starts_with("N "));
        assert!(lines[3].starts_with("C "));
        assert!(dir.path().join("geoms/ring_B1_N3_c0.xyz").exists());
    }

    #[test]
    fn base_charge_appears_in_labels() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ring.xyz"), MINI_RING).unwrap();
        let mut config = config(dir.path(), "ring.xyz");
        config.base_charge = -2;

        run(&config, &ProgressReporter::new()).unwrap();

        assert!(dir.path().join("geoms/ring_N0_c-1.xyz").exists());
        assert!(dir.path().join("geoms/ring_B0_B1_c-4.xyz").exists());
    }

    #[test]
    fn missing_reference_is_reported_without_output() {
        let dir = tempdir().unwrap();
        let result = run(&config(dir.path(), "absent.xyz"), &ProgressReporter::new());
        assert!(matches!(result, Err(WorkflowError::ReferenceNotFound(_))));
        assert!(!dir.path().join("geoms").exists());
    }

    #[test]
    fn no_eligible_sites_fails_before_writing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ring.xyz"), MINI_RING).unwrap();
        let mut config = config(dir.path(), "ring.xyz");
        config.selector = "N".parse::<SiteSelector>().unwrap();

        let result = run(&config, &ProgressReporter::new());

        assert!(matches!(
            result,
            Err(WorkflowError::Enumeration(
                EnumerationError::NoEligibleSites { .. }
            ))
        ));
        assert!(!dir.path().join("geoms").exists());
    }
}
