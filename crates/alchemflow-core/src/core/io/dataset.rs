use crate::core::io::hessian::{HessianError, OrcaHessian};
use crate::core::io::orca::{OrcaError, OrcaOutput};
use crate::core::models::scaffold::ScaffoldConfig;
use crate::core::models::substitution::SubstitutionVector;
use std::path::Path;
use thiserror::Error;

/// Name of the row-key column holding the source file name.
pub const FILE_COLUMN: &str = "file";
pub const ENERGY_COLUMN: &str = "Energy";
pub const HOMO_COLUMN: &str = "HOMO";
pub const LUMO_COLUMN: &str = "LUMO";

const AXES: [char; 3] = ['x', 'y', 'z'];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Training set has no rows")]
    Empty,
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("Invalid value '{value}' in row {row}, column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row for '{file}' has {found} columns, expected {expected}")]
    InconsistentLayout {
        file: String,
        expected: usize,
        found: usize,
    },
    #[error("Structure has {atom_count} atoms but the scaffold needs {site_count} sites")]
    TooFewAtoms { atom_count: usize, site_count: usize },
    #[error("Hessian dimension {found} does not match 3 x {atom_count} atoms")]
    HessianMismatch { found: usize, atom_count: usize },
    #[error("Site {site} has substitution level {level}; only -1, 0 and +1 are allowed")]
    LevelOutOfRange { site: usize, level: i32 },
    #[error(transparent)]
    Orca(#[from] OrcaError),
    #[error(transparent)]
    Hessian(#[from] HessianError),
}

/// One computed structure: its substitution pattern and the quantities parsed from
/// the quantum-chemistry output.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub file: String,
    pub levels: SubstitutionVector,
    pub energy: f64,
    pub homo: f64,
    pub lumo: f64,
    pub gradient: Vec<f64>,
    pub hessian: Vec<f64>,
}

impl TrainingRecord {
    /// Builds a record from an ORCA output and its Hessian companion.
    ///
    /// The substitution level of site `i` is the atomic-number offset of atom `i`
    /// from the scaffold's reference element (B -> -1, N -> +1 on a carbon scaffold).
    /// Any other offset means the leading atoms are not the scaffold sites and is
    /// rejected with [`DatasetError::LevelOutOfRange`].
    pub fn from_orca(
        file: impl Into<String>,
        output: &OrcaOutput,
        hessian: &OrcaHessian,
        scaffold: &ScaffoldConfig,
    ) -> Result<Self, DatasetError> {
        let site_count = scaffold.site_count();
        if output.atom_count() < site_count {
            return Err(DatasetError::TooFewAtoms {
                atom_count: output.atom_count(),
                site_count,
            });
        }
        if hessian.dimension() != 3 * output.atom_count() {
            return Err(DatasetError::HessianMismatch {
                found: hessian.dimension(),
                atom_count: output.atom_count(),
            });
        }

        let reference = scaffold.reference_element().atomic_number() as i32;
        let levels = output.atomic_numbers[..site_count]
            .iter()
            .enumerate()
            .map(|(site, &z)| {
                let level = z as i32 - reference;
                if !(-1..=1).contains(&level) {
                    return Err(DatasetError::LevelOutOfRange { site, level });
                }
                Ok(level as i8)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            file: file.into(),
            levels: SubstitutionVector::from_levels(levels),
            energy: output.energy,
            homo: output.homo()?,
            lumo: output.lumo()?,
            gradient: output.gradient.clone(),
            hessian: hessian.flattened(),
        })
    }

    /// Column names of this record, excluding the file column.
    pub fn column_names(&self, site_columns: &[String]) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.width());
        columns.extend(site_columns.iter().cloned());
        columns.push(ENERGY_COLUMN.to_string());
        columns.push(HOMO_COLUMN.to_string());
        columns.push(LUMO_COLUMN.to_string());
        columns.extend(
            (0..self.gradient.len()).map(|i| format!("grad[{}][{}]", i / 3, AXES[i % 3])),
        );
        let dim = (self.hessian.len() as f64).sqrt().round() as usize;
        columns.extend((0..self.hessian.len()).map(|i| format!("hess[{}][{}]", i / dim, i % dim)));
        columns
    }

    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.width());
        values.extend(self.levels.levels().iter().map(|&level| level as f64));
        values.push(self.energy);
        values.push(self.homo);
        values.push(self.lumo);
        values.extend_from_slice(&self.gradient);
        values.extend_from_slice(&self.hessian);
        values
    }

    fn width(&self) -> usize {
        self.levels.len() + 3 + self.gradient.len() + self.hessian.len()
    }
}

/// A tabular training set: named `f64` columns, one row per computed structure,
/// keyed by the source file name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingSet {
    columns: Vec<String>,
    keys: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TrainingSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            keys: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a set from records that share one column layout.
    pub fn from_records(
        records: &[TrainingRecord],
        site_columns: &[String],
    ) -> Result<Self, DatasetError> {
        let first = records.first().ok_or(DatasetError::Empty)?;
        let mut set = Self::new(first.column_names(site_columns));
        for record in records {
            set.push_row(record.file.clone(), record.values())?;
        }
        Ok(set)
    }

    pub fn push_row(&mut self, key: String, values: Vec<f64>) -> Result<(), DatasetError> {
        if values.len() != self.columns.len() {
            return Err(DatasetError::InconsistentLayout {
                file: key,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.keys.push(key);
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, DatasetError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// All columns that are not inputs, in file order.
    pub fn output_columns(&self, input_columns: &[String]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !input_columns.contains(column))
            .cloned()
            .collect()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DatasetError> {
        let csv_err = |source: csv::Error| DatasetError::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

        let header = std::iter::once(FILE_COLUMN).chain(self.columns.iter().map(String::as_str));
        writer.write_record(header).map_err(csv_err)?;
        for (key, row) in self.keys.iter().zip(&self.rows) {
            let record = std::iter::once(key.clone()).chain(row.iter().map(|v| v.to_string()));
            writer.write_record(record).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| DatasetError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn read_csv(path: &Path) -> Result<Self, DatasetError> {
        let csv_err = |source: csv::Error| DatasetError::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let headers = reader.headers().map_err(csv_err)?.clone();
        if headers.get(0) != Some(FILE_COLUMN) {
            return Err(DatasetError::MissingColumn(FILE_COLUMN.to_string()));
        }
        let mut set = Self::new(headers.iter().skip(1).map(str::to_string).collect());

        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let key = record.get(0).unwrap_or_default().to_string();
            let values = record
                .iter()
                .skip(1)
                .zip(&set.columns)
                .map(|(raw, column)| {
                    raw.trim().parse::<f64>().map_err(|_| DatasetError::InvalidValue {
                        row: row_idx + 1,
                        column: column.clone(),
                        value: raw.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            set.push_row(key, values)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::hessian::tests::sample_hessian;
    use crate::core::io::orca::tests::sample_output;
    use crate::core::models::element::Element;
    use crate::core::models::scaffold::SymmetryGroup;
    use std::fs;
    use tempfile::tempdir;

    fn two_site_scaffold() -> ScaffoldConfig {
        ScaffoldConfig::new(
            2,
            Element::CARBON,
            vec![SymmetryGroup::new("pair", vec![0, 1], 2)],
        )
        .unwrap()
    }

    fn record(symbols: &[&str]) -> TrainingRecord {
        let output = OrcaOutput::parse(&sample_output(symbols)).unwrap();
        let hessian = OrcaHessian::parse(&sample_hessian(3 * symbols.len())).unwrap();
        TrainingRecord::from_orca("mol.out", &output, &hessian, &two_site_scaffold()).unwrap()
    }

    #[test]
    fn from_orca_maps_elements_to_levels() {
        let rec = record(&["N", "B", "H"]);
        assert_eq!(rec.levels.levels(), &[1, -1]);
        assert_eq!(rec.homo, -8.1634);
        assert_eq!(rec.lumo, 1.3606);
        assert_eq!(rec.gradient.len(), 9);
        assert_eq!(rec.hessian.len(), 81);
    }

    #[test]
    fn from_orca_rejects_too_few_atoms_and_bad_hessian() {
        let output = OrcaOutput::parse(&sample_output(&["C"])).unwrap();
        let hessian = OrcaHessian::parse(&sample_hessian(3)).unwrap();
        assert!(matches!(
            TrainingRecord::from_orca("a.out", &output, &hessian, &two_site_scaffold()),
            Err(DatasetError::TooFewAtoms { .. })
        ));

        let output = OrcaOutput::parse(&sample_output(&["C", "C"])).unwrap();
        assert!(matches!(
            TrainingRecord::from_orca("a.out", &output, &hessian, &two_site_scaffold()),
            Err(DatasetError::HessianMismatch { .. })
        ));
    }

    #[test]
    fn from_orca_rejects_non_unit_levels() {
        let output = OrcaOutput::parse(&sample_output(&["C", "O", "H"])).unwrap();
        let hessian = OrcaHessian::parse(&sample_hessian(9)).unwrap();
        match TrainingRecord::from_orca("oxo.out", &output, &hessian, &two_site_scaffold()) {
            Err(DatasetError::LevelOutOfRange { site, level }) => {
                assert_eq!(site, 1);
                assert_eq!(level, 2);
            }
            other => panic!("expected LevelOutOfRange, got {:?}", other.map(|r| r.file)),
        }
    }

    #[test]
    fn column_names_follow_training_set_layout() {
        let rec = record(&["C", "C"]);
        let columns = rec.column_names(&two_site_scaffold().site_columns());
        assert_eq!(&columns[..5], &["z0", "z1", "Energy", "HOMO", "LUMO"]);
        assert_eq!(columns[5], "grad[0][x]");
        assert_eq!(columns[10], "grad[1][z]");
        assert_eq!(columns[11], "hess[0][0]");
        assert_eq!(columns[11 + 7], "hess[1][1]");
        assert_eq!(columns.len(), rec.values().len());
    }

    #[test]
    fn from_records_rejects_inconsistent_layouts() {
        let records = vec![record(&["C", "C"]), record(&["C", "C", "H"])];
        let result = TrainingSet::from_records(&records, &two_site_scaffold().site_columns());
        assert!(matches!(
            result,
            Err(DatasetError::InconsistentLayout { .. })
        ));
        assert!(matches!(
            TrainingSet::from_records(&[], &[]),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn csv_written_by_write_csv_is_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("set.csv");
        let mut records = vec![record(&["N", "C"]), record(&["C", "B"])];
        records[1].file = "other.out".to_string();
        let set = TrainingSet::from_records(&records, &two_site_scaffold().site_columns()).unwrap();

        set.write_csv(&path).unwrap();
        let reread = TrainingSet::read_csv(&path).unwrap();

        assert_eq!(reread, set);
        assert_eq!(reread.keys(), &["mol.out", "other.out"]);
        assert_eq!(reread.rows()[1][1], -1.0);
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("file,z0,z1,Energy,HOMO,LUMO,grad[0][x]"));
    }

    #[test]
    fn read_csv_reports_missing_key_column_and_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "name,z0\na,1\n").unwrap();
        assert!(matches!(
            TrainingSet::read_csv(&path),
            Err(DatasetError::MissingColumn(_))
        ));

        fs::write(&path, "file,z0,Energy\na,1,2.5\nb,0,oops\n").unwrap();
        match TrainingSet::read_csv(&path) {
            Err(DatasetError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Energy");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn output_columns_excludes_inputs() {
        let set = TrainingSet::new(vec![
            "z0".to_string(),
            "z1".to_string(),
            "Energy".to_string(),
            "HOMO".to_string(),
        ]);
        let outputs = set.output_columns(&["z0".to_string(), "z1".to_string()]);
        assert_eq!(outputs, vec!["Energy", "HOMO"]);
        assert_eq!(set.column_index("HOMO").unwrap(), 3);
        assert!(set.column_index("LUMO").is_err());
    }
}
