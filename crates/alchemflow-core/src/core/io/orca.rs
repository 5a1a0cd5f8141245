use crate::core::models::element::Element;
use std::path::Path;
use thiserror::Error;

/// Hartree to electron-volt conversion factor (CODATA 2018).
pub const HARTREE_TO_EV: f64 = 27.211386245988;

const COORDINATES_HEADER: &str = "CARTESIAN COORDINATES (ANGSTROEM)";
const ENERGY_MARKER: &str = "FINAL SINGLE POINT ENERGY";
const ORBITALS_HEADER: &str = "ORBITAL ENERGIES";
const GRADIENT_HEADER: &str = "CARTESIAN GRADIENT";

#[derive(Debug, Error)]
pub enum OrcaError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// The quantities the training set needs from one ORCA single-point output.
///
/// Every block is taken from its last occurrence in the file, so outputs of
/// geometry optimisations yield the values of the final geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrcaOutput {
    /// Atomic numbers in input order.
    pub atomic_numbers: Vec<u8>,
    /// Final SCF energy in eV.
    pub energy: f64,
    /// Alpha orbital energies in eV, ascending.
    pub orbital_energies: Vec<f64>,
    /// Alpha orbital occupations, aligned with `orbital_energies`.
    pub occupations: Vec<f64>,
    /// Flattened Cartesian gradient (x, y, z per atom) in Hartree/Bohr.
    pub gradient: Vec<f64>,
}

impl OrcaOutput {
    pub fn from_path(path: &Path) -> Result<Self, OrcaError> {
        let content = std::fs::read_to_string(path).map_err(|e| OrcaError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, OrcaError> {
        let lines: Vec<&str> = content.lines().collect();

        let atomic_numbers = parse_coordinates(&lines)?;
        let energy = parse_final_energy(&lines)? * HARTREE_TO_EV;
        let (occupations, orbital_energies) = parse_orbitals(&lines)?;
        let gradient = parse_gradient(&lines)?;

        if gradient.len() != 3 * atomic_numbers.len() {
            return Err(OrcaError::Inconsistency(format!(
                "expected {} gradient components for {} atoms, found {}",
                3 * atomic_numbers.len(),
                atomic_numbers.len(),
                gradient.len()
            )));
        }

        let output = Self {
            atomic_numbers,
            energy,
            orbital_energies,
            occupations,
            gradient,
        };
        output.lumo_index()?;
        Ok(output)
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atomic_numbers.len()
    }

    /// Index of the highest orbital with non-zero occupation.
    pub fn homo_index(&self) -> Result<usize, OrcaError> {
        self.occupations
            .iter()
            .rposition(|&occ| occ > 0.0)
            .ok_or_else(|| OrcaError::Inconsistency("no occupied orbitals".to_string()))
    }

    fn lumo_index(&self) -> Result<usize, OrcaError> {
        let lumo = self.homo_index()? + 1;
        if lumo >= self.orbital_energies.len() {
            return Err(OrcaError::Inconsistency(
                "no virtual orbital printed above the HOMO".to_string(),
            ));
        }
        Ok(lumo)
    }

    pub fn homo(&self) -> Result<f64, OrcaError> {
        Ok(self.orbital_energies[self.homo_index()?])
    }

    pub fn lumo(&self) -> Result<f64, OrcaError> {
        Ok(self.orbital_energies[self.lumo_index()?])
    }
}

fn last_line_containing(lines: &[&str], marker: &str) -> Option<usize> {
    lines.iter().rposition(|line| line.contains(marker))
}

fn parse_error(line_idx: usize, message: impl Into<String>) -> OrcaError {
    OrcaError::Parse {
        line: line_idx + 1,
        message: message.into(),
    }
}

fn parse_coordinates(lines: &[&str]) -> Result<Vec<u8>, OrcaError> {
    let header = last_line_containing(lines, COORDINATES_HEADER)
        .ok_or(OrcaError::MissingSection(COORDINATES_HEADER))?;

    let mut numbers = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(header + 1) {
        let trimmed = line.trim();
        if trimmed.starts_with("---") {
            continue;
        }
        if trimmed.is_empty() {
            break;
        }
        let symbol = trimmed.split_whitespace().next().unwrap_or_default();
        let element = Element::from_symbol(symbol).map_err(|e| parse_error(idx, e.to_string()))?;
        numbers.push(element.atomic_number());
    }

    if numbers.is_empty() {
        return Err(OrcaError::MissingSection(COORDINATES_HEADER));
    }
    Ok(numbers)
}

fn parse_final_energy(lines: &[&str]) -> Result<f64, OrcaError> {
    let idx =
        last_line_containing(lines, ENERGY_MARKER).ok_or(OrcaError::MissingSection(ENERGY_MARKER))?;
    let raw = lines[idx].split_whitespace().last().unwrap_or_default();
    raw.parse()
        .map_err(|_| parse_error(idx, format!("invalid energy value '{}'", raw)))
}

fn parse_orbitals(lines: &[&str]) -> Result<(Vec<f64>, Vec<f64>), OrcaError> {
    let header = lines
        .iter()
        .rposition(|line| line.trim() == ORBITALS_HEADER)
        .ok_or(OrcaError::MissingSection(ORBITALS_HEADER))?;

    let table_start = lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            trimmed.starts_with("NO") && trimmed.contains("OCC")
        })
        .map(|(idx, _)| idx)
        .ok_or(OrcaError::MissingSection(ORBITALS_HEADER))?;

    let mut occupations = Vec::new();
    let mut energies = Vec::new();
    // Unrestricted outputs list the spin-down table afterwards; the first table is alpha.
    for (idx, line) in lines.iter().enumerate().skip(table_start + 1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[0].parse::<usize>().is_err() {
            break;
        }
        let occ: f64 = fields[1]
            .parse()
            .map_err(|_| parse_error(idx, format!("invalid occupation '{}'", fields[1])))?;
        let energy_ev: f64 = fields[3]
            .parse()
            .map_err(|_| parse_error(idx, format!("invalid orbital energy '{}'", fields[3])))?;
        occupations.push(occ);
        energies.push(energy_ev);
    }

    if energies.is_empty() {
        return Err(OrcaError::MissingSection(ORBITALS_HEADER));
    }
    Ok((occupations, energies))
}

fn parse_gradient(lines: &[&str]) -> Result<Vec<f64>, OrcaError> {
    let header = lines
        .iter()
        .rposition(|line| line.trim() == GRADIENT_HEADER)
        .ok_or(OrcaError::MissingSection(GRADIENT_HEADER))?;

    let mut gradient = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(header + 1) {
        let trimmed = line.trim();
        if trimmed.starts_with("---") || (trimmed.is_empty() && gradient.is_empty()) {
            continue;
        }
        let Some((_, values)) = trimmed.split_once(':') else {
            break;
        };
        for raw in values.split_whitespace() {
            let value: f64 = raw
                .parse()
                .map_err(|_| parse_error(idx, format!("invalid gradient component '{}'", raw)))?;
            gradient.push(value);
        }
    }

    if gradient.is_empty() {
        return Err(OrcaError::MissingSection(GRADIENT_HEADER));
    }
    Ok(gradient)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) fn sample_output(symbols: &[&str]) -> String {
        let mut out = String::new();
        out.push_str("                 *****************\n");
        out.push_str("                 * O   R   C   A *\n");
        out.push_str("---------------------------------\n");
        out.push_str("CARTESIAN COORDINATES (ANGSTROEM)\n");
        out.push_str("---------------------------------\n");
        for (i, symbol) in symbols.iter().enumerate() {
            out.push_str(&format!(
                "  {}      {:.6}    0.000000    0.000000\n",
                symbol,
                i as f64 * 1.4
            ));
        }
        out.push('\n');
        out.push_str("----------------------------\n");
        out.push_str("CARTESIAN COORDINATES (A.U.)\n");
        out.push_str("----------------------------\n\n");
        out.push_str("----------------\nORBITAL ENERGIES\n----------------\n\n");
        out.push_str("  NO   OCC          E(Eh)            E(eV) \n");
        out.push_str("   0   2.0000     -10.200000      -277.5561 \n");
        out.push_str("   1   2.0000      -0.300000        -8.1634 \n");
        out.push_str("   2   0.0000       0.050000         1.3606 \n");
        out.push_str("   3   0.0000       0.120000         3.2654 \n\n");
        out.push_str("-------------------------   --------------------\n");
        out.push_str("FINAL SINGLE POINT ENERGY      -76.400000000000\n");
        out.push_str("-------------------------   --------------------\n\n");
        out.push_str("------------------\nCARTESIAN GRADIENT\n------------------\n\n");
        for (i, symbol) in symbols.iter().enumerate() {
            out.push_str(&format!(
                "   {}   {}   :   {:.9}   {:.9}   {:.9}\n",
                i + 1,
                symbol,
                0.001 * (i as f64 + 1.0),
                -0.002,
                0.0
            ));
        }
        out.push_str("\nDifference to translation invariance:\n");
        out
    }

    #[test]
    fn parse_extracts_all_quantities() {
        let output = OrcaOutput::parse(&sample_output(&["C", "N", "B"])).unwrap();

        assert_eq!(output.atomic_numbers, vec![6, 7, 5]);
        assert_eq!(output.atom_count(), 3);
        assert!((output.energy - (-76.4 * HARTREE_TO_EV)).abs() < 1e-9);
        assert_eq!(output.homo_index().unwrap(), 1);
        assert_eq!(output.homo().unwrap(), -8.1634);
        assert_eq!(output.lumo().unwrap(), 1.3606);
        assert_eq!(output.gradient.len(), 9);
        assert_eq!(output.gradient[0], 0.001);
        assert_eq!(output.gradient[1], -0.002);
        assert_eq!(output.gradient[3], 0.002);
    }

    #[test]
    fn parse_uses_last_occurrence_of_each_block() {
        let first = sample_output(&["C", "C"]).replace("-76.400000000000", "-70.0");
        let second = sample_output(&["C", "N"]);
        let output = OrcaOutput::parse(&format!("{}{}", first, second)).unwrap();
        assert_eq!(output.atomic_numbers, vec![6, 7]);
        assert!((output.energy - (-76.4 * HARTREE_TO_EV)).abs() < 1e-9);
    }

    #[test]
    fn parse_reads_only_alpha_orbitals_of_unrestricted_output() {
        let content = sample_output(&["C"]).replace(
            "  NO   OCC          E(Eh)            E(eV) \n   0   2.0000     -10.200000      -277.5561 \n   1   2.0000      -0.300000        -8.1634 \n   2   0.0000       0.050000         1.3606 \n   3   0.0000       0.120000         3.2654 \n",
            "                 SPIN UP ORBITALS\n  NO   OCC          E(Eh)            E(eV) \n   0   1.0000     -10.0      -272.1 \n   1   0.0000      0.1         2.7 \n\n                 SPIN DOWN ORBITALS\n  NO   OCC          E(Eh)            E(eV) \n   0   1.0000     -9.0      -244.9 \n   1   0.0000      0.2         5.4 \n",
        );
        let output = OrcaOutput::parse(&content).unwrap();
        assert_eq!(output.orbital_energies, vec![-272.1, 2.7]);
        assert_eq!(output.homo().unwrap(), -272.1);
        assert_eq!(output.lumo().unwrap(), 2.7);
    }

    #[test]
    fn parse_reports_missing_sections() {
        let content = sample_output(&["C"]).replace("FINAL SINGLE POINT ENERGY", "SOMETHING ELSE");
        assert!(matches!(
            OrcaOutput::parse(&content),
            Err(OrcaError::MissingSection(ENERGY_MARKER))
        ));

        let content = sample_output(&["C"]).replace("CARTESIAN GRADIENT", "NO GRADIENT HERE");
        assert!(matches!(
            OrcaOutput::parse(&content),
            Err(OrcaError::MissingSection(GRADIENT_HEADER))
        ));
    }

    #[test]
    fn parse_rejects_gradient_atom_mismatch() {
        let content = sample_output(&["C", "N"]).replace("   2   N   :", "   2   N   x");
        assert!(matches!(
            OrcaOutput::parse(&content),
            Err(OrcaError::Inconsistency(_))
        ));
    }

    #[test]
    fn parse_rejects_output_without_virtual_orbitals() {
        let content = sample_output(&["C"])
            .replace("   2   0.0000       0.050000         1.3606 \n", "")
            .replace("   3   0.0000       0.120000         3.2654 \n", "");
        assert!(matches!(
            OrcaOutput::parse(&content),
            Err(OrcaError::Inconsistency(_))
        ));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = OrcaOutput::from_path(&dir.path().join("missing.out"));
        assert!(matches!(result, Err(OrcaError::Io { .. })));

        let path = dir.path().join("present.out");
        fs::write(&path, sample_output(&["C"])).unwrap();
        assert!(OrcaOutput::from_path(&path).is_ok());
    }
}
