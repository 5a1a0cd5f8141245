use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::{Element, ElementError};
use crate::core::models::structure::MolecularStructure;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// The free-text second line of an XYZ file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XyzMetadata {
    pub comment: String,
}

impl XyzMetadata {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Atom count mismatch: header declares {declared} atoms, found {found}")]
    AtomCountMismatch { declared: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Missing atom count header")]
    MissingHeader,
    #[error("Invalid atom count '{0}'")]
    InvalidCount(String),
    #[error("Atom line requires a symbol and three coordinates")]
    TooFewFields,
    #[error("Invalid coordinate '{0}'")]
    InvalidFloat(String),
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Plain XYZ coordinate files: atom count, comment line, then `Sym x y z` per atom.
pub struct XyzFile;

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, XyzError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::TooFewFields,
        });
    }

    let element = parse_element_field(fields[0]).map_err(|e| XyzError::Parse {
        line: line_num,
        kind: e.into(),
    })?;

    let mut coords = [0.0; 3];
    for (slot, raw) in coords.iter_mut().zip(&fields[1..4]) {
        *slot = raw.parse().map_err(|_| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::InvalidFloat(raw.to_string()),
        })?;
    }

    Ok(Atom::new(
        element,
        Point3::new(coords[0], coords[1], coords[2]),
    ))
}

// Some writers emit atomic numbers instead of symbols in the first column.
fn parse_element_field(field: &str) -> Result<Element, ElementError> {
    match field.parse::<u8>() {
        Ok(number) => Element::from_atomic_number(number),
        Err(_) => Element::from_symbol(field),
    }
}

impl MolecularFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularStructure, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::MissingHeader,
        })?;
        let declared: usize = header.trim().parse().map_err(|_| XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::InvalidCount(header.trim().to_string()),
        })?;

        let comment = lines.next().transpose()?.unwrap_or_default();

        let mut atoms = Vec::with_capacity(declared);
        for (offset, line_res) in lines.enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                if atoms.len() == declared {
                    break;
                }
                continue;
            }
            if atoms.len() == declared {
                break;
            }
            atoms.push(parse_atom_line(&line, offset + 3)?);
        }

        if atoms.len() != declared {
            return Err(XyzError::AtomCountMismatch {
                declared,
                found: atoms.len(),
            });
        }

        Ok((
            MolecularStructure::new(String::new(), atoms),
            XyzMetadata {
                comment: comment.trim_end().to_string(),
            },
        ))
    }

    fn write_to(
        structure: &MolecularStructure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.len())?;
        writeln!(writer, "{}", metadata.comment)?;
        for atom in structure.atoms() {
            writeln!(
                writer,
                "{:<2} {:>15.8} {:>15.8} {:>15.8}",
                atom.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }

    fn write_structure_to(
        structure: &MolecularStructure,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(
            structure,
            &XyzMetadata::new(structure.name().to_string()),
            writer,
        )
    }
}
