use super::atom::Atom;
use super::element::{Element, ElementError};
use super::substitution::SiteChange;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Site {site} is out of range for a structure with {atom_count} atoms")]
    SiteOutOfRange { site: usize, atom_count: usize },
    #[error("Cannot substitute site {site}: {source}")]
    InvalidSubstitution {
        site: usize,
        #[source]
        source: ElementError,
    },
}

/// An immutable molecular structure: a named, ordered list of atoms.
///
/// Substitutions never modify a structure in place. [`MolecularStructure::substituted`]
/// derives an independent copy, so a reference structure can be shared freely
/// while thousands of variants are generated from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MolecularStructure {
    name: String,
    atoms: Vec<Atom>,
}

impl MolecularStructure {
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.into(),
            atoms,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the indices of all atoms of `element`, in ascending order.
    pub fn indices_of(&self, element: Element) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.element == element)
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns a copy of this structure with every change applied.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::SiteOutOfRange`] if a change refers to a missing atom,
    /// or [`StructureError::InvalidSubstitution`] if the shifted element would fall
    /// outside the periodic table.
    pub fn substituted(&self, changes: &[SiteChange]) -> Result<Self, StructureError> {
        let mut atoms = self.atoms.clone();
        for change in changes {
            let atom = atoms
                .get_mut(change.site)
                .ok_or(StructureError::SiteOutOfRange {
                    site: change.site,
                    atom_count: self.atoms.len(),
                })?;
            atom.element = atom
                .element
                .shifted(change.direction.level() as i32)
                .map_err(|source| StructureError::InvalidSubstitution {
                    site: change.site,
                    source,
                })?;
        }
        Ok(Self {
            name: self.name.clone(),
            atoms,
        })
    }
}
