use crate::core::models::element::Element;
use crate::core::models::structure::{MolecularStructure, StructureError};
use crate::core::models::substitution::{Direction, SiteChange, SubstitutionVector};
use crate::engine::error::EnumerationError;
use std::fmt;
use std::str::FromStr;

/// Selects the atoms eligible for substitution by element.
///
/// Parses either an element symbol (any case) or an atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteSelector(Element);

impl SiteSelector {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn element(&self) -> Element {
        self.0
    }
}

impl FromStr for SiteSelector {
    type Err = EnumerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let element = match trimmed.parse::<u8>() {
            Ok(number) => Element::from_atomic_number(number),
            Err(_) => Element::from_symbol(trimmed),
        };
        element
            .map(Self)
            .map_err(|_| EnumerationError::InvalidSelector(s.to_string()))
    }
}

impl fmt::Display for SiteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ascending indices of the atoms matched by `selector`.
pub fn eligible_sites(
    structure: &MolecularStructure,
    selector: SiteSelector,
) -> Result<Vec<usize>, EnumerationError> {
    let sites = structure.indices_of(selector.element());
    if sites.is_empty() {
        return Err(EnumerationError::NoEligibleSites {
            selector: selector.to_string(),
            structure: structure.name().to_string(),
        });
    }
    Ok(sites)
}

/// One single or double substitution of the reference structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    changes: Vec<SiteChange>,
    charge: i32,
}

impl Candidate {
    fn new(changes: Vec<SiteChange>, base_charge: i32) -> Self {
        let charge = base_charge
            + changes
                .iter()
                .map(|c| c.direction.level() as i32)
                .sum::<i32>();
        Self { changes, charge }
    }

    pub fn changes(&self) -> &[SiteChange] {
        &self.changes
    }

    /// Total molecular charge after substitution.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn is_double(&self) -> bool {
        self.changes.len() == 2
    }

    /// File-name label `{reference}_{Sym}{idx}[_{Sym}{idx}]_c{charge}`, using the
    /// element symbols of the already substituted structure.
    pub fn label(
        &self,
        reference_name: &str,
        substituted: &MolecularStructure,
    ) -> Result<String, StructureError> {
        let mut label = reference_name.to_string();
        for change in &self.changes {
            let atom = substituted
                .atom(change.site)
                .ok_or(StructureError::SiteOutOfRange {
                    site: change.site,
                    atom_count: substituted.len(),
                })?;
            label.push_str(&format!("_{}{}", atom.symbol(), change.site));
        }
        label.push_str(&format!("_c{}", self.charge));
        Ok(label)
    }

    /// Maps the candidate onto a vector over the eligible sites, in their order.
    pub fn to_vector(&self, eligible: &[usize]) -> Result<SubstitutionVector, EnumerationError> {
        let mut vector = SubstitutionVector::zeros(eligible.len());
        for change in &self.changes {
            let position = eligible
                .iter()
                .position(|&site| site == change.site)
                .ok_or(EnumerationError::SiteNotEligible { site: change.site })?;
            vector.set(position, change.direction.level());
        }
        Ok(vector)
    }
}

/// Number of candidates produced for `n` eligible sites: `2n + 4 * n(n-1)/2`.
pub const fn expected_candidate_count(n: usize) -> usize {
    2 * n + 2 * n * n.saturating_sub(1)
}

const PAIR_ORDER: [(Direction, Direction); 4] = [
    (Direction::Up, Direction::Up),
    (Direction::Down, Direction::Down),
    (Direction::Up, Direction::Down),
    (Direction::Down, Direction::Up),
];

/// Enumerates all single and double substitutions of the eligible sites.
///
/// Singles come first (per site: up, then down), followed by every pair `i < j`
/// in the order up-up, down-down, up-down, down-up.
pub fn enumerate_substitutions(eligible: &[usize], base_charge: i32) -> Vec<Candidate> {
    let n = eligible.len();
    let mut candidates = Vec::with_capacity(expected_candidate_count(n));

    for &site in eligible {
        candidates.push(Candidate::new(vec![SiteChange::up(site)], base_charge));
        candidates.push(Candidate::new(vec![SiteChange::down(site)], base_charge));
    }

    for (i, &first) in eligible.iter().enumerate() {
        for &second in &eligible[i + 1..] {
            for (dir_a, dir_b) in PAIR_ORDER {
                candidates.push(Candidate::new(
                    vec![
                        SiteChange {
                            site: first,
                            direction: dir_a,
                        },
                        SiteChange {
                            site: second,
                            direction: dir_b,
                        },
                    ],
                    base_charge,
                ));
            }
        }
    }

    candidates
}
