use std::fmt;
use std::ops::Index;

/// The direction of a single-site substitution in the periodic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// One element up (e.g. C -> N), contributes +1 to the charge.
    Up,
    /// One element down (e.g. C -> B), contributes -1 to the charge.
    Down,
}

impl Direction {
    #[inline]
    pub fn level(self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// A substitution applied to one site of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteChange {
    /// Index of the substituted atom in the structure.
    pub site: usize,
    pub direction: Direction,
}

impl SiteChange {
    pub fn up(site: usize) -> Self {
        Self {
            site,
            direction: Direction::Up,
        }
    }

    pub fn down(site: usize) -> Self {
        Self {
            site,
            direction: Direction::Down,
        }
    }
}

/// Per-site substitution levels of one candidate variant of a scaffold.
///
/// Entry `i` is the offset in atomic number applied to site `i` relative to the
/// reference element (0 = unchanged, +1 = one element up, -1 = one element down).
/// The total charge is always derived from the entries and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubstitutionVector(Vec<i8>);

impl SubstitutionVector {
    /// Creates the reference vector (all sites unchanged).
    pub fn zeros(site_count: usize) -> Self {
        Self(vec![0; site_count])
    }

    pub fn from_levels(levels: Vec<i8>) -> Self {
        Self(levels)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn levels(&self) -> &[i8] {
        &self.0
    }

    #[inline]
    pub fn charge(&self) -> i32 {
        self.0.iter().map(|&level| level as i32).sum()
    }

    /// Number of sites whose level differs from the reference.
    pub fn substitution_count(&self) -> usize {
        self.0.iter().filter(|&&level| level != 0).count()
    }

    /// Levels as floating-point coordinates, the form consumed by property models.
    pub fn as_point(&self) -> Vec<f64> {
        self.0.iter().map(|&level| level as f64).collect()
    }

    pub(crate) fn set(&mut self, site: usize, level: i8) {
        self.0[site] = level;
    }
}

impl Index<usize> for SubstitutionVector {
    type Output = i8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for SubstitutionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", level)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_creates_neutral_reference_vector() {
        let vector = SubstitutionVector::zeros(20);
        assert_eq!(vector.len(), 20);
        assert_eq!(vector.charge(), 0);
        assert_eq!(vector.substitution_count(), 0);
    }

    #[test]
    fn charge_is_sum_of_levels() {
        let vector = SubstitutionVector::from_levels(vec![1, -1, 1, 1, 0, -1]);
        assert_eq!(vector.charge(), 1);
        assert_eq!(vector.substitution_count(), 5);
        assert_eq!(vector[0], 1);
        assert_eq!(vector[1], -1);
    }

    #[test]
    fn display_formats_as_tuple() {
        let vector = SubstitutionVector::from_levels(vec![0, 1, -1]);
        assert_eq!(vector.to_string(), "(0, 1, -1)");
    }

    #[test]
    fn direction_levels_are_signed_unit_offsets() {
        assert_eq!(Direction::Up.level(), 1);
        assert_eq!(Direction::Down.level(), -1);
        assert_eq!(SiteChange::up(3).direction, Direction::Up);
        assert_eq!(SiteChange::down(3).site, 3);
    }
}
