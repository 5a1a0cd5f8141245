use crate::core::models::scaffold::{ScaffoldConfig, SymmetryGroup};
use crate::core::models::substitution::SubstitutionVector;
use crate::engine::error::EnumerationError;

/// One canonical substitution pattern of a symmetry group.
///
/// `levels` holds `negative` entries of -1, then `substituted - negative` entries
/// of +1, then zeros, aligned with the group's site indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPattern {
    pub substituted: usize,
    pub negative: usize,
    pub levels: Vec<i8>,
    pub charge: i32,
}

/// All canonical patterns of `group`, ordered by total substitutions, then by
/// number of negative (down) substitutions.
///
/// Yields `sum_{k=0}^{m} (k + 1)` patterns for `m = max_substitutions`.
pub fn group_patterns(group: &SymmetryGroup) -> Vec<GroupPattern> {
    let size = group.size();
    let mut patterns = Vec::new();
    for substituted in 0..=group.max_substitutions.min(size) {
        for negative in 0..=substituted {
            let positive = substituted - negative;
            let mut levels = Vec::with_capacity(size);
            levels.extend(std::iter::repeat_n(-1i8, negative));
            levels.extend(std::iter::repeat_n(1i8, positive));
            levels.extend(std::iter::repeat_n(0i8, size - substituted));
            patterns.push(GroupPattern {
                substituted,
                negative,
                levels,
                charge: positive as i32 - negative as i32,
            });
        }
    }
    patterns
}

/// Odometer over one pattern index per group; the last group turns fastest.
struct PatternOdometer {
    sizes: Vec<usize>,
    current: Vec<usize>,
    exhausted: bool,
}

impl PatternOdometer {
    fn new(sizes: Vec<usize>) -> Self {
        let exhausted = sizes.iter().any(|&n| n == 0);
        Self {
            current: vec![0; sizes.len()],
            sizes,
            exhausted,
        }
    }
}

impl Iterator for PatternOdometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.current.clone();

        let mut wheel = self.sizes.len();
        loop {
            if wheel == 0 {
                self.exhausted = true;
                break;
            }
            wheel -= 1;
            self.current[wheel] += 1;
            if self.current[wheel] < self.sizes[wheel] {
                break;
            }
            self.current[wheel] = 0;
        }
        Some(item)
    }
}

struct GroupTable<'a> {
    groups: &'a [SymmetryGroup],
    patterns: Vec<Vec<GroupPattern>>,
}

impl<'a> GroupTable<'a> {
    fn new(config: &'a ScaffoldConfig) -> Self {
        Self {
            groups: config.groups(),
            patterns: config.groups().iter().map(group_patterns).collect(),
        }
    }

    fn odometer(&self) -> PatternOdometer {
        PatternOdometer::new(self.patterns.iter().map(Vec::len).collect())
    }

    fn charge(&self, selection: &[usize]) -> i32 {
        selection
            .iter()
            .zip(&self.patterns)
            .map(|(&p, patterns)| patterns[p].charge)
            .sum()
    }

    fn merge(&self, selection: &[usize], site_count: usize) -> SubstitutionVector {
        let mut vector = SubstitutionVector::zeros(site_count);
        for ((&p, patterns), group) in selection.iter().zip(&self.patterns).zip(self.groups) {
            for (&site, &level) in group.indices.iter().zip(&patterns[p].levels) {
                vector.set(site, level);
            }
        }
        vector
    }
}

fn check_bound(max_charge: i32) -> Result<(), EnumerationError> {
    if max_charge < 0 {
        return Err(EnumerationError::NegativeChargeBound(max_charge));
    }
    Ok(())
}

/// Generates every combination of group patterns whose total charge lies in
/// `[-max_charge, max_charge]`, merged into full substitution vectors.
///
/// Combinations are visited in nested-loop order over the configured groups
/// (first group outermost), so the output is deterministic and any prefix can be
/// regenerated by running the enumeration again.
pub fn generate_structures(
    config: &ScaffoldConfig,
    max_charge: i32,
) -> Result<Vec<SubstitutionVector>, EnumerationError> {
    check_bound(max_charge)?;
    let table = GroupTable::new(config);
    Ok(table
        .odometer()
        .filter(|selection| table.charge(selection).abs() <= max_charge)
        .map(|selection| table.merge(&selection, config.site_count()))
        .collect())
}

/// Number of vectors [`generate_structures`] would return, without building them.
pub fn count_structures(
    config: &ScaffoldConfig,
    max_charge: i32,
) -> Result<usize, EnumerationError> {
    check_bound(max_charge)?;
    let table = GroupTable::new(config);
    Ok(table
        .odometer()
        .filter(|selection| table.charge(selection).abs() <= max_charge)
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn small_config() -> ScaffoldConfig {
        ScaffoldConfig::new(
            4,
            Element::CARBON,
            vec![
                SymmetryGroup::new("a", vec![0, 2], 2),
                SymmetryGroup::new("b", vec![3, 1], 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn group_patterns_follow_canonical_order() {
        let group = SymmetryGroup::new("g", vec![0, 1, 2], 2);
        let patterns: Vec<(Vec<i8>, i32)> = group_patterns(&group)
            .into_iter()
            .map(|p| (p.levels, p.charge))
            .collect();
        assert_eq!(
            patterns,
            vec![
                (vec![0, 0, 0], 0),
                (vec![1, 0, 0], 1),
                (vec![-1, 0, 0], -1),
                (vec![1, 1, 0], 2),
                (vec![-1, 1, 0], 0),
                (vec![-1, -1, 0], -2),
            ]
        );
    }

    #[test]
    fn porphyrin_groups_have_fifteen_patterns_each() {
        for group in ScaffoldConfig::porphyrin().groups() {
            let patterns = group_patterns(group);
            assert_eq!(patterns.len(), 15);
            for p in &patterns {
                let sum: i32 = p.levels.iter().map(|&l| l as i32).sum();
                assert_eq!(sum, p.charge);
                assert_eq!(p.charge, (p.substituted - p.negative) as i32 - p.negative as i32);
            }
        }
    }

    #[test]
    fn odometer_turns_last_wheel_fastest() {
        let combos: Vec<Vec<usize>> = PatternOdometer::new(vec![2, 3]).collect();
        assert_eq!(
            combos,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
        assert_eq!(PatternOdometer::new(vec![2, 0]).count(), 0);
    }

    #[test]
    fn generate_writes_patterns_into_group_indices() {
        let structures = generate_structures(&small_config(), 0).unwrap();
        let levels: Vec<&[i8]> = structures.iter().map(|s| s.levels()).collect();
        // group a patterns: 00, +0, -0, ++, -+, --; group b: 00, +0, -0 on sites [3, 1]
        assert_eq!(
            levels,
            vec![
                &[0, 0, 0, 0][..],
                &[1, 0, 0, -1][..],
                &[-1, 0, 0, 1][..],
                &[-1, 0, 1, 0][..],
            ]
        );
    }

    #[test]
    fn every_generated_vector_respects_the_charge_bound() {
        let config = ScaffoldConfig::porphyrin();
        for max_charge in [0, 1, 3] {
            let structures = generate_structures(&config, max_charge).unwrap();
            assert!(!structures.is_empty());
            assert!(
                structures
                    .iter()
                    .all(|s| s.len() == 20 && s.charge().abs() <= max_charge)
            );
            assert_eq!(structures.len(), count_structures(&config, max_charge).unwrap());
        }
    }

    #[test]
    fn every_entry_is_a_unit_level() {
        let structures = generate_structures(&ScaffoldConfig::porphyrin(), 2).unwrap();
        assert!(
            structures
                .iter()
                .flat_map(|s| s.levels())
                .all(|level| (-1..=1).contains(level))
        );
    }

    #[test]
    fn neutral_bound_keeps_the_reference_vector() {
        let structures = generate_structures(&ScaffoldConfig::porphyrin(), 0).unwrap();
        assert_eq!(structures.len(), 61583);
        assert!(structures.iter().all(|s| s.charge() == 0));
        assert!(structures.contains(&SubstitutionVector::zeros(20)));
    }

    #[test]
    fn unbounded_charge_keeps_the_full_cross_product() {
        let config = ScaffoldConfig::porphyrin();
        assert_eq!(count_structures(&config, 20).unwrap(), 15usize.pow(5));
    }

    #[test]
    fn reference_vector_comes_first() {
        let structures = generate_structures(&ScaffoldConfig::porphyrin(), 2).unwrap();
        assert_eq!(structures[0], SubstitutionVector::zeros(20));
        assert_eq!(structures[1].levels()[4], 1);
    }

    #[test]
    fn generation_is_deterministic() {
        let config = ScaffoldConfig::porphyrin();
        assert_eq!(
            generate_structures(&config, 1).unwrap(),
            generate_structures(&config, 1).unwrap()
        );
    }

    #[test]
    fn negative_bound_is_rejected() {
        assert_eq!(
            generate_structures(&ScaffoldConfig::porphyrin(), -1),
            Err(EnumerationError::NegativeChargeBound(-1))
        );
        assert!(count_structures(&ScaffoldConfig::porphyrin(), -3).is_err());
    }
}
