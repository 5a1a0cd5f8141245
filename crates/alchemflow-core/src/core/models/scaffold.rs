use super::element::Element;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Number of substitutable ring atoms of the porphyrin scaffold.
pub const PORPHYRIN_SITE_COUNT: usize = 20;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Scaffold must have at least one site")]
    NoSites,
    #[error("Scaffold must define at least one symmetry group")]
    NoGroups,
    #[error("Group '{group}' has no sites")]
    EmptyGroup { group: String },
    #[error("Group '{group}' refers to site {site}, but the scaffold has only {site_count} sites")]
    SiteOutOfRange {
        group: String,
        site: usize,
        site_count: usize,
    },
    #[error("Site {site} is assigned to both '{first}' and '{second}'")]
    OverlappingGroups {
        site: usize,
        first: String,
        second: String,
    },
    #[error("Sites {0:?} are not assigned to any symmetry group")]
    UncoveredSites(Vec<usize>),
    #[error(
        "Group '{group}' allows {max_substitutions} substitutions but only has {group_size} sites"
    )]
    MaxSubstitutionsTooLarge {
        group: String,
        max_substitutions: usize,
        group_size: usize,
    },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// A set of sites that are equivalent under the point-group symmetry of the scaffold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SymmetryGroup {
    pub name: String,
    /// Site indices in canonical order; patterns are written into them front to back.
    pub indices: Vec<usize>,
    /// Maximum number of substituted sites inside the group.
    pub max_substitutions: usize,
}

impl SymmetryGroup {
    pub fn new(name: impl Into<String>, indices: Vec<usize>, max_substitutions: usize) -> Self {
        Self {
            name: name.into(),
            indices,
            max_substitutions,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.indices.len()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawScaffoldConfig {
    site_count: usize,
    #[serde(default = "default_reference_element")]
    reference_element: Element,
    groups: Vec<SymmetryGroup>,
}

fn default_reference_element() -> Element {
    Element::CARBON
}

/// Describes a substitutable scaffold: its sites, the element they carry in the
/// reference structure and their partition into symmetry groups.
///
/// A `ScaffoldConfig` can only be obtained through validation, so its groups
/// always partition `0..site_count` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawScaffoldConfig")]
pub struct ScaffoldConfig {
    site_count: usize,
    reference_element: Element,
    groups: Vec<SymmetryGroup>,
}

impl TryFrom<RawScaffoldConfig> for ScaffoldConfig {
    type Error = ScaffoldError;

    fn try_from(raw: RawScaffoldConfig) -> Result<Self, Self::Error> {
        Self::new(raw.site_count, raw.reference_element, raw.groups)
    }
}

impl ScaffoldConfig {
    pub fn new(
        site_count: usize,
        reference_element: Element,
        groups: Vec<SymmetryGroup>,
    ) -> Result<Self, ScaffoldError> {
        let config = Self {
            site_count,
            reference_element,
            groups,
        };
        config.validate()?;
        Ok(config)
    }

    /// The carbon porphyrin scaffold (D4h) with its five four-site groups.
    ///
    /// Groups are listed in enumeration order: the first group is the outermost
    /// loop of the cross product, the last group varies fastest.
    pub fn porphyrin() -> Self {
        Self {
            site_count: PORPHYRIN_SITE_COUNT,
            reference_element: Element::CARBON,
            groups: vec![
                SymmetryGroup::new("beta-adjacent", vec![0, 5, 10, 15], 4),
                SymmetryGroup::new("alpha", vec![1, 6, 11, 16], 4),
                SymmetryGroup::new("meso", vec![2, 7, 12, 17], 4),
                SymmetryGroup::new("alpha2", vec![3, 8, 13, 18], 4),
                SymmetryGroup::new("beta-opposite", vec![4, 9, 14, 19], 4),
            ],
        }
    }

    pub fn load(path: &Path) -> Result<Self, ScaffoldError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScaffoldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ScaffoldError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.site_count
    }

    #[inline]
    pub fn reference_element(&self) -> Element {
        self.reference_element
    }

    #[inline]
    pub fn groups(&self) -> &[SymmetryGroup] {
        &self.groups
    }

    /// Input column names (`z0`, `z1`, ...) used by training sets and predictions.
    pub fn site_columns(&self) -> Vec<String> {
        (0..self.site_count).map(|i| format!("z{}", i)).collect()
    }

    fn validate(&self) -> Result<(), ScaffoldError> {
        if self.site_count == 0 {
            return Err(ScaffoldError::NoSites);
        }
        if self.groups.is_empty() {
            return Err(ScaffoldError::NoGroups);
        }

        let mut owner: Vec<Option<&str>> = vec![None; self.site_count];
        for group in &self.groups {
            if group.indices.is_empty() {
                return Err(ScaffoldError::EmptyGroup {
                    group: group.name.clone(),
                });
            }
            if group.max_substitutions > group.size() {
                return Err(ScaffoldError::MaxSubstitutionsTooLarge {
                    group: group.name.clone(),
                    max_substitutions: group.max_substitutions,
                    group_size: group.size(),
                });
            }
            for &site in &group.indices {
                let slot = owner
                    .get_mut(site)
                    .ok_or_else(|| ScaffoldError::SiteOutOfRange {
                        group: group.name.clone(),
                        site,
                        site_count: self.site_count,
                    })?;
                if let Some(first) = slot {
                    return Err(ScaffoldError::OverlappingGroups {
                        site,
                        first: first.to_string(),
                        second: group.name.clone(),
                    });
                }
                *slot = Some(&group.name);
            }
        }

        let uncovered: Vec<usize> = owner
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect();
        if !uncovered.is_empty() {
            return Err(ScaffoldError::UncoveredSites(uncovered));
        }
        Ok(())
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self::porphyrin()
    }
}
