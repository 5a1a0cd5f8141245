use super::{ModelError, PropertyModel, PropertyPrediction};
use crate::core::io::dataset::{ENERGY_COLUMN, HOMO_COLUMN, LUMO_COLUMN, TrainingSet};
use nalgebra::DMatrix;
use tracing::debug;

/// Relative cutoff below which singular values are treated as zero.
const SINGULAR_VALUE_CUTOFF: f64 = 1e-10;

/// Parameters of a Taylor expansion fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorSpec {
    /// Maximum total degree of the expansion terms.
    pub order: usize,
    /// Expansion point; `None` expands around the origin.
    pub center: Option<Vec<f64>>,
    /// Training-set columns to fit, in output order.
    pub outputs: Vec<String>,
}

impl Default for TaylorSpec {
    fn default() -> Self {
        Self {
            order: 1,
            center: None,
            outputs: vec![
                ENERGY_COLUMN.to_string(),
                HOMO_COLUMN.to_string(),
                LUMO_COLUMN.to_string(),
            ],
        }
    }
}

/// One expansion term: the product of `(z_i - c_i)^p` over its sparse factors `(i, p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Monomial {
    factors: Vec<(usize, u32)>,
}

impl Monomial {
    #[inline]
    fn evaluate(&self, shifted: &[f64]) -> f64 {
        self.factors
            .iter()
            .map(|&(var, power)| shifted[var].powi(power as i32))
            .product()
    }

    fn degree(&self) -> u32 {
        self.factors.iter().map(|&(_, p)| p).sum()
    }
}

/// All monomials in `dimension` variables with total degree `<= order`, grouped by
/// degree and in lexicographic variable order within a degree.
fn monomials(dimension: usize, order: usize) -> Vec<Monomial> {
    let mut terms = vec![Monomial {
        factors: Vec::new(),
    }];
    let mut previous = vec![Vec::<usize>::new()];
    for _ in 0..order {
        let mut next = Vec::new();
        for vars in &previous {
            let start = vars.last().copied().unwrap_or(0);
            for var in start..dimension {
                let mut extended = vars.clone();
                extended.push(var);
                next.push(extended);
            }
        }
        terms.extend(next.iter().map(|vars| monomial_from_vars(vars)));
        previous = next;
    }
    terms
}

fn monomial_from_vars(vars: &[usize]) -> Monomial {
    let mut factors: Vec<(usize, u32)> = Vec::new();
    for &var in vars {
        match factors.last_mut() {
            Some((last, power)) if *last == var => *power += 1,
            _ => factors.push((var, 1)),
        }
    }
    Monomial { factors }
}

/// Multivariate Taylor expansion fitted by least squares.
///
/// Every selected output is modelled as `sum_t a_t * prod_i (z_i - c_i)^{p_ti}` over
/// all monomials of total degree up to the requested order. The coefficients of all
/// outputs come from one SVD of the shared design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorModel {
    order: usize,
    center: Vec<f64>,
    outputs: Vec<String>,
    terms: Vec<Monomial>,
    /// `terms x outputs`
    coefficients: DMatrix<f64>,
}

impl TaylorModel {
    /// Fits the expansion to `set`, using `inputs` as the expansion variables.
    ///
    /// # Errors
    ///
    /// Fails when the set is empty, a named column is missing, the center has the
    /// wrong dimension, or the design matrix does not have full column rank.
    pub fn fit(
        set: &TrainingSet,
        inputs: &[String],
        spec: &TaylorSpec,
    ) -> Result<Self, ModelError> {
        if set.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if spec.outputs.is_empty() {
            return Err(ModelError::NoOutputs);
        }

        let dimension = inputs.len();
        let center = match &spec.center {
            Some(center) if center.len() != dimension => {
                return Err(ModelError::DimensionMismatch {
                    expected: dimension,
                    found: center.len(),
                });
            }
            Some(center) => center.clone(),
            None => vec![0.0; dimension],
        };

        let input_idx = inputs
            .iter()
            .map(|name| set.column_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        let output_idx = spec
            .outputs
            .iter()
            .map(|name| set.column_index(name))
            .collect::<Result<Vec<_>, _>>()?;

        let terms = monomials(dimension, spec.order);
        let rows = set.len();
        debug!(
            rows,
            terms = terms.len(),
            order = spec.order,
            "Assembling Taylor design matrix"
        );

        let mut design = DMatrix::zeros(rows, terms.len());
        let mut targets = DMatrix::zeros(rows, output_idx.len());
        let mut shifted = vec![0.0; dimension];
        for (r, row) in set.rows().iter().enumerate() {
            for (slot, (&col, &c)) in shifted.iter_mut().zip(input_idx.iter().zip(&center)) {
                *slot = row[col] - c;
            }
            for (t, term) in terms.iter().enumerate() {
                design[(r, t)] = term.evaluate(&shifted);
            }
            for (o, &col) in output_idx.iter().enumerate() {
                targets[(r, o)] = row[col];
            }
        }

        let svd = design.svd(true, true);
        let max_singular = svd.singular_values.max();
        let eps = SINGULAR_VALUE_CUTOFF * max_singular.max(1.0);
        let rank = svd.rank(eps);
        if rank < terms.len() {
            return Err(ModelError::Singular {
                rank,
                terms: terms.len(),
                rows,
            });
        }
        let coefficients = svd.solve(&targets, eps).map_err(ModelError::Solve)?;

        Ok(Self {
            order: spec.order,
            center,
            outputs: spec.outputs.clone(),
            terms,
            coefficients,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Coefficient of the term with the given sparse `(variable, power)` factors.
    pub fn coefficient(&self, factors: &[(usize, u32)], output: &str) -> Option<f64> {
        let o = self.outputs.iter().position(|name| name == output)?;
        let t = self
            .terms
            .iter()
            .position(|term| term.factors.as_slice() == factors)?;
        Some(self.coefficients[(t, o)])
    }

    /// Highest total degree actually present among the terms.
    pub fn max_degree(&self) -> u32 {
        self.terms.iter().map(Monomial::degree).max().unwrap_or(0)
    }
}

impl PropertyModel for TaylorModel {
    fn input_dimension(&self) -> usize {
        self.center.len()
    }

    fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn query(&self, point: &[f64]) -> Result<PropertyPrediction<'_>, ModelError> {
        if point.len() != self.center.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.center.len(),
                found: point.len(),
            });
        }
        let shifted: Vec<f64> = point.iter().zip(&self.center).map(|(z, c)| z - c).collect();
        let basis: Vec<f64> = self.terms.iter().map(|t| t.evaluate(&shifted)).collect();

        let values = (0..self.outputs.len())
            .map(|o| {
                basis
                    .iter()
                    .enumerate()
                    .map(|(t, b)| b * self.coefficients[(t, o)])
                    .sum()
            })
            .collect();
        Ok(PropertyPrediction::new(&self.outputs, values))
    }
}
