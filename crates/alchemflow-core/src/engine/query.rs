use crate::core::model::PropertyModel;
use crate::core::models::substitution::SubstitutionVector;
use crate::engine::error::EngineError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Model outputs for one candidate, tagged with its position in the input list.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub index: usize,
    pub values: Vec<f64>,
}

fn score_one<M: PropertyModel>(
    model: &M,
    index: usize,
    candidate: &SubstitutionVector,
) -> Result<CandidateScore, EngineError> {
    let prediction = model
        .query(&candidate.as_point())
        .map_err(|source| EngineError::Query { index, source })?;
    Ok(CandidateScore {
        index,
        values: prediction.values().to_vec(),
    })
}

/// Queries `model` for every candidate.
///
/// With the `parallel` feature the work is spread over the rayon pool; results are
/// always returned in candidate order. `on_scored` runs once per finished candidate
/// and may be called from several threads.
pub fn score_candidates<M, F>(
    model: &M,
    candidates: &[SubstitutionVector],
    on_scored: F,
) -> Result<Vec<CandidateScore>, EngineError>
where
    M: PropertyModel,
    F: Fn() + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let iter = candidates.par_iter().enumerate();
    #[cfg(not(feature = "parallel"))]
    let iter = candidates.iter().enumerate();

    iter.map(|(index, candidate)| {
        let score = score_one(model, index, candidate);
        on_scored();
        score
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ModelError, PropertyPrediction};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ChargeModel {
        outputs: Vec<String>,
    }

    impl PropertyModel for ChargeModel {
        fn input_dimension(&self) -> usize {
            3
        }

        fn outputs(&self) -> &[String] {
            &self.outputs
        }

        fn query(&self, point: &[f64]) -> Result<PropertyPrediction<'_>, ModelError> {
            if point.len() != 3 {
                return Err(ModelError::DimensionMismatch {
                    expected: 3,
                    found: point.len(),
                });
            }
            let sum: f64 = point.iter().sum();
            Ok(PropertyPrediction::new(&self.outputs, vec![sum, 2.0 * sum]))
        }
    }

    fn model() -> ChargeModel {
        ChargeModel {
            outputs: vec!["Energy".to_string(), "HOMO".to_string()],
        }
    }

    #[test]
    fn scores_keep_candidate_order() {
        let candidates: Vec<SubstitutionVector> = (0..200)
            .map(|i| SubstitutionVector::from_levels(vec![(i % 3) as i8 - 1, 0, 1]))
            .collect();
        let calls = AtomicUsize::new(0);

        let scores = score_candidates(&model(), &candidates, || {
            calls.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 200);
        for (i, score) in scores.iter().enumerate() {
            assert_eq!(score.index, i);
            let expected = candidates[i].charge() as f64;
            assert_eq!(score.values, vec![expected, 2.0 * expected]);
        }
    }

    #[test]
    fn query_failure_names_the_candidate() {
        let candidates = vec![
            SubstitutionVector::zeros(3),
            SubstitutionVector::zeros(2),
        ];
        let result = score_candidates(&model(), &candidates, || {});
        assert!(matches!(result, Err(EngineError::Query { index: 1, .. })));
    }

    #[test]
    fn empty_candidate_list_yields_no_scores() {
        let scores = score_candidates(&model(), &[], || {}).unwrap();
        assert!(scores.is_empty());
    }
}
