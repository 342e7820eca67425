use serde::{Deserialize, Serialize};

use super::application::{SurveyAnswers, TraitScores};

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Display-only summary of a candidate's trait scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyScore {
    pub total: f64,
    pub average: Option<f64>,
    pub traits: usize,
}

impl SurveyScore {
    pub fn from_traits(scores: &TraitScores) -> Self {
        let total: f64 = scores.values().copied().filter(|s| s.is_finite()).sum();
        let traits = scores.len();
        let average = (traits > 0).then(|| total / traits as f64);
        Self {
            total,
            average,
            traits,
        }
    }
}

fn in_range(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Trait names whose score falls outside the 1–5 scale.
pub fn out_of_range_traits(scores: &TraitScores) -> Vec<String> {
    scores
        .iter()
        .filter(|(_, score)| !in_range(**score))
        .map(|(name, _)| name.clone())
        .collect()
}

/// `category.question` paths whose answer falls outside the 1–5 scale.
pub fn out_of_range_answers(answers: &SurveyAnswers) -> Vec<String> {
    answers
        .iter()
        .flat_map(|(category, questions)| {
            questions
                .iter()
                .filter(|(_, score)| !in_range(**score))
                .map(move |(idx, _)| format!("{}.{}", category, idx))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn score_sums_and_averages() {
        let scores: TraitScores = [
            ("openness".to_string(), 4.0),
            ("conscientiousness".to_string(), 3.0),
            ("extraversion".to_string(), 5.0),
        ]
        .into_iter()
        .collect();
        let score = SurveyScore::from_traits(&scores);
        assert_eq!(score.total, 12.0);
        assert_eq!(score.average, Some(4.0));
        assert_eq!(score.traits, 3);
    }

    #[test]
    fn empty_scores_have_no_average() {
        let score = SurveyScore::from_traits(&TraitScores::new());
        assert_eq!(score.total, 0.0);
        assert_eq!(score.average, None);
    }

    #[test]
    fn flags_scores_off_the_scale() {
        let scores: TraitScores = [
            ("openness".to_string(), 4.2),
            ("agreeableness".to_string(), 7.0),
            ("emotionalStability".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            out_of_range_traits(&scores),
            vec!["agreeableness".to_string(), "emotionalStability".to_string()]
        );

        let mut answers: SurveyAnswers = BTreeMap::new();
        answers.insert(
            "openness".into(),
            [("0".to_string(), 5.0), ("1".to_string(), 0.0)].into_iter().collect(),
        );
        assert_eq!(out_of_range_answers(&answers), vec!["openness.1".to_string()]);
    }
}
