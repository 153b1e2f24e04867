use super::answers::RaterSubmission;
use super::config::ScoringConfig;
use super::normalize::base_score;
use super::trace::EvaluationContext;
use std::collections::BTreeMap;

/// Scores keyed by category id, then criterion id.
pub type CriterionScores = BTreeMap<String, BTreeMap<String, f64>>;

/// Per-criterion averages across all raters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaterAverages {
    pub scores: CriterionScores,
    /// Answers that contributed to any average
    pub valid_answers: usize,
}

impl RaterAverages {
    /// True when there is nothing to grade: no raters, or no rater answered anything.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() || self.valid_answers == 0
    }
}

/// Average normalized scores per criterion over the raters who answered it.
///
/// Missing answers are excluded from both sum and count; a criterion nobody
/// answered averages to 0. Zero raters yields an empty result.
pub fn average_raters(
    submissions: &[RaterSubmission],
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> RaterAverages {
    if submissions.is_empty() {
        return RaterAverages::default();
    }

    let mut scores = CriterionScores::new();
    let mut valid_answers = 0;

    for (cat_id, category) in &config.categories {
        let averages = scores.entry(cat_id.clone()).or_default();
        for (crit_id, criterion) in &category.criteria {
            let mut sum = 0.0;
            let mut count = 0usize;
            for submission in submissions {
                if let Some(answer) = submission.answer(cat_id, crit_id) {
                    sum += base_score(criterion, answer, &config.fallback_labels, ctx);
                    count += 1;
                }
            }
            valid_answers += count;
            let average = if count > 0 { sum / count as f64 } else { 0.0 };
            averages.insert(crit_id.clone(), average);
        }
    }

    tracing::debug!(
        raters = submissions.len(),
        valid_answers,
        "aggregated rater scores"
    );

    RaterAverages {
        scores,
        valid_answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn average(submissions: &[RaterSubmission]) -> RaterAverages {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        average_raters(submissions, &config, &mut ctx)
    }

    #[test]
    fn test_averages_across_raters() {
        let result = average(&[
            RaterSubmission::new().with("C1", "M11", 6.0),
            RaterSubmission::new().with("C1", "M11", 8.0),
        ]);
        assert_eq!(result.scores["C1"]["M11"], 7.0);
        assert_eq!(result.valid_answers, 2);
    }

    #[test]
    fn test_missing_answers_are_not_zero() {
        let result = average(&[
            RaterSubmission::new().with("C1", "M11", 9.0),
            RaterSubmission::new(),
        ]);
        assert_eq!(result.scores["C1"]["M11"], 9.0);
    }

    #[test]
    fn test_unanswered_criterion_averages_zero() {
        let result = average(&[RaterSubmission::new().with("C1", "M11", 9.0)]);
        assert_eq!(result.scores["C3"]["M31"], 0.0);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_labels_are_normalized_before_averaging() {
        let result = average(&[
            RaterSubmission::new().with("C4", "M41", "vivid"),
            RaterSubmission::new().with("C4", "M41", "dull"),
        ]);
        assert_eq!(result.scores["C4"]["M41"], 7.0);
    }

    #[test]
    fn test_zero_raters_is_empty() {
        let result = average(&[]);
        assert!(result.scores.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_raters_without_answers_is_empty() {
        let result = average(&[RaterSubmission::new(), RaterSubmission::new()]);
        assert!(!result.scores.is_empty());
        assert!(result.is_empty());
    }
}
