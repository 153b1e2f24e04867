use super::answers::RaterSubmission;
use super::config::{Criticality, ScoringConfig};
use super::normalize::base_score;
use super::trace::EvaluationContext;

/// Outcome of the deal-breaker scan over all raters.
#[derive(Debug, Clone, PartialEq)]
pub struct DealBreakerCheck {
    pub triggered: bool,
    /// Reserved unacceptable tier when triggered
    pub tier: Option<String>,
    /// One message per distinct breach
    pub details: Vec<String>,
}

impl DealBreakerCheck {
    pub fn details_text(&self) -> String {
        self.details.join("\n")
    }
}

/// Scan every rater's answers to deal-breaker criteria.
///
/// A single rater scoring strictly below a criterion's `db` threshold is
/// enough to trigger. Runs before any other stage.
pub fn scan_deal_breakers(
    submissions: &[RaterSubmission],
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> DealBreakerCheck {
    let mut details: Vec<String> = Vec::new();

    for (rater_idx, submission) in submissions.iter().enumerate() {
        let rater = rater_idx + 1;
        for (cat_id, category) in &config.categories {
            for (crit_id, criterion) in &category.criteria {
                if criterion.crit_level != Criticality::DealBreaker {
                    continue;
                }
                let Some(db) = criterion.thresholds.db else {
                    continue;
                };
                let Some(answer) = submission.answer(cat_id, crit_id) else {
                    ctx.warn(format!(
                        "[deal-breaker check, rater {}] no answer for {}/{} ({})",
                        rater, cat_id, crit_id, criterion.name
                    ));
                    continue;
                };

                let score = base_score(criterion, answer, &config.fallback_labels, ctx);
                if score < db {
                    let detail = format!(
                        "Rater {} scored {} '{}' ({}) at {:.2} (from '{}'), below deal-breaker threshold {}.",
                        rater, cat_id, criterion.name, crit_id, score, answer, db
                    );
                    ctx.record(format!("[deal-breaker triggered] {}", detail));
                    if !details.contains(&detail) {
                        details.push(detail);
                    }
                }
            }
        }
    }

    let triggered = !details.is_empty();
    if triggered {
        tracing::debug!(breaches = details.len(), "deal-breaker triggered");
    }

    DealBreakerCheck {
        triggered,
        tier: triggered.then(|| config.unacceptable_tier.clone()),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(submissions: &[RaterSubmission]) -> DealBreakerCheck {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        scan_deal_breakers(submissions, &config, &mut ctx)
    }

    #[test]
    fn test_below_threshold_triggers() {
        let check = scan(&[RaterSubmission::new().with("C2", "M25", 2.0)]);
        assert!(check.triggered);
        assert_eq!(check.tier.as_deref(), Some("Unacceptable (deal-breaker)"));
        assert_eq!(check.details.len(), 1);
        assert!(check.details_text().contains("Rater 1"));
        assert!(check.details_text().contains("below deal-breaker threshold 3"));
    }

    #[test]
    fn test_equal_to_threshold_does_not_trigger() {
        let check = scan(&[RaterSubmission::new().with("C2", "M25", 3.0)]);
        assert!(!check.triggered);
        assert!(check.tier.is_none());
        assert_eq!(check.details_text(), "");
    }

    #[test]
    fn test_any_single_rater_triggers() {
        let check = scan(&[
            RaterSubmission::new().with("C2", "M25", 9.0),
            RaterSubmission::new().with("C2", "M25", 1.0),
        ]);
        assert!(check.triggered);
        assert!(check.details[0].starts_with("Rater 2"));
    }

    #[test]
    fn test_each_breaching_rater_reported() {
        let check = scan(&[
            RaterSubmission::new().with("C2", "M25", 1.0),
            RaterSubmission::new().with("C2", "M25", 1.0),
        ]);
        // Messages differ by rater number, so both are kept
        assert_eq!(check.details.len(), 2);
        assert_eq!(check.details_text().lines().count(), 2);
    }

    #[test]
    fn test_missing_answer_is_skipped_with_warning() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        let check = scan_deal_breakers(&[RaterSubmission::new()], &config, &mut ctx);
        assert!(!check.triggered);
        assert!(ctx.log().iter().any(|l| l.starts_with("WARNING:") && l.contains("M25")));
    }

    #[test]
    fn test_unparseable_answer_counts_as_zero() {
        let check = scan(&[RaterSubmission::new().with("C2", "M25", "broken")]);
        assert!(check.triggered);
    }

    #[test]
    fn test_no_raters_never_triggers() {
        let check = scan(&[]);
        assert!(!check.triggered);
    }
}
