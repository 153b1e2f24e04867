use super::aggregate::average_raters;
use super::answers::RaterSubmission;
use super::category::{core_score, score_categories, CategoryScores};
use super::config::ScoringConfig;
use super::deal_breaker::scan_deal_breakers;
use super::factors::adjust_criteria;
use super::interaction::apply_interactions;
use super::tiers::assign_tier;
use super::trace::{EvaluationContext, FlawedCategory};
use serde::{Deserialize, Serialize};

/// Final verdict of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub deal_breaker_triggered: bool,
    pub deal_breaker_details: String,
    /// Category id -> score (0-10)
    pub category_scores: CategoryScores,
    pub tas_core: f64,
    pub tas_intermediate: f64,
    pub final_score_10: f64,
    pub final_score_100: f64,
    pub final_tier: String,
    pub flaw_categories: Vec<FlawedCategory>,
    /// Ordered human-readable computation trace
    pub log: Vec<String>,
}

impl EvaluationResult {
    fn empty(tier: String) -> Self {
        Self {
            deal_breaker_triggered: false,
            deal_breaker_details: String::new(),
            category_scores: CategoryScores::new(),
            tas_core: 0.0,
            tas_intermediate: 0.0,
            final_score_10: 0.0,
            final_score_100: 0.0,
            final_tier: tier,
            flaw_categories: Vec::new(),
            log: Vec::new(),
        }
    }

    /// True when no score could be computed for lack of data.
    pub fn is_ungraded(&self, config: &ScoringConfig) -> bool {
        !self.deal_breaker_triggered
            && self.category_scores.is_empty()
            && self.final_tier == config.ungraded_tier
    }
}

/// Evaluate a set of rater submissions against a scoring configuration.
///
/// Pure: the same inputs always produce the same result, and nothing is kept
/// between calls. Malformed answers degrade to 0 with a trace warning; a
/// deal-breaker breach or the total absence of data change the shape of the
/// result instead of failing.
pub fn evaluate(config: &ScoringConfig, submissions: &[RaterSubmission]) -> EvaluationResult {
    let mut ctx = EvaluationContext::new(format!(
        "Evaluation log ({} rater(s)):",
        submissions.len()
    ));

    let deal_breaker = scan_deal_breakers(submissions, config, &mut ctx);
    if deal_breaker.triggered {
        let details = deal_breaker.details_text();
        let assignment = assign_tier(0.0, true, config, &mut ctx);
        ctx.record(format!("Final score (0-100): {:.2}", assignment.score_100));
        ctx.record(format!("Deal-breaker details: {}", details));
        tracing::debug!(tier = %assignment.tier, "evaluation short-circuited by deal-breaker");

        let (log, flaw_categories) = ctx.into_parts();
        return EvaluationResult {
            deal_breaker_triggered: true,
            deal_breaker_details: details,
            final_score_10: assignment.score_100 / 10.0,
            final_score_100: assignment.score_100,
            final_tier: assignment.tier,
            flaw_categories,
            log,
            ..EvaluationResult::empty(String::new())
        };
    }

    let averages = average_raters(submissions, config, &mut ctx);
    if averages.is_empty() {
        ctx.warn("no valid rater data to aggregate; evaluation not graded");
        let (log, _) = ctx.into_parts();
        return EvaluationResult {
            log,
            ..EvaluationResult::empty(config.ungraded_tier.clone())
        };
    }

    let adjusted = adjust_criteria(&averages.scores, config, &mut ctx);
    let category_scores = score_categories(&adjusted, config, &mut ctx);
    let tas_core = core_score(&category_scores, config, &mut ctx);
    let interaction = apply_interactions(tas_core, &category_scores, config, &mut ctx);

    let final_score_10 = interaction.tas_intermediate.clamp(0.0, 10.0);
    let final_score_100 = final_score_10 * 10.0;
    ctx.section("Final score");
    ctx.record(format!("Final score (0-10): {:.2}", final_score_10));
    ctx.record(format!("Final score (0-100): {:.2}", final_score_100));

    let assignment = assign_tier(final_score_100, false, config, &mut ctx);
    tracing::debug!(
        score = final_score_100,
        tier = %assignment.tier,
        "evaluation complete"
    );

    let (log, flaw_categories) = ctx.into_parts();
    EvaluationResult {
        deal_breaker_triggered: false,
        deal_breaker_details: String::new(),
        category_scores,
        tas_core,
        tas_intermediate: interaction.tas_intermediate,
        final_score_10,
        final_score_100: assignment.score_100,
        final_tier: assignment.tier,
        flaw_categories,
        log,
    }
}
