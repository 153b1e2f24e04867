use super::aggregate::CriterionScores;
use super::config::{CriterionConfig, Criticality, CriticalityParams, ScoringConfig};
use super::trace::EvaluationContext;

/// Adjusted criterion scores may overshoot 10 slightly; categories re-clamp.
pub const ADJUSTED_SCORE_CEILING: f64 = 10.5;

/// Criticality adjustment selected for one averaged criterion score.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    None,
    /// Important criterion below `imp_low`
    Penalty(f64),
    /// Important criterion above `imp_high`
    Bonus(f64),
    /// Critical criterion below `crit_low`; marks the category as flawed
    SevereReduction(f64),
}

impl Adjustment {
    /// Pick the adjustment for a criterion's averaged score.
    ///
    /// Important criteria check `imp_low` before `imp_high`, so at most one
    /// of penalty/bonus applies. Deal-breaker criteria were handled by the
    /// deal-breaker scan and are left alone here.
    pub fn for_criterion(criterion: &CriterionConfig, score: f64, params: &CriticalityParams) -> Self {
        let thresholds = &criterion.thresholds;
        match criterion.crit_level {
            Criticality::Important => {
                if let Some(low) = thresholds.imp_low.filter(|low| score < *low) {
                    Adjustment::Penalty(params.imp_low_penalty_factor * (low - score))
                } else if let Some(high) = thresholds.imp_high.filter(|high| score > *high) {
                    Adjustment::Bonus(params.imp_high_bonus_factor * (score - high))
                } else {
                    Adjustment::None
                }
            }
            Criticality::Critical => match thresholds.crit_low {
                Some(low) if score < low => {
                    Adjustment::SevereReduction(params.crit_severe_reduction_factor)
                }
                _ => Adjustment::None,
            },
            Criticality::Normal | Criticality::DealBreaker => Adjustment::None,
        }
    }

    /// Apply to a score. The result is not clamped.
    pub fn apply(&self, score: f64) -> f64 {
        match self {
            Adjustment::None => score,
            Adjustment::Penalty(p) => score - p,
            Adjustment::Bonus(b) => score + b,
            Adjustment::SevereReduction(factor) => score * factor,
        }
    }

    pub fn is_major_flaw(&self) -> bool {
        matches!(self, Adjustment::SevereReduction(_))
    }

    fn describe(&self, adjusted: f64) -> Option<String> {
        match self {
            Adjustment::None => None,
            Adjustment::Penalty(p) => Some(format!("important-low penalty={:.2}", p)),
            Adjustment::Bonus(b) => Some(format!("important-high bonus={:.2}", b)),
            Adjustment::SevereReduction(_) => {
                Some(format!("critical-low reduction to {:.2}", adjusted))
            }
        }
    }
}

/// Apply criticality adjustments to every averaged criterion score.
///
/// Critical breaches flag their category in `ctx`. Results are clamped to
/// `[0, ADJUSTED_SCORE_CEILING]`.
pub fn adjust_criteria(
    averages: &CriterionScores,
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> CriterionScores {
    let params = &config.criticality_adjustment_params;
    let mut adjusted_scores = CriterionScores::new();

    ctx.section("Effective criterion scores (from rater averages)");

    for (cat_id, category) in &config.categories {
        let adjusted_category = adjusted_scores.entry(cat_id.clone()).or_default();
        for (crit_id, criterion) in &category.criteria {
            let average = averages
                .get(cat_id)
                .and_then(|c| c.get(crit_id))
                .copied()
                .unwrap_or(0.0);

            let adjustment = Adjustment::for_criterion(criterion, average, params);
            let adjusted = adjustment
                .apply(average)
                .clamp(0.0, ADJUSTED_SCORE_CEILING);

            if adjustment.is_major_flaw() {
                ctx.flag_flaw(cat_id, &category.name);
            }

            let mut line = format!(
                "  {}-{} ({}): average={:.2}, level={}",
                cat_id, crit_id, criterion.name, average, criterion.crit_level
            );
            if let Some(description) = adjustment.describe(adjusted) {
                line.push_str(", ");
                line.push_str(&description);
            }
            line.push_str(&format!(" => effective={:.2}", adjusted));
            ctx.record(line);

            adjusted_category.insert(crit_id.clone(), adjusted);
        }
    }

    adjusted_scores
}
