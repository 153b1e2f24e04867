use super::config::ScoringConfig;
use super::trace::EvaluationContext;

/// Tiers at the bottom of the ladder that a major flaw cannot push further down.
pub const DOWNGRADE_EXEMPT_TIERS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct TierAssignment {
    pub tier: String,
    pub score_100: f64,
}

/// Map a final 0-100 score to a quality tier.
///
/// A deal-breaker forces the unacceptable tier and the fixed deal-breaker
/// score. Otherwise the first configured tier whose `[low, high)` range holds
/// the score is selected, then moved one step down if any category carries a
/// major flaw, unless it is already one of the lowest acceptable tiers.
pub fn assign_tier(
    score_100: f64,
    deal_breaker_triggered: bool,
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> TierAssignment {
    if deal_breaker_triggered {
        ctx.record(String::new());
        ctx.record(format!("Quality tier: {}", config.unacceptable_tier));
        return TierAssignment {
            tier: config.unacceptable_tier.clone(),
            score_100: config.deal_breaker_score,
        };
    }

    let mut tier = match config.acceptable_tiers().find(|t| t.contains(score_100)) {
        Some(t) => t.label.clone(),
        None => {
            ctx.warn(format!("score {:.2} falls in no configured tier range", score_100));
            ctx.record(String::new());
            ctx.record(format!("Quality tier: {}", config.unrated_tier));
            return TierAssignment {
                tier: config.unrated_tier.clone(),
                score_100,
            };
        }
    };

    if !ctx.flaws().is_empty() {
        tier = downgrade(tier, config, ctx);
    }

    ctx.record(String::new());
    ctx.record(format!("Quality tier: {}", tier));

    TierAssignment { tier, score_100 }
}

/// Acceptable tier labels ordered strictest-last (descending lower bound).
pub fn tier_ladder(config: &ScoringConfig) -> Vec<&str> {
    let mut tiers: Vec<_> = config.acceptable_tiers().collect();
    tiers.sort_by(|a, b| b.low().total_cmp(&a.low()));
    tiers.into_iter().map(|t| t.label.as_str()).collect()
}

fn downgrade(tier: String, config: &ScoringConfig, ctx: &mut EvaluationContext) -> String {
    let ladder = tier_ladder(config);
    let flaws = ctx.flaw_names();

    let Some(idx) = ladder.iter().position(|label| *label == tier) else {
        ctx.warn(format!(
            "cannot locate tier {} in the tier ordering; no downgrade applied",
            tier
        ));
        return tier;
    };

    if idx + DOWNGRADE_EXEMPT_TIERS >= ladder.len() {
        ctx.record(format!(
            "  note: major flaw in {}, but {} is already among the lowest tiers",
            flaws, tier
        ));
        return tier;
    }

    let lowered = ladder[idx + 1].to_string();
    ctx.record(format!(
        "  note: major flaw in {}, tier lowered from {} to {}",
        flaws, tier, lowered
    ));
    lowered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::QualityTier;

    fn assign(score_100: f64, flawed: bool) -> String {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        if flawed {
            ctx.flag_flaw("C2", "Shape & proportion");
        }
        assign_tier(score_100, false, &config, &mut ctx).tier
    }

    #[test]
    fn test_range_boundaries() {
        assert_eq!(assign(100.0, false), "S+ (masterwork)");
        assert_eq!(assign(95.0, false), "S+ (masterwork)");
        assert_eq!(assign(94.99, false), "S (master)");
        assert_eq!(assign(80.0, false), "A (excellent)");
        assert_eq!(assign(50.0, false), "D (weak)");
        assert_eq!(assign(49.99, false), "F (flawed)");
        assert_eq!(assign(0.0, false), "F (flawed)");
    }

    #[test]
    fn test_every_score_gets_exactly_one_tier() {
        let config = ScoringConfig::default();
        for step in 0..=1000 {
            let score = step as f64 / 10.0;
            let matches = config.acceptable_tiers().filter(|t| t.contains(score)).count();
            assert_eq!(matches, 1, "score {} matched {} tiers", score, matches);
        }
    }

    #[test]
    fn test_deal_breaker_overrides() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        let assignment = assign_tier(99.0, true, &config, &mut ctx);
        assert_eq!(assignment.tier, "Unacceptable (deal-breaker)");
        assert_eq!(assignment.score_100, 15.0);
    }

    #[test]
    fn test_flaw_downgrades_one_step() {
        assert_eq!(assign(85.0, true), "B (good)");
        assert_eq!(assign(96.0, true), "S (master)");
        assert_eq!(assign(65.0, true), "D (weak)");
    }

    #[test]
    fn test_lowest_two_tiers_are_exempt() {
        assert_eq!(assign(55.0, true), "D (weak)");
        assert_eq!(assign(20.0, true), "F (flawed)");
    }

    #[test]
    fn test_exemption_follows_ranges_not_labels() {
        let mut config = ScoringConfig::default();
        config.quality_tiers = vec![
            QualityTier::new("gold", 80.0, 101.0),
            QualityTier::new("silver", 60.0, 80.0),
            QualityTier::new("bronze", 40.0, 60.0),
            QualityTier::new("tin", 0.0, 40.0),
        ];
        let mut ctx = EvaluationContext::new("t");
        ctx.flag_flaw("C2", "Shape & proportion");
        assert_eq!(assign_tier(70.0, false, &config, &mut ctx).tier, "bronze");
        assert_eq!(assign_tier(50.0, false, &config, &mut ctx).tier, "bronze");
    }

    #[test]
    fn test_no_matching_range_is_unrated() {
        let mut config = ScoringConfig::default();
        config.quality_tiers.retain(|t| t.low() >= 50.0);
        let mut ctx = EvaluationContext::new("t");
        let assignment = assign_tier(10.0, false, &config, &mut ctx);
        assert_eq!(assignment.tier, "Unrated");
        assert_ne!(assignment.tier, config.ungraded_tier);
        assert_eq!(assignment.score_100, 10.0);
        assert!(ctx
            .log()
            .iter()
            .any(|l| l.starts_with("WARNING:") && l.contains("no configured tier range")));
    }

    #[test]
    fn test_unrated_score_is_not_downgraded() {
        let mut config = ScoringConfig::default();
        config.quality_tiers.retain(|t| t.low() >= 50.0);
        let mut ctx = EvaluationContext::new("t");
        ctx.flag_flaw("C2", "Shape & proportion");
        let assignment = assign_tier(10.0, false, &config, &mut ctx);
        assert_eq!(assignment.tier, config.unrated_tier);
        assert!(!ctx.log().iter().any(|l| l.contains("tier lowered")));
    }

    #[test]
    fn test_ladder_sorted_by_descending_lower_bound() {
        let mut config = ScoringConfig::default();
        config.quality_tiers.reverse();
        let ladder = tier_ladder(&config);
        assert_eq!(ladder.first(), Some(&"S+ (masterwork)"));
        assert_eq!(ladder.last(), Some(&"F (flawed)"));
    }
}
