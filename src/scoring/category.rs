use super::aggregate::CriterionScores;
use super::config::ScoringConfig;
use super::trace::EvaluationContext;
use std::collections::BTreeMap;

/// Category id -> category score on the 0-10 scale.
pub type CategoryScores = BTreeMap<String, f64>;

/// Weighted mean of each category's effective criterion scores.
///
/// A category flagged with a major flaw is capped at `crit_low_cap_value`
/// (the cap only lowers). Every score is clamped to `[0, 10]`.
pub fn score_categories(
    adjusted: &CriterionScores,
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> CategoryScores {
    let cap = config.criticality_adjustment_params.crit_low_cap_value;
    let mut category_scores = CategoryScores::new();

    ctx.section("Category scores");

    for (cat_id, category) in &config.categories {
        let Some(effective) = adjusted.get(cat_id) else {
            ctx.warn(format!(
                "category {} ({}) has no effective criterion scores",
                cat_id, category.name
            ));
            category_scores.insert(cat_id.clone(), 0.0);
            continue;
        };

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (crit_id, criterion) in &category.criteria {
            let Some(score) = effective.get(crit_id) else {
                ctx.warn(format!(
                    "criterion {}-{} ({}) has no effective score",
                    cat_id, crit_id, criterion.name
                ));
                continue;
            };
            numerator += criterion.weight * score;
            denominator += criterion.weight;
        }

        let mut score = if denominator == 0.0 {
            ctx.warn(format!(
                "category {} ({}): criterion weights sum to 0, scoring 0",
                category.name, cat_id
            ));
            0.0
        } else {
            let mean = numerator / denominator;
            ctx.record(format!(
                "{} ({}): weighted mean={:.2}",
                category.name, cat_id, mean
            ));
            mean
        };

        if ctx.has_flaw(cat_id) {
            if let Some(cap) = cap.filter(|cap| score > *cap) {
                score = cap;
                ctx.record(format!(
                    "  major flaw in {}: score capped at {:.2}",
                    cat_id, cap
                ));
            }
        }

        let score = score.clamp(0.0, 10.0);
        ctx.record(format!(
            "  {} ({}) final score: {:.2}",
            category.name, cat_id, score
        ));
        category_scores.insert(cat_id.clone(), score);
    }

    category_scores
}

/// Weighted sum of category scores (`TAS_core`, 0-10 scale). Not clamped.
pub fn core_score(
    category_scores: &CategoryScores,
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> f64 {
    ctx.section("Core score");

    let mut tas_core = 0.0;
    for (cat_id, category) in &config.categories {
        let score = category_scores.get(cat_id).copied().unwrap_or(0.0);
        let contribution = category.weight * score;
        tas_core += contribution;
        ctx.record(format!(
            "  {} ({}): weight {:.2} * score {:.2} = {:.2}",
            category.name, cat_id, category.weight, score, contribution
        ));
    }

    ctx.record(format!("Core score (TAS_core): {:.2} (0-10 scale)", tas_core));
    tas_core
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(config: &ScoringConfig, value: f64) -> CriterionScores {
        config
            .categories
            .iter()
            .map(|(cat_id, category)| {
                let criteria = category
                    .criteria
                    .keys()
                    .map(|crit_id| (crit_id.clone(), value))
                    .collect();
                (cat_id.clone(), criteria)
            })
            .collect()
    }

    #[test]
    fn test_uniform_scores_give_same_category_score() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        let scores = score_categories(&uniform(&config, 7.0), &config, &mut ctx);
        for score in scores.values() {
            assert!((score - 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_weighted_mean_uses_criterion_weights() {
        let config = ScoringConfig::default();
        let mut adjusted = uniform(&config, 0.0);
        // C6: M61 (0.5) = 10, M62 (0.5) = 4 -> 7
        adjusted.get_mut("C6").unwrap().insert("M61".to_string(), 10.0);
        adjusted.get_mut("C6").unwrap().insert("M62".to_string(), 4.0);

        let mut ctx = EvaluationContext::new("t");
        let scores = score_categories(&adjusted, &config, &mut ctx);
        assert!((scores["C6"] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_ten() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        let scores = score_categories(&uniform(&config, 10.5), &config, &mut ctx);
        for score in scores.values() {
            assert_eq!(*score, 10.0);
        }
    }

    #[test]
    fn test_flawed_category_is_capped() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        ctx.flag_flaw("C2", "Shape & proportion");
        let scores = score_categories(&uniform(&config, 9.0), &config, &mut ctx);
        assert_eq!(scores["C2"], 6.0);
        assert_eq!(scores["C3"], 9.0);
    }

    #[test]
    fn test_cap_never_raises() {
        let config = ScoringConfig::default();
        let mut ctx = EvaluationContext::new("t");
        ctx.flag_flaw("C2", "Shape & proportion");
        let scores = score_categories(&uniform(&config, 4.0), &config, &mut ctx);
        assert!((scores["C2"] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_category_scores_zero_with_warning() {
        let config = ScoringConfig::default();
        let mut adjusted = uniform(&config, 8.0);
        adjusted.remove("C5");
        let mut ctx = EvaluationContext::new("t");
        let scores = score_categories(&adjusted, &config, &mut ctx);
        assert_eq!(scores["C5"], 0.0);
        assert!(ctx.log().iter().any(|l| l.starts_with("WARNING:") && l.contains("C5")));
    }

    #[test]
    fn test_zero_weight_denominator_scores_zero() {
        let mut config = ScoringConfig::default();
        for criterion in config.categories.get_mut("C5").unwrap().criteria.values_mut() {
            criterion.weight = 0.0;
        }
        let mut ctx = EvaluationContext::new("t");
        let scores = score_categories(&uniform(&config, 8.0), &config, &mut ctx);
        assert_eq!(scores["C5"], 0.0);
    }

    #[test]
    fn test_categories_processed_in_id_order() {
        let mut config = ScoringConfig::default();
        let shape = config.categories.remove("C2").unwrap();
        config.categories.insert("C10".to_string(), shape);
        let mut ctx = EvaluationContext::new("t");
        score_categories(&uniform(&config, 7.0), &config, &mut ctx);
        let position = |id: &str| {
            ctx.log()
                .iter()
                .position(|l| l.contains(&format!("({}) final score", id)))
                .unwrap()
        };
        assert!(position("C1") < position("C10"));
        assert!(position("C10") < position("C3"));
    }

    #[test]
    fn test_core_score_is_weighted_sum() {
        let config = ScoringConfig::default();
        let mut scores: CategoryScores = config.categories.keys().map(|k| (k.clone(), 0.0)).collect();
        scores.insert("C2".to_string(), 8.0); // 0.25 * 8 = 2
        scores.insert("C4".to_string(), 6.0); // 0.15 * 6 = 0.9
        let mut ctx = EvaluationContext::new("t");
        let core = core_score(&scores, &config, &mut ctx);
        assert!((core - 2.9).abs() < 1e-9);
    }
}
