use super::category::CategoryScores;
use super::config::ScoringConfig;
use super::trace::EvaluationContext;

/// Shape below this while surface is above `CONFLICT_SURFACE_MIN` is a conflict.
pub const CONFLICT_SHAPE_MAX: f64 = 5.0;
pub const CONFLICT_SURFACE_MIN: f64 = 8.0;
/// Both shape and surface above this earn the synergy bonus.
pub const SYNERGY_MIN: f64 = 8.5;
/// Harmony anchor score used when the anchor category is missing or scored 0.
pub const HARMONY_DEFAULT_ANCHOR: f64 = 5.0;

/// Result of the cross-category interaction module (AIMM).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionOutcome {
    pub global_modifier: f64,
    pub flat_penalty: f64,
    /// `tas_core * global_modifier - flat_penalty`
    pub tas_intermediate: f64,
}

/// Apply synergy/conflict, harmony and consistency modifiers to `tas_core`.
pub fn apply_interactions(
    tas_core: f64,
    category_scores: &CategoryScores,
    config: &ScoringConfig,
    ctx: &mut EvaluationContext,
) -> InteractionOutcome {
    let aimm = &config.aimm_config;
    let mut global_modifier = 1.0;
    let mut flat_penalty = 0.0;

    ctx.section("Interaction modifiers (AIMM)");

    // Conflict / synergy between the shape and surface categories
    let shape_name = config.category_name(&aimm.shape_category);
    let surface_name = config.category_name(&aimm.surface_category);
    let shape = category_scores
        .get(&aimm.shape_category)
        .copied()
        .unwrap_or(0.0);
    let surface = category_scores
        .get(&aimm.surface_category)
        .copied()
        .unwrap_or(0.0);

    if shape < CONFLICT_SHAPE_MAX && surface > CONFLICT_SURFACE_MIN {
        flat_penalty += aimm.conflict_penalty;
        ctx.record(format!(
            "  AIMM: {} low ({:.2}) but {} high ({:.2}), conflict penalty: -{:.2}",
            shape_name, shape, surface_name, surface, aimm.conflict_penalty
        ));
    } else if shape > SYNERGY_MIN && surface > SYNERGY_MIN {
        global_modifier *= aimm.synergy_bonus;
        ctx.record(format!(
            "  AIMM: {} ({:.2}) and {} ({:.2}) both excellent, synergy factor: *{:.2}",
            shape_name, shape, surface_name, surface, aimm.synergy_bonus
        ));
    }

    // Harmony
    let anchor_name = config.category_name(&aimm.harmony_category);
    let anchor = match category_scores.get(&aimm.harmony_category).copied() {
        Some(score) if score > 0.0 => score,
        _ => {
            ctx.record(format!(
                "  AIMM: {} has no usable score, harmony anchor defaults to {:.1}",
                anchor_name, HARMONY_DEFAULT_ANCHOR
            ));
            HARMONY_DEFAULT_ANCHOR
        }
    };
    if aimm.harmony_factor_base_score > 0.0 {
        let harmony = (anchor / aimm.harmony_factor_base_score).powf(aimm.harmony_factor_exponent);
        global_modifier *= harmony;
        ctx.record(format!(
            "  AIMM: {} score {:.2}, harmony factor: *{:.3} (base {}, exponent {})",
            anchor_name,
            anchor,
            harmony,
            aimm.harmony_factor_base_score,
            aimm.harmony_factor_exponent
        ));
    } else {
        ctx.record(format!(
            "  AIMM: harmony base score for {} is not positive, harmony factor skipped",
            anchor_name
        ));
    }

    // Consistency: spread of the weighted category scores
    let weighted: Vec<f64> = config
        .categories
        .iter()
        .map(|(cat_id, category)| {
            category.weight * category_scores.get(cat_id).copied().unwrap_or(0.0)
        })
        .collect();
    if weighted.len() > 1 {
        let std_dev = population_std_dev(&weighted);
        let penalty = aimm.consistency_penalty_factor * std_dev;
        flat_penalty += penalty;
        ctx.record(format!(
            "  AIMM: weighted category score std dev {:.2}, consistency penalty: -{:.2}",
            std_dev, penalty
        ));
    }

    ctx.record(format!(
        "  before AIMM: TAS_core={:.2}, global modifier={:.3}, flat penalty={:.2}",
        tas_core, global_modifier, flat_penalty
    ));

    let tas_intermediate = tas_core * global_modifier - flat_penalty;
    ctx.record(format!(
        "Score after AIMM (TAS_intermediate): {:.2}",
        tas_intermediate
    ));

    InteractionOutcome {
        global_modifier,
        flat_penalty,
        tas_intermediate,
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::CategoryConfig;
    use std::collections::BTreeMap;

    /// Two-category config (C2 shape, C3 surface) with no harmony anchor and
    /// no consistency penalty, so each modifier can be tested alone.
    fn two_category_config() -> ScoringConfig {
        let mut config = ScoringConfig::default();
        config.categories = ["C2", "C3"]
            .into_iter()
            .map(|id| {
                (
                    id.to_string(),
                    CategoryConfig {
                        name: id.to_string(),
                        weight: 0.5,
                        criteria: BTreeMap::new(),
                    },
                )
            })
            .collect();
        config.aimm_config.consistency_penalty_factor = 0.0;
        config.aimm_config.harmony_factor_base_score = 0.0;
        config
    }

    fn scores(pairs: &[(&str, f64)]) -> CategoryScores {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_conflict_penalty() {
        let config = two_category_config();
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(6.0, &scores(&[("C2", 4.0), ("C3", 9.0)]), &config, &mut ctx);
        assert_eq!(outcome.flat_penalty, 0.5);
        assert_eq!(outcome.global_modifier, 1.0);
        assert!((outcome.tas_intermediate - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_synergy_bonus() {
        let config = two_category_config();
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(9.0, &scores(&[("C2", 9.0), ("C3", 9.0)]), &config, &mut ctx);
        assert!((outcome.global_modifier - 1.05).abs() < 1e-9);
        assert!((outcome.tas_intermediate - 9.45).abs() < 1e-9);
    }

    #[test]
    fn test_neither_conflict_nor_synergy() {
        let config = two_category_config();
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(7.0, &scores(&[("C2", 7.0), ("C3", 7.0)]), &config, &mut ctx);
        assert_eq!(outcome.global_modifier, 1.0);
        assert_eq!(outcome.flat_penalty, 0.0);
        assert_eq!(outcome.tas_intermediate, 7.0);
    }

    #[test]
    fn test_harmony_factor_from_anchor() {
        let mut config = two_category_config();
        config.aimm_config.harmony_category = "C3".to_string();
        config.aimm_config.harmony_factor_base_score = 7.5;
        config.aimm_config.harmony_factor_exponent = 1.0;
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(6.0, &scores(&[("C2", 6.0), ("C3", 6.0)]), &config, &mut ctx);
        assert!((outcome.global_modifier - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_harmony_anchor_at_base_is_neutral() {
        let mut config = two_category_config();
        config.aimm_config.harmony_category = "C3".to_string();
        config.aimm_config.harmony_factor_base_score = 7.5;
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(7.5, &scores(&[("C2", 7.5), ("C3", 7.5)]), &config, &mut ctx);
        assert!((outcome.global_modifier - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_anchor_defaults_to_five() {
        let mut config = two_category_config();
        config.aimm_config.harmony_category = "C9".to_string();
        config.aimm_config.harmony_factor_base_score = 5.0;
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(6.0, &scores(&[("C2", 6.0), ("C3", 6.0)]), &config, &mut ctx);
        assert!((outcome.global_modifier - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_anchor_score_defaults_to_five() {
        let mut config = two_category_config();
        config.aimm_config.harmony_category = "C3".to_string();
        config.aimm_config.harmony_factor_base_score = 7.5;
        config.aimm_config.harmony_factor_exponent = 0.75;
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(6.0, &scores(&[("C2", 6.0), ("C3", 0.0)]), &config, &mut ctx);
        let expected = (5.0_f64 / 7.5).powf(0.75);
        assert!((outcome.global_modifier - expected).abs() < 1e-12);
        assert!(outcome.tas_intermediate > 0.0);
        assert!(ctx.log().iter().any(|l| l.contains("harmony anchor defaults to 5.0")));
    }

    #[test]
    fn test_consistency_penalty_uses_weighted_spread() {
        let mut config = two_category_config();
        config.aimm_config.consistency_penalty_factor = 1.0;
        let mut ctx = EvaluationContext::new("t");
        // weighted: 0.5*6 = 3, 0.5*8 = 4 -> std dev 0.5
        let outcome = apply_interactions(7.0, &scores(&[("C2", 6.0), ("C3", 8.0)]), &config, &mut ctx);
        assert!((outcome.flat_penalty - 0.5).abs() < 1e-9);
        assert!((outcome.tas_intermediate - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_skipped_for_single_category() {
        let mut config = two_category_config();
        config.categories.remove("C3");
        config.aimm_config.consistency_penalty_factor = 1.0;
        let mut ctx = EvaluationContext::new("t");
        let outcome = apply_interactions(6.0, &scores(&[("C2", 6.0)]), &config, &mut ctx);
        assert_eq!(outcome.flat_penalty, 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[3.0, 3.0]), 0.0);
    }
}
