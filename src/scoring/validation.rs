use super::config::{Criticality, InputKind, ScoringConfig};

/// Allowed drift when checking that weights sum to 1.
const WEIGHT_TOLERANCE: f64 = 0.01;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// The engine itself never rejects a configuration; these checks catch the
/// assumptions it silently relies on (weights summing to 1, tiers covering
/// 0-100 without gaps, interaction categories that exist).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.categories.is_empty() {
        errors.push("scoring.categories: at least one category is required".to_string());
    }

    // Category and criterion weights
    let mut category_total = 0.0;
    for (cat_id, category) in &config.categories {
        if !category.weight.is_finite() || category.weight <= 0.0 {
            errors.push(format!(
                "scoring.categories.{}.weight: must be a positive number, got {}",
                cat_id, category.weight
            ));
        }
        category_total += category.weight;

        if category.criteria.is_empty() {
            errors.push(format!(
                "scoring.categories.{}.criteria: at least one criterion is required",
                cat_id
            ));
            continue;
        }

        let mut criterion_total = 0.0;
        for (crit_id, criterion) in &category.criteria {
            let path = format!("scoring.categories.{}.criteria.{}", cat_id, crit_id);
            if !criterion.weight.is_finite() || criterion.weight <= 0.0 {
                errors.push(format!(
                    "{}.weight: must be a positive number, got {}",
                    path, criterion.weight
                ));
            }
            criterion_total += criterion.weight;

            if criterion.kind == InputKind::Label
                && criterion.labels.is_empty()
                && config.fallback_labels.is_empty()
            {
                errors.push(format!(
                    "{}.labels: label criterion has no label mapping and no fallback labels are configured",
                    path
                ));
            }

            if criterion.crit_level == Criticality::DealBreaker && criterion.thresholds.db.is_none() {
                errors.push(format!(
                    "{}.thresholds.db: deal-breaker criterion needs a db threshold",
                    path
                ));
            }

            let t = &criterion.thresholds;
            if let (Some(low), Some(high)) = (t.imp_low, t.imp_high) {
                if low > high {
                    errors.push(format!(
                        "{}.thresholds: imp_low ({}) is above imp_high ({})",
                        path, low, high
                    ));
                }
            }
        }

        if (criterion_total - 1.0).abs() > WEIGHT_TOLERANCE {
            errors.push(format!(
                "scoring.categories.{}.criteria: weights sum to {:.3}, expected 1",
                cat_id, criterion_total
            ));
        }
    }

    if !config.categories.is_empty() && (category_total - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "scoring.categories: weights sum to {:.3}, expected 1",
            category_total
        ));
    }

    // Adjustment and interaction parameters
    let params = &config.criticality_adjustment_params;
    for (name, value) in [
        ("imp_low_penalty_factor", params.imp_low_penalty_factor),
        ("imp_high_bonus_factor", params.imp_high_bonus_factor),
        ("crit_severe_reduction_factor", params.crit_severe_reduction_factor),
    ] {
        if !value.is_finite() {
            errors.push(format!(
                "scoring.criticality_adjustment_params.{}: must be finite",
                name
            ));
        }
    }

    let aimm = &config.aimm_config;
    for (name, value) in [
        ("harmony_factor_exponent", aimm.harmony_factor_exponent),
        ("harmony_factor_base_score", aimm.harmony_factor_base_score),
        ("consistency_penalty_factor", aimm.consistency_penalty_factor),
        ("synergy_bonus", aimm.synergy_bonus),
        ("conflict_penalty", aimm.conflict_penalty),
    ] {
        if !value.is_finite() {
            errors.push(format!("scoring.aimm_config.{}: must be finite", name));
        }
    }
    for (name, id) in [
        ("shape_category", &aimm.shape_category),
        ("surface_category", &aimm.surface_category),
        ("harmony_category", &aimm.harmony_category),
    ] {
        if !config.categories.contains_key(id) {
            errors.push(format!(
                "scoring.aimm_config.{}: unknown category '{}'",
                name, id
            ));
        }
    }

    // Tiers must partition [0, 100]
    let mut tiers: Vec<_> = config.acceptable_tiers().collect();
    if tiers.is_empty() {
        errors.push("scoring.quality_tiers: at least one tier is required".to_string());
    }
    for tier in &tiers {
        if tier.low() >= tier.high() {
            errors.push(format!(
                "scoring.quality_tiers '{}': range [{}, {}) is empty",
                tier.label,
                tier.low(),
                tier.high()
            ));
        }
    }
    tiers.sort_by(|a, b| a.low().total_cmp(&b.low()));
    if let (Some(lowest), Some(highest)) = (tiers.first(), tiers.last()) {
        if lowest.low() > 0.0 {
            errors.push(format!(
                "scoring.quality_tiers: scores below {} match no tier",
                lowest.low()
            ));
        }
        if highest.high() <= 100.0 {
            errors.push(format!(
                "scoring.quality_tiers: a score of 100 matches no tier (highest range ends at {})",
                highest.high()
            ));
        }
    }
    for pair in tiers.windows(2) {
        let (below, above) = (pair[0], pair[1]);
        if below.high() < above.low() {
            errors.push(format!(
                "scoring.quality_tiers: gap between '{}' and '{}' ({} to {})",
                below.label,
                above.label,
                below.high(),
                above.low()
            ));
        } else if below.high() > above.low() {
            errors.push(format!(
                "scoring.quality_tiers: '{}' overlaps '{}'",
                below.label, above.label
            ));
        }
    }

    if !config.deal_breaker_score.is_finite()
        || !(0.0..=100.0).contains(&config.deal_breaker_score)
    {
        errors.push(format!(
            "scoring.deal_breaker_score: must be within 0-100, got {}",
            config.deal_breaker_score
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
