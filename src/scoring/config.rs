use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Main scoring configuration.
///
/// Describes the whole evaluation model: weighted categories of weighted
/// criteria, the criticality adjustment parameters, the cross-category
/// interaction module (AIMM) and the quality tiers.
///
/// Example YAML (abridged):
/// ```yaml
/// categories:
///   C1:
///     name: Likeness & appeal
///     weight: 0.2
///     criteria:
///       M11: { name: Feature fidelity, weight: 1.0, crit_level: 1, type: numeric, thresholds: { imp_low: 5 } }
/// criticality_adjustment_params:
///   imp_low_penalty_factor: 0.5
///   imp_high_bonus_factor: 0.25
///   crit_severe_reduction_factor: 0.6
///   crit_low_cap_value: 6.0
/// aimm_config:
///   harmony_factor_exponent: 0.75
///   harmony_factor_base_score: 7.5
///   consistency_penalty_factor: 0.2
///   synergy_bonus: 1.05
///   conflict_penalty: 0.5
/// quality_tiers:
///   - { label: "A (excellent)", range: [80, 101] }
///   - { label: "F (flawed)", range: [0, 80] }
/// deal_breaker_score: 15
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Category id -> category. Weights are fractions of the overall score.
    /// Iterated in ascending id order (`C10` before `C2`), not file order.
    pub categories: BTreeMap<String, CategoryConfig>,

    pub criticality_adjustment_params: CriticalityParams,

    pub aimm_config: AimmConfig,

    /// Tiers in evaluation order; the first range containing the score wins.
    pub quality_tiers: Vec<QualityTier>,

    /// Tier label reserved for deal-breaker outcomes
    #[serde(default = "default_unacceptable_tier")]
    pub unacceptable_tier: String,

    /// Tier label used when there is nothing to grade
    #[serde(default = "default_ungraded_tier")]
    pub ungraded_tier: String,

    /// Tier label for a computed score that falls in no configured range
    #[serde(default = "default_unrated_tier")]
    pub unrated_tier: String,

    /// Generic label mapping consulted when a label criterion's own map misses
    #[serde(default = "default_fallback_labels")]
    pub fallback_labels: BTreeMap<String, f64>,

    /// Fixed 0-100 score assigned when a deal-breaker fires
    pub deal_breaker_score: f64,
}

impl ScoringConfig {
    /// Look up a category's display name, falling back to its id.
    pub fn category_name<'a>(&'a self, category_id: &'a str) -> &'a str {
        self.categories
            .get(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(category_id)
    }

    /// Tiers eligible for a regular (non deal-breaker) verdict, in configured order.
    pub fn acceptable_tiers(&self) -> impl Iterator<Item = &QualityTier> {
        self.quality_tiers
            .iter()
            .filter(move |t| t.label != self.unacceptable_tier)
    }
}

/// One evaluation category (e.g. "Shape & proportion").
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    pub weight: f64,
    /// Criterion id -> criterion. Weights are fractions within the category.
    pub criteria: BTreeMap<String, CriterionConfig>,
}

/// One scored criterion inside a category.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CriterionConfig {
    pub name: String,
    pub weight: f64,
    pub crit_level: Criticality,

    /// How rater answers are read: a number, or a label from `labels`
    #[serde(rename = "type")]
    pub kind: InputKind,

    #[serde(default, skip_serializing_if = "Thresholds::is_empty")]
    pub thresholds: Thresholds,

    /// Label -> score mapping for label criteria
    #[serde(
        default,
        alias = "linguistic_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, f64>,

    /// Display order of the label choices (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rating_labels: Vec<String>,
}

/// Per-criterion severity tag selecting the adjustment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Criticality {
    Normal,
    Important,
    Critical,
    DealBreaker,
}

impl TryFrom<u8> for Criticality {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Criticality::Normal),
            1 => Ok(Criticality::Important),
            2 => Ok(Criticality::Critical),
            3 => Ok(Criticality::DealBreaker),
            other => Err(format!("criticality level must be 0-3, got {}", other)),
        }
    }
}

impl From<Criticality> for u8 {
    fn from(level: Criticality) -> Self {
        match level {
            Criticality::Normal => 0,
            Criticality::Important => 1,
            Criticality::Critical => 2,
            Criticality::DealBreaker => 3,
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[serde(alias = "A")]
    Numeric,
    #[serde(alias = "B")]
    Label,
}

/// Optional per-criterion thresholds on the 0-10 scale.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Important criteria: penalize averages below this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imp_low: Option<f64>,
    /// Important criteria: reward averages above this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imp_high: Option<f64>,
    /// Critical criteria: severe reduction and category flaw below this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_low: Option<f64>,
    /// Deal-breaker criteria: any single rater below this fails the evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<f64>,
}

impl Thresholds {
    pub fn is_empty(&self) -> bool {
        self.imp_low.is_none()
            && self.imp_high.is_none()
            && self.crit_low.is_none()
            && self.db.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CriticalityParams {
    pub imp_low_penalty_factor: f64,
    pub imp_high_bonus_factor: f64,
    pub crit_severe_reduction_factor: f64,
    /// Upper bound for a category containing a major flaw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_low_cap_value: Option<f64>,
}

/// Cross-category interaction module parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AimmConfig {
    pub harmony_factor_exponent: f64,
    pub harmony_factor_base_score: f64,
    pub consistency_penalty_factor: f64,
    #[serde(alias = "synergy_bonus_c2_c3")]
    pub synergy_bonus: f64,
    #[serde(alias = "conflict_penalty_c2_c3")]
    pub conflict_penalty: f64,

    /// Category paired with `surface_category` for synergy/conflict
    #[serde(default = "default_shape_category")]
    pub shape_category: String,
    #[serde(default = "default_surface_category")]
    pub surface_category: String,
    /// Category whose score drives the harmony factor
    #[serde(default = "default_harmony_category")]
    pub harmony_category: String,
}

/// Quality tier with a half-open `[low, high)` range on the 0-100 scale.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QualityTier {
    pub label: String,
    pub range: [f64; 2],
}

impl QualityTier {
    pub fn new(label: &str, low: f64, high: f64) -> Self {
        Self {
            label: label.to_string(),
            range: [low, high],
        }
    }

    pub fn low(&self) -> f64 {
        self.range[0]
    }

    pub fn high(&self) -> f64 {
        self.range[1]
    }

    pub fn contains(&self, score_100: f64) -> bool {
        score_100 >= self.low() && score_100 < self.high()
    }
}

fn default_unacceptable_tier() -> String {
    "Unacceptable (deal-breaker)".to_string()
}

fn default_ungraded_tier() -> String {
    "Ungraded (no valid data)".to_string()
}

fn default_unrated_tier() -> String {
    "Unrated".to_string()
}

fn default_shape_category() -> String {
    "C2".to_string()
}

fn default_surface_category() -> String {
    "C3".to_string()
}

fn default_harmony_category() -> String {
    "C6".to_string()
}

pub fn default_fallback_labels() -> BTreeMap<String, f64> {
    [
        ("very-poor", 2.0),
        ("poor", 4.0),
        ("average", 6.0),
        ("good", 8.0),
        ("excellent", 10.0),
    ]
    .into_iter()
    .map(|(label, score)| (label.to_string(), score))
    .collect()
}

fn numeric(name: &str, weight: f64, level: Criticality, thresholds: Thresholds) -> CriterionConfig {
    CriterionConfig {
        name: name.to_string(),
        weight,
        crit_level: level,
        kind: InputKind::Numeric,
        thresholds,
        labels: BTreeMap::new(),
        rating_labels: Vec::new(),
    }
}

fn labelled(
    name: &str,
    weight: f64,
    level: Criticality,
    scale: &[(&str, f64)],
    thresholds: Thresholds,
) -> CriterionConfig {
    CriterionConfig {
        name: name.to_string(),
        weight,
        crit_level: level,
        kind: InputKind::Label,
        thresholds,
        labels: scale
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect(),
        rating_labels: scale.iter().map(|(label, _)| label.to_string()).collect(),
    }
}

fn category(name: &str, weight: f64, criteria: Vec<(&str, CriterionConfig)>) -> CategoryConfig {
    CategoryConfig {
        name: name.to_string(),
        weight,
        criteria: criteria
            .into_iter()
            .map(|(id, c)| (id.to_string(), c))
            .collect(),
    }
}

fn imp_low(low: f64) -> Thresholds {
    Thresholds {
        imp_low: Some(low),
        ..Thresholds::default()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        use Criticality::*;
        let none = Thresholds::default;

        let categories = [
            (
                "C1",
                category(
                    "Likeness & appeal",
                    0.20,
                    vec![
                        (
                            "M11",
                            numeric(
                                "Feature fidelity / design distinctiveness",
                                0.4,
                                Important,
                                Thresholds {
                                    imp_low: Some(5.0),
                                    imp_high: Some(9.0),
                                    ..Thresholds::default()
                                },
                            ),
                        ),
                        (
                            "M12",
                            labelled(
                                "Overall feel / character",
                                0.3,
                                Important,
                                &[
                                    ("awful", 1.0),
                                    ("weak", 3.0),
                                    ("so-so", 6.0),
                                    ("nice", 9.0),
                                    ("superb", 10.0),
                                ],
                                imp_low(4.0),
                            ),
                        ),
                        ("M13", numeric("Style coherence", 0.3, Normal, none())),
                    ],
                ),
            ),
            (
                "C2",
                category(
                    "Shape & proportion",
                    0.25,
                    vec![
                        (
                            "M21",
                            numeric(
                                "Left-right symmetry",
                                0.3,
                                Critical,
                                Thresholds {
                                    crit_low: Some(4.5),
                                    ..Thresholds::default()
                                },
                            ),
                        ),
                        ("M22", numeric("Facial line flow", 0.25, Important, imp_low(5.5))),
                        ("M23", numeric("Feature depth & transitions", 0.20, Normal, none())),
                        ("M24", numeric("Feature size & placement", 0.15, Important, imp_low(5.0))),
                        (
                            "M25",
                            numeric(
                                "Structural defects",
                                0.1,
                                DealBreaker,
                                Thresholds {
                                    db: Some(3.0),
                                    ..Thresholds::default()
                                },
                            ),
                        ),
                    ],
                ),
            ),
            (
                "C3",
                category(
                    "Surface & color",
                    0.25,
                    vec![
                        (
                            "M31",
                            numeric(
                                "Surface smoothness",
                                0.3,
                                Critical,
                                Thresholds {
                                    crit_low: Some(5.0),
                                    ..Thresholds::default()
                                },
                            ),
                        ),
                        ("M32", numeric("Base color evenness & texture", 0.3, Important, imp_low(6.0))),
                        ("M33", numeric("Detail color accuracy", 0.2, Normal, none())),
                        ("M34", numeric("Color edge crispness", 0.2, Important, imp_low(5.5))),
                    ],
                ),
            ),
            (
                "C4",
                category(
                    "Eyes",
                    0.15,
                    vec![
                        (
                            "M41",
                            labelled(
                                "Eye liveliness",
                                0.4,
                                Important,
                                &[
                                    ("lifeless", 2.0),
                                    ("dull", 4.0),
                                    ("average", 6.0),
                                    ("bright", 8.0),
                                    ("vivid", 10.0),
                                ],
                                imp_low(4.0),
                            ),
                        ),
                        ("M42", numeric("Eye shape & socket finish", 0.3, Normal, none())),
                        (
                            "M43",
                            numeric(
                                "Iris detail & clarity",
                                0.3,
                                Important,
                                Thresholds {
                                    imp_high: Some(8.5),
                                    ..Thresholds::default()
                                },
                            ),
                        ),
                    ],
                ),
            ),
            (
                "C5",
                category(
                    "Hair & accessories",
                    0.10,
                    vec![
                        ("M51", numeric("Hairstyle", 0.4, Normal, none())),
                        ("M52", numeric("Hair texture & sheen", 0.3, Normal, none())),
                        ("M53", numeric("Hairline & fixing", 0.3, Important, imp_low(5.0))),
                    ],
                ),
            ),
            (
                "C6",
                category(
                    "Overall effect & craftsmanship",
                    0.05,
                    vec![
                        ("M61", numeric("Stylistic unity", 0.5, Normal, none())),
                        ("M62", numeric("Workmanship & blemishes", 0.5, Important, imp_low(6.0))),
                    ],
                ),
            ),
        ]
        .into_iter()
        .map(|(id, c)| (id.to_string(), c))
        .collect();

        Self {
            categories,
            criticality_adjustment_params: CriticalityParams {
                imp_low_penalty_factor: 0.5,
                imp_high_bonus_factor: 0.25,
                crit_severe_reduction_factor: 0.6,
                crit_low_cap_value: Some(6.0),
            },
            aimm_config: AimmConfig {
                harmony_factor_exponent: 0.75,
                harmony_factor_base_score: 7.5,
                consistency_penalty_factor: 0.2,
                synergy_bonus: 1.05,
                conflict_penalty: 0.5,
                shape_category: default_shape_category(),
                surface_category: default_surface_category(),
                harmony_category: default_harmony_category(),
            },
            quality_tiers: vec![
                QualityTier::new("S+ (masterwork)", 95.0, 101.0),
                QualityTier::new("S (master)", 90.0, 95.0),
                QualityTier::new("A (excellent)", 80.0, 90.0),
                QualityTier::new("B (good)", 70.0, 80.0),
                QualityTier::new("C (fair)", 60.0, 70.0),
                QualityTier::new("D (weak)", 50.0, 60.0),
                QualityTier::new("F (flawed)", 0.0, 50.0),
            ],
            unacceptable_tier: default_unacceptable_tier(),
            ungraded_tier: default_ungraded_tier(),
            unrated_tier: default_unrated_tier(),
            fallback_labels: default_fallback_labels(),
            deal_breaker_score: 15.0,
        }
    }
}
