use super::answers::AnswerValue;
use super::config::{CriterionConfig, InputKind};
use super::trace::EvaluationContext;
use std::collections::BTreeMap;

/// Map one rater's answer for one criterion to a numeric base score.
///
/// Never fails: unparseable numbers and unknown labels score 0 with a warning
/// in the trace.
pub fn base_score(
    criterion: &CriterionConfig,
    answer: &AnswerValue,
    fallback_labels: &BTreeMap<String, f64>,
    ctx: &mut EvaluationContext,
) -> f64 {
    if let AnswerValue::Other(value) = answer {
        ctx.warn(format!(
            "criterion '{}' got unsupported answer {}; scoring 0",
            criterion.name, value
        ));
        return 0.0;
    }

    match criterion.kind {
        InputKind::Numeric => match answer {
            AnswerValue::Number(n) if n.is_finite() => *n,
            AnswerValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => {
                    ctx.warn(format!(
                        "numeric criterion '{}' got '{}', which is not a number; scoring 0",
                        criterion.name, s
                    ));
                    0.0
                }
            },
            AnswerValue::Number(n) => {
                ctx.warn(format!(
                    "numeric criterion '{}' got non-finite value {}; scoring 0",
                    criterion.name, n
                ));
                0.0
            }
            AnswerValue::Other(_) => 0.0,
        },
        InputKind::Label => {
            let label = answer.to_string();
            let label = label.trim();
            if let Some(score) = criterion.labels.get(label) {
                *score
            } else if let Some(score) = fallback_labels.get(label) {
                ctx.record(format!(
                    "  note: label criterion '{}' used generic rating '{}' -> {}",
                    criterion.name, label, score
                ));
                *score
            } else {
                ctx.warn(format!(
                    "label criterion '{}' got '{}', which maps to no score; scoring 0",
                    criterion.name, label
                ));
                0.0
            }
        }
    }
}
