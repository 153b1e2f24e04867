use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A rater's answer for one criterion: a number or a label.
///
/// Anything else (booleans, lists, nested objects) is kept as `Other` so one
/// malformed answer scores 0 instead of rejecting the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Raw answer as it arrives from the response store.
///
/// Accepts both a bare value (`7.5`, `"good"`) and the wrapped form
/// `{ "score": 7.5 }`. `null` and blank text count as "no answer".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Scored {
        #[serde(default)]
        score: Option<AnswerValue>,
    },
    Bare(Option<AnswerValue>),
}

impl RawAnswer {
    /// The usable answer value, if any.
    pub fn value(&self) -> Option<&AnswerValue> {
        let value = match self {
            RawAnswer::Scored { score } => score.as_ref(),
            RawAnswer::Bare(value) => value.as_ref(),
        }?;
        match value {
            AnswerValue::Text(s) if s.trim().is_empty() => None,
            other => Some(other),
        }
    }
}

impl From<f64> for RawAnswer {
    fn from(n: f64) -> Self {
        RawAnswer::Bare(Some(AnswerValue::Number(n)))
    }
}

impl From<&str> for RawAnswer {
    fn from(s: &str) -> Self {
        RawAnswer::Bare(Some(AnswerValue::Text(s.to_string())))
    }
}

/// One rater's answers: category id -> criterion id -> raw answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaterSubmission {
    categories: BTreeMap<String, BTreeMap<String, RawAnswer>>,
}

impl RaterSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic callers.
    pub fn with(mut self, category: &str, criterion: &str, answer: impl Into<RawAnswer>) -> Self {
        self.insert(category, criterion, answer);
        self
    }

    pub fn insert(&mut self, category: &str, criterion: &str, answer: impl Into<RawAnswer>) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(criterion.to_string(), answer.into());
    }

    /// Usable answer for a criterion; `None` when omitted, null or blank.
    pub fn answer(&self, category: &str, criterion: &str) -> Option<&AnswerValue> {
        self.categories
            .get(category)
            .and_then(|answers| answers.get(criterion))
            .and_then(RawAnswer::value)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|answers| answers.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_and_wrapped_answers() {
        let json = r#"{
            "C1": { "M11": 7.5, "M12": "nice" },
            "C2": { "M21": { "score": 4 }, "M22": { "score": "6.5" } }
        }"#;
        let submission: RaterSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(submission.answer("C1", "M11"), Some(&AnswerValue::Number(7.5)));
        assert_eq!(
            submission.answer("C1", "M12"),
            Some(&AnswerValue::Text("nice".to_string()))
        );
        assert_eq!(submission.answer("C2", "M21"), Some(&AnswerValue::Number(4.0)));
        assert_eq!(
            submission.answer("C2", "M22"),
            Some(&AnswerValue::Text("6.5".to_string()))
        );
    }

    #[test]
    fn test_missing_null_and_blank_are_no_answer() {
        let json = r#"{
            "C1": { "M11": null, "M12": "  ", "M13": { "score": null } },
            "C2": { "M21": {} }
        }"#;
        let submission: RaterSubmission = serde_json::from_str(json).unwrap();

        assert!(submission.answer("C1", "M11").is_none());
        assert!(submission.answer("C1", "M12").is_none());
        assert!(submission.answer("C1", "M13").is_none());
        assert!(submission.answer("C2", "M21").is_none());
        assert!(submission.answer("C9", "M91").is_none());
    }

    #[test]
    fn test_builder_inserts_answers() {
        let submission = RaterSubmission::new()
            .with("C1", "M11", 8.0)
            .with("C1", "M12", "superb");
        assert!(!submission.is_empty());
        assert_eq!(submission.answer("C1", "M11"), Some(&AnswerValue::Number(8.0)));
        assert!(RaterSubmission::new().is_empty());
    }

    #[test]
    fn test_unexpected_answer_shapes_are_kept() {
        let json = r#"{
            "C1": { "M11": true, "M12": { "score": [1] }, "M13": [2, 3] }
        }"#;
        let submission: RaterSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(
            submission.answer("C1", "M11"),
            Some(&AnswerValue::Other(serde_json::Value::Bool(true)))
        );
        assert_eq!(
            submission.answer("C1", "M12"),
            Some(&AnswerValue::Other(serde_json::json!([1])))
        );
        assert_eq!(submission.answer("C1", "M13").map(|a| a.to_string()), Some("[2,3]".to_string()));
    }

    #[test]
    fn test_zero_is_a_real_answer() {
        let submission = RaterSubmission::new().with("C1", "M11", 0.0);
        assert_eq!(submission.answer("C1", "M11"), Some(&AnswerValue::Number(0.0)));
    }
}
