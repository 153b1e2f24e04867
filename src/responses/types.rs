use crate::scoring::RaterSubmission;
use serde::{Deserialize, Serialize};

/// One collected response: who rated (optional, informational) and their answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default, alias = "testerName", skip_serializing_if = "Option::is_none")]
    pub rater: Option<String>,
    pub answers: RaterSubmission,
}

/// Accepted layouts of a responses file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseFile {
    /// `{ "responses": [ ... ] }`
    Wrapped { responses: Vec<ResponseEntry> },
    /// `[ ... ]`
    List(Vec<ResponseEntry>),
}

/// A list entry: either a full record or a bare answers map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseEntry {
    Record(ResponseRecord),
    Answers(RaterSubmission),
}

impl ResponseFile {
    pub fn into_records(self) -> Vec<ResponseRecord> {
        let entries = match self {
            ResponseFile::Wrapped { responses } => responses,
            ResponseFile::List(entries) => entries,
        };
        entries
            .into_iter()
            .map(|entry| match entry {
                ResponseEntry::Record(record) => record,
                ResponseEntry::Answers(answers) => ResponseRecord {
                    rater: None,
                    answers,
                },
            })
            .collect()
    }
}
