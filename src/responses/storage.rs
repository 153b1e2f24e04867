use super::types::{ResponseFile, ResponseRecord};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load collected responses from a JSON file.
///
/// Accepts a bare list of answer maps, a list of `{ rater, answers }`
/// records, or an object with a `responses` list. An empty list is valid and
/// evaluates as ungraded.
pub fn load_responses(path: &Path) -> Result<Vec<ResponseRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open responses file at {}", path.display()))?;

    let parsed: ResponseFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse responses in {}", path.display()))?;

    let records = parsed.into_records();
    tracing::debug!(path = %path.display(), count = records.len(), "loaded responses");
    Ok(records)
}

/// Parse responses from an in-memory JSON string.
pub fn parse_responses(json: &str) -> Result<Vec<ResponseRecord>> {
    let parsed: ResponseFile = serde_json::from_str(json).context("Failed to parse responses")?;
    Ok(parsed.into_records())
}
