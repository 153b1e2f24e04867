use serde::{Deserialize, Serialize};

/// Category marked because one of its critical criteria fell below `crit_low`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlawedCategory {
    pub id: String,
    pub name: String,
}

/// Per-evaluation side channel threaded through every stage by `&mut`.
///
/// Holds the human-readable audit trace and the major-flaw categories found by
/// the criterion adjuster. One context per `evaluate` call; nothing is shared
/// across calls.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    log: Vec<String>,
    flaws: Vec<FlawedCategory>,
}

impl EvaluationContext {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            log: vec![header.into()],
            flaws: Vec::new(),
        }
    }

    /// Append a line to the audit trace.
    pub fn record(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Start a new trace section.
    pub fn section(&mut self, title: &str) {
        self.log.push(String::new());
        self.log.push(format!("--- {} ---", title));
    }

    /// Record a degraded input. Also emitted as a `tracing` warning so hosts
    /// see it without reading the trace.
    pub fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{}", line);
        self.log.push(format!("WARNING: {}", line));
    }

    /// Flag a category as containing a major flaw. Returns false if it was
    /// already flagged.
    pub fn flag_flaw(&mut self, id: &str, name: &str) -> bool {
        if self.has_flaw(id) {
            return false;
        }
        self.flaws.push(FlawedCategory {
            id: id.to_string(),
            name: name.to_string(),
        });
        true
    }

    pub fn has_flaw(&self, category_id: &str) -> bool {
        self.flaws.iter().any(|f| f.id == category_id)
    }

    pub fn flaws(&self) -> &[FlawedCategory] {
        &self.flaws
    }

    /// Comma-separated flawed category names, for trace messages.
    pub fn flaw_names(&self) -> String {
        self.flaws
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<FlawedCategory>) {
        (self.log, self.flaws)
    }
}
