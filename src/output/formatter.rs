use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::scoring::{EvaluationResult, ScoringConfig};

/// Width of the category name column in the verdict table
const NAME_WIDTH: usize = 28;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-10 score with two decimals.
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Truncate a name to fit the table column, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Colorize the tier label by how good the verdict is.
fn paint_tier(result: &EvaluationResult, config: &ScoringConfig) -> String {
    let tier = &result.final_tier;
    if result.deal_breaker_triggered {
        tier.red().bold().to_string()
    } else if result.is_ungraded(config) {
        tier.dimmed().to_string()
    } else if result.final_score_100 >= 80.0 {
        tier.green().bold().to_string()
    } else if result.final_score_100 >= 60.0 {
        tier.yellow().bold().to_string()
    } else {
        tier.red().to_string()
    }
}

/// Format the verdict: per-category table, the score stages and the tier.
pub fn format_verdict(result: &EvaluationResult, config: &ScoringConfig, use_colors: bool) -> String {
    let mut lines = Vec::new();

    if result.deal_breaker_triggered {
        let heading = "DEAL-BREAKER";
        lines.push(if use_colors {
            heading.red().bold().to_string()
        } else {
            heading.to_string()
        });
        for detail in result.deal_breaker_details.lines() {
            lines.push(format!("  {}", detail));
        }
        lines.push(String::new());
    } else if result.is_ungraded(config) {
        lines.push("No valid answers to grade.".to_string());
        lines.push(String::new());
    } else {
        for (id, score) in &result.category_scores {
            let name = truncate_name(config.category_name(id), NAME_WIDTH);
            let flawed = result.flaw_categories.iter().any(|f| &f.id == id);
            let marker = if flawed { " !" } else { "" };
            let score_str = format!("{:>6}", format_score(*score));
            if use_colors {
                lines.push(format!(
                    "{:<4} {:<width$} {}{}",
                    id.dimmed(),
                    name,
                    score_str.bold(),
                    marker.red(),
                    width = NAME_WIDTH
                ));
            } else {
                lines.push(format!(
                    "{:<4} {:<width$} {}{}",
                    id,
                    name,
                    score_str,
                    marker,
                    width = NAME_WIDTH
                ));
            }
        }
        lines.push(String::new());
        lines.push(format!("Core score:         {}", format_score(result.tas_core)));
        lines.push(format!(
            "Intermediate score: {}",
            format_score(result.tas_intermediate)
        ));
    }

    lines.push(format!(
        "Final score:        {} / 10  ({:.1} / 100)",
        format_score(result.final_score_10),
        result.final_score_100
    ));

    let tier = if use_colors {
        paint_tier(result, config)
    } else {
        result.final_tier.clone()
    };
    lines.push(format!("Tier:               {}", tier));

    if !result.flaw_categories.is_empty() {
        let names = result
            .flaw_categories
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Major flaws in:     {}", names));
    }

    lines.join("\n")
}

/// Format the computation trace, one entry per line.
pub fn format_trace(result: &EvaluationResult, use_colors: bool) -> String {
    result
        .log
        .iter()
        .map(|line| {
            if !use_colors {
                line.clone()
            } else if line.starts_with("WARNING:") {
                line.yellow().to_string()
            } else if line.starts_with("---") {
                line.bold().to_string()
            } else {
                line.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the full result as pretty JSON for scripting.
pub fn format_json(result: &EvaluationResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
