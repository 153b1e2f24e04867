pub mod formatter;

pub use formatter::{format_json, format_score, format_trace, format_verdict, should_use_colors};
