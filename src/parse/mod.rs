//! Record parser: one triage document in, one `TriageLog` out.
//!
//! The parser is line oriented. It reads the header region (everything
//! before the first section header) for the dated title, attribution,
//! revision range, summary and rollups lines, then walks the sections,
//! splitting category sections into entries and collecting nags.

mod parser;
mod patterns;

pub use parser::parse;

use thiserror::Error;

/// Why a document could not be parsed.
///
/// Every variant is scoped to a single document; a batch run records it and
/// moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("malformed summary line: {}", describe_summary(.line))]
    MalformedSummaryLine { line: Option<String> },

    #[error("unrecognized section `{header}` at line {line}")]
    UnrecognizedSection { header: String, line: usize },
}

impl ParseError {
    /// Stable snake_case name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MalformedHeader { .. } => "malformed_header",
            ParseError::MalformedSummaryLine { .. } => "malformed_summary_line",
            ParseError::UnrecognizedSection { .. } => "unrecognized_section",
        }
    }

    pub(crate) fn header(reason: impl Into<String>) -> Self {
        ParseError::MalformedHeader {
            reason: reason.into(),
        }
    }
}

/// True when `line`, placed inside a category section, would open a new entry.
pub(crate) fn opens_entry(line: &str) -> bool {
    patterns::entry_start(line).is_some()
}

fn describe_summary(line: &Option<String>) -> String {
    match line {
        Some(line) => format!("could not read counts from `{line}`"),
        None => "no `N Regressions, M Improvements, K Mixed` line found".to_string(),
    }
}
