//! Data-quality checks for parsed triage logs.
//!
//! Nothing here fails: published logs legitimately disagree with themselves,
//! so every finding is a warning that carries both sides of the disagreement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::links::{query_param, trailing_number};
use crate::core::{SummaryCounts, TriageLog};

/// A non-fatal finding about a parsed log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Stated summary counts differ from the tally of listed entries
    CountMismatch {
        stated: SummaryCounts,
        tallied: SummaryCounts,
    },
    /// The revision-range link does not name the bracketed hashes
    RevisionLinkMismatch {
        link: String,
        start: String,
        end: String,
    },
    /// An entry's issue link does not end in its displayed number
    IssueLinkMismatch { issue_ref: u64, link: String },
}

impl ValidationWarning {
    /// Stable snake_case name of the warning kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationWarning::CountMismatch { .. } => "count_mismatch",
            ValidationWarning::RevisionLinkMismatch { .. } => "revision_link_mismatch",
            ValidationWarning::IssueLinkMismatch { .. } => "issue_link_mismatch",
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::CountMismatch { stated, tallied } => {
                write!(f, "summary states `{stated}` but entries tally `{tallied}`")
            }
            ValidationWarning::RevisionLinkMismatch { link, start, end } => {
                write!(f, "revision link `{link}` does not compare {start}..{end}")
            }
            ValidationWarning::IssueLinkMismatch { issue_ref, link } => {
                write!(f, "issue #{issue_ref} links to `{link}`")
            }
        }
    }
}

/// Run every check against a parsed log.
pub fn validate(log: &TriageLog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let tallied = log.tallied_counts();
    if log.summary_counts != tallied {
        warnings.push(ValidationWarning::CountMismatch {
            stated: log.summary_counts,
            tallied,
        });
    }

    let range = &log.revision_range;
    let link_start = query_param(&log.comparison_link, "start");
    let link_end = query_param(&log.comparison_link, "end");
    if link_start != Some(range.start.as_str()) || link_end != Some(range.end.as_str()) {
        warnings.push(ValidationWarning::RevisionLinkMismatch {
            link: log.comparison_link.clone(),
            start: range.start.clone(),
            end: range.end.clone(),
        });
    }

    for entry in &log.entries {
        if trailing_number(&entry.issue_link) != Some(entry.issue_ref) {
            warnings.push(ValidationWarning::IssueLinkMismatch {
                issue_ref: entry.issue_ref,
                link: entry.issue_link.clone(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;
    use crate::core::links::{comparison_link, issue_link};
    use crate::core::{Category, RevisionRange, TriageEntry};
    use time::macros::date;

    fn make_log() -> TriageLog {
        let range = RevisionRange::new("a".repeat(40), "b".repeat(40));
        let link = comparison_link(&LinkConfig::default(), &range);
        TriageLog::new(date!(2021 - 01 - 05), "tester", range, link)
    }

    fn entry(issue_ref: u64, category: Category) -> TriageEntry {
        TriageEntry {
            issue_ref,
            issue_link: issue_link(&LinkConfig::default(), issue_ref),
            title: String::new(),
            category,
            magnitude_notes: Vec::new(),
            narrative: String::new(),
        }
    }

    #[test]
    fn test_consistent_log_has_no_warnings() {
        let mut log = make_log();
        log.entries.push(entry(1, Category::Improvement));
        log.summary_counts = SummaryCounts::new(0, 1, 0);
        assert!(validate(&log).is_empty());
    }

    #[test]
    fn test_count_mismatch_carries_both_sides() {
        let mut log = make_log();
        log.entries.push(entry(1, Category::Mixed));
        log.summary_counts = SummaryCounts::new(2, 0, 0);

        let warnings = validate(&log);
        assert_eq!(
            warnings,
            vec![ValidationWarning::CountMismatch {
                stated: SummaryCounts::new(2, 0, 0),
                tallied: SummaryCounts::new(0, 0, 1),
            }]
        );
        assert_eq!(warnings[0].kind(), "count_mismatch");
        assert!(warnings[0].to_string().contains("2 Regressions, 0 Improvements, 0 Mixed"));
    }

    #[test]
    fn test_revision_link_mismatch() {
        let mut log = make_log();
        log.comparison_link = format!(
            "https://perf.example/?start={}&end={}",
            "c".repeat(40),
            "b".repeat(40)
        );
        let warnings = validate(&log);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), "revision_link_mismatch");
    }

    #[test]
    fn test_issue_link_mismatch() {
        let mut log = make_log();
        let mut e = entry(42, Category::Regression);
        e.issue_link = "https://issues.example/compiler/issues/24".to_string();
        log.entries.push(e);
        log.summary_counts = SummaryCounts::new(1, 0, 0);
        assert_eq!(
            validate(&log),
            vec![ValidationWarning::IssueLinkMismatch {
                issue_ref: 42,
                link: "https://issues.example/compiler/issues/24".to_string(),
            }]
        );
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = ValidationWarning::CountMismatch {
            stated: SummaryCounts::new(1, 0, 0),
            tallied: SummaryCounts::default(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.starts_with("{\"kind\":\"count_mismatch\""));
    }
}
