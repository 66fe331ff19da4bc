//! TriageLog schema v1 - the structured form of one weekly triage document.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

/// Schema version for forward compatibility
pub const SCHEMA_VERSION: u32 = 1;

/// Length of a full commit hash in a revision range
pub const HASH_LEN: usize = 40;

/// Net effect of a single change on benchmark instruction counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Regression,
    Improvement,
    Mixed,
}

impl Category {
    /// All categories in canonical section order.
    pub const ALL: [Category; 3] = [Category::Regression, Category::Improvement, Category::Mixed];

    /// Section heading used in the canonical Markdown shape.
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Regression => "Regressions",
            Category::Improvement => "Improvements",
            Category::Mixed => "Mixed",
        }
    }

    /// Get short text label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Regression => "regression",
            Category::Improvement => "improvement",
            Category::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pair of commits bounding the triaged range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRange {
    pub start: String,
    pub end: String,
}

impl RevisionRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        RevisionRange {
            start: start.into(),
            end: end.into(),
        }
    }

    /// True when `hash` is a full-length hexadecimal commit id.
    pub fn is_valid_hash(hash: &str) -> bool {
        hash.len() == HASH_LEN && hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Regression/improvement/mixed counts, either stated or tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub regressions: u32,
    pub improvements: u32,
    pub mixed: u32,
}

impl SummaryCounts {
    pub fn new(regressions: u32, improvements: u32, mixed: u32) -> Self {
        SummaryCounts {
            regressions,
            improvements,
            mixed,
        }
    }

    /// Count entries per category.
    pub fn tally(entries: &[TriageEntry]) -> Self {
        let mut counts = SummaryCounts::default();
        for entry in entries {
            match entry.category {
                Category::Regression => counts.regressions += 1,
                Category::Improvement => counts.improvements += 1,
                Category::Mixed => counts.mixed += 1,
            }
        }
        counts
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Regression => self.regressions,
            Category::Improvement => self.improvements,
            Category::Mixed => self.mixed,
        }
    }

    /// Sum of all three counts, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.regressions
            .saturating_add(self.improvements)
            .saturating_add(self.mixed)
    }
}

/// Counts come straight from documents, so aggregation saturates.
impl std::ops::AddAssign for SummaryCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.regressions = self.regressions.saturating_add(rhs.regressions);
        self.improvements = self.improvements.saturating_add(rhs.improvements);
        self.mixed = self.mixed.saturating_add(rhs.mixed);
    }
}

impl fmt::Display for SummaryCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Regressions, {} Improvements, {} Mixed",
            self.regressions, self.improvements, self.mixed
        )
    }
}

/// Scenario and benchmark named by an observation, e.g. `full` builds of `ctfe-stress-4-check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLabel {
    pub scenario: String,
    pub benchmark: String,
}

/// One bulleted observation under an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeNote {
    pub text: String,
    /// Signed percentage change, as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildLabel>,
    /// Per-entry comparison link cited by the observation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_link: Option<String>,
}

/// One triaged change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageEntry {
    pub issue_ref: u64,
    pub issue_link: String,
    #[serde(default)]
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magnitude_notes: Vec<MagnitudeNote>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub narrative: String,
}

/// Free text found in a category section before its first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNote {
    pub category: Category,
    pub text: String,
}

/// Structured form of one weekly triage document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageLog {
    /// Identifying key of the log
    pub date: Date,

    /// Triager handle, without the leading `@`
    pub author: String,

    pub revision_range: RevisionRange,

    /// Revision-range comparison link, verbatim
    pub comparison_link: String,

    /// Counts as stated by the summary line
    pub summary_counts: SummaryCounts,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollups: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synopsis: Vec<String>,

    /// Entries in document order
    #[serde(default)]
    pub entries: Vec<TriageEntry>,

    /// Grouped by category, document order within a category
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_notes: Vec<SectionNote>,

    #[serde(default)]
    pub nags: Vec<String>,
}

impl TriageLog {
    /// Create a log with no entries, nags or prose.
    pub fn new(
        date: Date,
        author: impl Into<String>,
        revision_range: RevisionRange,
        comparison_link: impl Into<String>,
    ) -> Self {
        TriageLog {
            date,
            author: author.into(),
            revision_range,
            comparison_link: comparison_link.into(),
            summary_counts: SummaryCounts::default(),
            rollups: None,
            synopsis: Vec::new(),
            entries: Vec::new(),
            section_notes: Vec::new(),
            nags: Vec::new(),
        }
    }

    /// Counts recomputed from `entries`.
    pub fn tallied_counts(&self) -> SummaryCounts {
        SummaryCounts::tally(&self.entries)
    }

    pub fn has_count_mismatch(&self) -> bool {
        self.summary_counts != self.tallied_counts()
    }

    pub fn entries_in(&self, category: Category) -> impl Iterator<Item = &TriageEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn notes_in(&self, category: Category) -> impl Iterator<Item = &SectionNote> {
        self.section_notes
            .iter()
            .filter(move |n| n.category == category)
    }

    /// ISO `YYYY-MM-DD` form of the date.
    pub fn date_string(&self) -> String {
        format_date(self.date)
    }
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s, &format).ok()
}
