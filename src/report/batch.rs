//! Batch report structure for triage-log checks.
//!
//! This module defines a stable `BatchReport` schema that can be:
//! - Serialized to JSON for machine consumption
//! - Rendered to Markdown for review
//! - Used to determine CI exit codes

use serde::{Deserialize, Serialize};

use crate::batch::{DocumentOutcome, Outcome};
use crate::core::SummaryCounts;
use crate::validate::ValidationWarning;

/// Schema version for BatchReport
pub const BATCH_REPORT_VERSION: u32 = 1;

/// A complete batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Schema version for forward compatibility
    pub version: u32,
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Per-document results, in batch order
    pub documents: Vec<DocumentReport>,
    /// Summary statistics
    pub summary: ReportSummary,
}

/// Metadata about the batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// ISO 8601 timestamp when report was generated
    pub generated_at: String,
    /// Whether warnings count as failures for the exit code
    pub strict: bool,
}

/// Result for a single document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub path: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Counts as stated by the summary line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stated: Option<SummaryCounts>,
    /// Counts tallied from the listed entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tallied: Option<SummaryCounts>,
    #[serde(default)]
    pub entries: usize,
    #[serde(default)]
    pub nags: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

/// A document failure, flattened for the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportedError {
    pub kind: String,
    pub message: String,
}

/// Status of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Parsed with no warnings
    Ok,
    /// Parsed, with data-quality warnings
    Warning,
    /// Could not be read or parsed
    Failed,
}

impl DocumentStatus {
    /// Get emoji representation for markdown.
    pub fn emoji(&self) -> &'static str {
        match self {
            DocumentStatus::Ok => "✅",
            DocumentStatus::Warning => "⚠️",
            DocumentStatus::Failed => "❌",
        }
    }

    /// Get short text label.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Ok => "OK",
            DocumentStatus::Warning => "WARN",
            DocumentStatus::Failed => "FAILED",
        }
    }

    /// Is this status a failure for CI purposes?
    pub fn is_failure(&self, strict: bool) -> bool {
        match self {
            DocumentStatus::Ok => false,
            DocumentStatus::Warning => strict,
            DocumentStatus::Failed => true,
        }
    }
}

/// Summary statistics for the report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total documents checked
    pub total_documents: usize,
    /// Documents that parsed
    pub parsed: usize,
    /// Documents that failed
    pub failed: usize,
    /// Parsed documents with at least one warning
    pub with_warnings: usize,
    /// Total warnings emitted
    pub total_warnings: usize,
    /// Stated counts summed over parsed documents
    pub stated: SummaryCounts,
    /// Tallied counts summed over parsed documents
    pub tallied: SummaryCounts,
    /// Recommended CI exit code (0 = pass, 1 = failures)
    pub ci_exit_code: i32,
}

impl From<&DocumentOutcome> for DocumentReport {
    fn from(doc: &DocumentOutcome) -> Self {
        let path = doc.path.display().to_string();
        match &doc.outcome {
            Outcome::Parsed { log, warnings } => DocumentReport {
                path,
                status: if warnings.is_empty() {
                    DocumentStatus::Ok
                } else {
                    DocumentStatus::Warning
                },
                date: Some(log.date_string()),
                author: Some(log.author.clone()),
                stated: Some(log.summary_counts),
                tallied: Some(log.tallied_counts()),
                entries: log.entries.len(),
                nags: log.nags.len(),
                warnings: warnings.clone(),
                error: None,
            },
            Outcome::Failed(e) => DocumentReport {
                path,
                status: DocumentStatus::Failed,
                date: None,
                author: None,
                stated: None,
                tallied: None,
                entries: 0,
                nags: 0,
                warnings: Vec::new(),
                error: Some(ReportedError {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

impl BatchReport {
    /// Create a new, empty batch report.
    pub fn new(strict: bool) -> Self {
        let generated_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        BatchReport {
            version: BATCH_REPORT_VERSION,
            metadata: ReportMetadata {
                generated_at,
                strict,
            },
            documents: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    /// Build and finalize a report from batch outcomes.
    pub fn from_outcomes(outcomes: &[DocumentOutcome], strict: bool) -> Self {
        let mut report = BatchReport::new(strict);
        for outcome in outcomes {
            report.add_document(outcome.into());
        }
        report.finalize();
        report
    }

    /// Add a document result.
    pub fn add_document(&mut self, doc: DocumentReport) {
        self.summary.total_documents += 1;
        match doc.status {
            DocumentStatus::Failed => self.summary.failed += 1,
            DocumentStatus::Warning => {
                self.summary.parsed += 1;
                self.summary.with_warnings += 1;
            }
            DocumentStatus::Ok => self.summary.parsed += 1,
        }
        self.summary.total_warnings += doc.warnings.len();
        if let Some(stated) = doc.stated {
            self.summary.stated += stated;
        }
        if let Some(tallied) = doc.tallied {
            self.summary.tallied += tallied;
        }
        self.documents.push(doc);
    }

    /// Finalize the report and compute exit code.
    pub fn finalize(&mut self) {
        let strict = self.metadata.strict;
        self.summary.ci_exit_code = if self
            .documents
            .iter()
            .any(|d| d.status.is_failure(strict))
        {
            1
        } else {
            0
        };
    }
}

fn counts_cell(counts: Option<SummaryCounts>) -> String {
    match counts {
        Some(c) => format!("{}/{}/{}", c.regressions, c.improvements, c.mixed),
        None => "-".to_string(),
    }
}

/// Render batch report as Markdown.
pub fn render_markdown(report: &BatchReport) -> String {
    let mut out = String::new();

    // Header with status
    let status_emoji = if report.summary.ci_exit_code != 0 {
        "❌"
    } else if report.summary.with_warnings > 0 {
        "⚠️"
    } else {
        "✅"
    };

    out.push_str(&format!("## {} perf-triage Check Report\n\n", status_emoji));

    // Metadata
    out.push_str(&format!(
        "| | |\n|---|---|\n\
         | **Documents** | {} |\n\
         | **Strict** | {} |\n\
         | **Generated** | {} |\n\n",
        report.summary.total_documents,
        if report.metadata.strict { "yes" } else { "no" },
        report
            .metadata
            .generated_at
            .get(..19)
            .unwrap_or(&report.metadata.generated_at)
            .replace('T', " ")
    ));

    // Summary box
    out.push_str("### Summary\n\n");
    out.push_str(&format!(
        "| Metric | Count |\n|--------|-------|\n\
         | Parsed | {} |\n\
         | Failed | {} |\n\
         | With warnings | {} |\n\
         | Stated (R/I/M) | {} |\n\
         | Tallied (R/I/M) | {} |\n\n",
        report.summary.parsed,
        report.summary.failed,
        report.summary.with_warnings,
        counts_cell(Some(report.summary.stated)),
        counts_cell(Some(report.summary.tallied)),
    ));

    if report.summary.failed > 0 {
        out.push_str("### ❌ Failures\n\n");
        out.push_str("| Document | Kind | Reason |\n");
        out.push_str("|----------|------|--------|\n");
        for doc in &report.documents {
            if let Some(err) = &doc.error {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    doc.path,
                    err.kind,
                    err.message.replace('|', "\\|")
                ));
            }
        }
        out.push('\n');
    }

    if report.summary.total_warnings > 0 {
        out.push_str("### ⚠️ Warnings\n\n");
        out.push_str("| Document | Kind | Detail |\n");
        out.push_str("|----------|------|--------|\n");
        for doc in &report.documents {
            for warning in &doc.warnings {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    doc.path,
                    warning.kind(),
                    warning.to_string().replace('|', "\\|")
                ));
            }
        }
        out.push('\n');
    }

    // Full results table (collapsed)
    out.push_str("<details>\n<summary>All Documents</summary>\n\n");
    out.push_str("| Document | Date | Author | Stated | Tallied | Entries | Status |\n");
    out.push_str("|----------|------|--------|--------|---------|---------|--------|\n");
    for doc in &report.documents {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            doc.path,
            doc.date.as_deref().unwrap_or("-"),
            doc.author.as_deref().unwrap_or("-"),
            counts_cell(doc.stated),
            counts_cell(doc.tallied),
            doc.entries,
            doc.status.emoji()
        ));
    }
    out.push_str("\n</details>\n\n");

    // Legend
    out.push_str("---\n");
    out.push_str("✅ = parsed | ⚠️ = parsed with warnings | ❌ = failed\n");

    out
}
