//! CLI command handler for `check`.
//!
//! Batch-validates triage documents. A document that fails to parse is
//! reported and the batch carries on; the exit code reflects the whole run.

use std::path::PathBuf;

use crate::batch::run_batch;
use crate::config::CheckConfig;
use crate::report::{BatchReport, render_markdown};
use crate::{TriageError, TriageResult, write_text};

/// Plain-text summary, one line per document.
pub fn format_text(report: &BatchReport) -> String {
    let mut s = String::new();
    for doc in &report.documents {
        s.push_str(&format!("{} {}  {}", doc.status.emoji(), doc.status.label(), doc.path));
        if let (Some(stated), Some(tallied)) = (doc.stated, doc.tallied) {
            s.push_str(&format!(
                "  stated={}/{}/{} tallied={}/{}/{} entries={} nags={}",
                stated.regressions,
                stated.improvements,
                stated.mixed,
                tallied.regressions,
                tallied.improvements,
                tallied.mixed,
                doc.entries,
                doc.nags
            ));
        }
        s.push('\n');
        if let Some(err) = &doc.error {
            s.push_str(&format!("    error[{}]: {}\n", err.kind, err.message));
        }
        for w in &doc.warnings {
            s.push_str(&format!("    warning[{}]: {}\n", w.kind(), w));
        }
    }
    s.push_str(&format!(
        "\nDocuments: {} | Parsed: {} | Failed: {} | With warnings: {}\n",
        report.summary.total_documents,
        report.summary.parsed,
        report.summary.failed,
        report.summary.with_warnings
    ));
    s
}

/// Run the `check` command and return the recommended exit code.
pub fn run(
    paths: Vec<PathBuf>,
    config: &CheckConfig,
    strict: bool,
    json_out: Option<PathBuf>,
    markdown_out: Option<PathBuf>,
) -> TriageResult<i32> {
    if paths.is_empty() {
        return Err(TriageError::Message(
            "no documents given to check".to_string(),
        ));
    }

    let strict = strict || config.strict;
    eprintln!("perf-triage check");
    eprintln!("  Paths: {}", paths.len());
    eprintln!("  Strict: {}", if strict { "yes" } else { "no" });
    eprintln!();

    let outcomes = run_batch(&paths, config);
    let report = BatchReport::from_outcomes(&outcomes, strict);

    if let Some(ref json_path) = json_out {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| TriageError::Message(format!("failed to serialize batch report: {e}")))?;
        write_text(json_path, &json_str)?;
        eprintln!("Wrote batch report to {}", json_path.display());
    }

    if let Some(ref md_path) = markdown_out {
        write_text(md_path, &render_markdown(&report))?;
        eprintln!("Wrote Markdown report to {}", md_path.display());
    }

    print!("{}", format_text(&report));

    Ok(report.summary.ci_exit_code)
}
