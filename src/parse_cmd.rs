//! CLI command handler for `parse`.
//!
//! Parses a single triage document and emits the structured log as JSON,
//! together with any data-quality warnings.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::TriageLog;
use crate::parse::parse;
use crate::validate::{ValidationWarning, validate};
use crate::{TriageError, TriageResult, sha256_hex, write_text};

/// JSON payload printed by `parse`.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub path: String,
    pub source_sha256: String,
    pub log: TriageLog,
    pub warnings: Vec<ValidationWarning>,
}

/// Run the `parse` command.
///
/// A parse failure is returned as an error so the binary exits non-zero.
/// Warnings never fail the command.
pub fn run(file: PathBuf, json_out: Option<PathBuf>) -> TriageResult<ParsedDocument> {
    let text = std::fs::read_to_string(&file).map_err(|e| {
        TriageError::Message(format!("failed to read {}: {e}", file.display()))
    })?;

    let log = parse(&text)?;
    let warnings = validate(&log);
    for w in &warnings {
        eprintln!("Warning: {w}");
    }

    let doc = ParsedDocument {
        path: file.display().to_string(),
        source_sha256: sha256_hex(text.as_bytes()),
        log,
        warnings,
    };

    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| TriageError::Message(format!("failed to serialize log: {e}")))?;

    match json_out {
        Some(path) => {
            write_text(&path, &json)?;
            eprintln!(
                "Parsed {} ({} entries, {} nags) -> {}",
                doc.path,
                doc.log.entries.len(),
                doc.log.nags.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# 2021-02-02 Triage Log\n\n\
        Triage done by **@tester**.\n\
        Revision range: [1111111111111111111111111111111111111111..2222222222222222222222222222222222222222](https://perf.example/?start=1111111111111111111111111111111111111111&end=2222222222222222222222222222222222222222&absolute=false&stat=instructions:u)\n\n\
        1 Regression, 0 Improvements, 0 Mixed\n";

    #[test]
    fn test_parse_writes_json_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("2021-02-02.md");
        let output = dir.path().join("out/log.json");
        std::fs::write(&input, DOC).unwrap();

        let doc = run(input, Some(output.clone())).unwrap();
        assert_eq!(doc.log.author, "tester");
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind(), "count_mismatch");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["log"]["date"], "2021-02-02");
        assert_eq!(value["warnings"][0]["kind"], "count_mismatch");
    }

    #[test]
    fn test_parse_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.md");
        std::fs::write(&input, "# 2021-02-02 Triage Log\n").unwrap();

        let err = run(input, None).unwrap_err();
        assert!(matches!(err, TriageError::Parse(_)));
    }
}
