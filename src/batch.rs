//! Fault-tolerant batch driver.
//!
//! Each document is read, parsed and validated on its own. A document that
//! cannot be read or parsed becomes a `Failed` outcome and the batch moves on.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::CheckConfig;
use crate::core::TriageLog;
use crate::parse::{ParseError, parse};
use crate::validate::{ValidationWarning, validate};

/// Why a single document failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentFailure {
    #[error("failed to read document: {0}")]
    Read(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DocumentFailure {
    /// Stable snake_case name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentFailure::Read(_) => "read_error",
            DocumentFailure::Parse(e) => e.kind(),
        }
    }
}

/// Result of checking one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Parsed {
        log: TriageLog,
        warnings: Vec<ValidationWarning>,
    },
    Failed(DocumentFailure),
}

impl Outcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Outcome::Parsed { .. })
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        match self {
            Outcome::Parsed { warnings, .. } => warnings,
            Outcome::Failed(_) => &[],
        }
    }
}

/// One document's path, fingerprint and outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    /// SHA-256 of the document text, when it could be read
    pub source_sha256: Option<String>,
    pub outcome: Outcome,
}

/// Parse and validate one document's text.
pub fn check_text(text: &str) -> Outcome {
    match parse(text) {
        Ok(log) => {
            let warnings = validate(&log);
            Outcome::Parsed { log, warnings }
        }
        Err(e) => Outcome::Failed(e.into()),
    }
}

/// Read, parse and validate one document.
pub fn check_document(path: &Path) -> DocumentOutcome {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let outcome = check_text(&text);
            match &outcome {
                Outcome::Parsed { warnings, .. } => {
                    for w in warnings {
                        warn!(path = %path.display(), "{w}");
                    }
                    debug!(path = %path.display(), "parsed");
                }
                Outcome::Failed(e) => warn!(path = %path.display(), "{e}"),
            }
            DocumentOutcome {
                path: path.to_path_buf(),
                source_sha256: Some(crate::sha256_hex(text.as_bytes())),
                outcome,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), "failed to read document: {e}");
            DocumentOutcome {
                path: path.to_path_buf(),
                source_sha256: None,
                outcome: Outcome::Failed(DocumentFailure::Read(e.to_string())),
            }
        }
    }
}

/// Expand directories into the documents they contain.
///
/// Explicit file paths are kept as given, even if their extension is not
/// configured; paths that do not exist are kept so that they surface as
/// read failures. The result is sorted and deduplicated.
pub fn collect_documents(paths: &[PathBuf], config: &CheckConfig) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for path in paths {
        if !path.is_dir() {
            documents.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && config.accepts(entry.path()) => {
                    documents.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable directory entry: {e}"),
            }
        }
    }
    documents.sort();
    documents.dedup();
    documents
}

/// Check every document under `paths`, one outcome per document.
pub fn run_batch(paths: &[PathBuf], config: &CheckConfig) -> Vec<DocumentOutcome> {
    let documents = collect_documents(paths, config);
    info!("checking {} document(s)", documents.len());
    let outcomes: Vec<DocumentOutcome> = documents.iter().map(|p| check_document(p)).collect();
    let failed = outcomes.iter().filter(|o| !o.outcome.is_parsed()).count();
    info!(
        parsed = outcomes.len() - failed,
        failed, "batch complete"
    );
    outcomes
}
