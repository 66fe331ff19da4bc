//! CLI command handler for `ingest`.
//!
//! Batch-parses documents and appends the new logs to the JSONL history
//! store. Failed documents and dates that are already stored are reported
//! and skipped.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::batch::{Outcome, run_batch};
use crate::config::CheckConfig;
use crate::core::TriageRecord;
use crate::storage::JsonlStore;
use crate::{TriageError, TriageResult};

/// Counts of what one ingest run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub appended: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl IngestSummary {
    /// 1 when any document failed to parse, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }
}

/// Ingest every document under `paths` into `store`.
pub fn ingest(
    paths: &[PathBuf],
    config: &CheckConfig,
    store: &JsonlStore,
) -> TriageResult<IngestSummary> {
    let mut summary = IngestSummary::default();
    let mut stored = store.dates()?;

    for doc in run_batch(paths, config) {
        let (log, warnings) = match doc.outcome {
            Outcome::Parsed { log, warnings } => (log, warnings),
            Outcome::Failed(e) => {
                eprintln!("Skipping {}: {e}", doc.path.display());
                summary.failed += 1;
                continue;
            }
        };

        let sha = doc.source_sha256.unwrap_or_default();
        let mut record = TriageRecord::new(log, sha, warnings);
        record.source_path = Some(doc.path.display().to_string());

        if store.append_if_new(&record, &mut stored)? {
            info!(record_id = %record.record_id, "ingested");
            summary.appended += 1;
        } else {
            let date = record.log.date_string();
            warn!(path = %doc.path.display(), %date, "already stored");
            eprintln!(
                "Skipping {}: log for {} is already stored",
                doc.path.display(),
                date
            );
            summary.duplicates += 1;
        }
    }

    Ok(summary)
}

/// Run the `ingest` command and return the exit code.
pub fn run(paths: Vec<PathBuf>, config: &CheckConfig, store: PathBuf) -> TriageResult<i32> {
    if paths.is_empty() {
        return Err(TriageError::Message(
            "no documents given to ingest".to_string(),
        ));
    }

    let store = JsonlStore::new(&store);
    eprintln!("Ingesting into: {}", store.path().display());

    let summary = ingest(&paths, config, &store)?;
    eprintln!(
        "Appended {} log(s), skipped {} duplicate(s), {} failed",
        summary.appended, summary.duplicates, summary.failed
    );
    eprintln!("Store now holds {} record(s)", store.count()?);

    Ok(summary.exit_code())
}
