pub mod batch;
pub mod config;
pub mod core;
pub mod parse;
pub mod render;
pub mod report;
pub mod storage;
pub mod validate;

pub mod check_cmd;
pub mod export_cmd;
pub mod ingest_cmd;
pub mod new_cmd;
pub mod parse_cmd;
pub mod render_cmd;

use std::path::Path;

use thiserror::Error;

pub use crate::core::{Category, TriageEntry, TriageLog, TriageRecord};
pub use crate::parse::{ParseError, parse};
pub use crate::render::render_markdown;
pub use crate::storage::{CsvExporter, JsonlStore};
pub use crate::validate::{ValidationWarning, validate};

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type TriageResult<T> = Result<T, TriageError>;

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha256::digest;
    digest(bytes)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub(crate) fn write_text(path: &Path, contents: &str) -> TriageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TriageError::Message(format!("failed to create directory: {e}")))?;
        }
    }
    std::fs::write(path, contents)
        .map_err(|e| TriageError::Message(format!("failed to write {}: {e}", path.display())))
}
