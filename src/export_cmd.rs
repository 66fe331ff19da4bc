//! CLI command handler for `export`.

use std::path::PathBuf;

use crate::storage::{CsvExporter, JsonlStore};
use crate::{TriageError, TriageResult};

/// Run the `export` command: flatten stored logs to CSV.
///
/// Writes to `csv_out` when given, otherwise to stdout.
pub fn run(store: PathBuf, csv_out: Option<PathBuf>, author: Option<String>) -> TriageResult<()> {
    if !store.exists() {
        return Err(TriageError::Message(format!(
            "history store not found: {}",
            store.display()
        )));
    }

    let store = JsonlStore::new(&store);
    let records = store.read_filtered(author.as_deref())?;
    let exporter = CsvExporter::new();

    match csv_out {
        Some(path) => {
            exporter.export(&records, &path)?;
            eprintln!("Exported {} record(s) to {}", records.len(), path.display());
        }
        None => exporter.export_to_stdout(&records)?,
    }

    Ok(())
}
