//! CSV export for triage records.

use std::io::Write;
use std::path::Path;

use crate::TriageError;
use crate::core::record::TriageRecord;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "schema_version",
    "record_id",
    "date",
    "author",
    "revision_start",
    "revision_end",
    "stated_regressions",
    "stated_improvements",
    "stated_mixed",
    "tallied_regressions",
    "tallied_improvements",
    "tallied_mixed",
    "entries",
    "nags",
    "rollups",
    "count_mismatch",
    "source_sha256",
];

/// CSV exporter for triage records.
///
/// Flattens each stored log to one row with a deterministic column order.
/// Stated and tallied counts sit side by side so disagreements stay visible.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CsvExporter.
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export records to a CSV file.
    ///
    /// # Errors
    /// Returns an error if file operations or CSV writing fails.
    pub fn export(&self, records: &[TriageRecord], output: &Path) -> Result<(), TriageError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TriageError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let file = std::fs::File::create(output)
            .map_err(|e| TriageError::Message(format!("failed to create file: {e}")))?;

        self.export_to_writer(records, file)
    }

    /// Export records to stdout.
    pub fn export_to_stdout(&self, records: &[TriageRecord]) -> Result<(), TriageError> {
        let stdout = std::io::stdout();
        let handle = stdout.lock();
        self.export_to_writer(records, handle)
    }

    /// Export records to any writer implementing Write.
    pub fn export_to_writer<W: Write>(
        &self,
        records: &[TriageRecord],
        writer: W,
    ) -> Result<(), TriageError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| TriageError::Message(format!("failed to write CSV headers: {e}")))?;

        for record in records {
            let row = self.record_to_row(record);
            csv_writer
                .write_record(&row)
                .map_err(|e| TriageError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| TriageError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }

    /// Convert a TriageRecord to a row of CSV values.
    fn record_to_row(&self, record: &TriageRecord) -> Vec<String> {
        let log = &record.log;
        let stated = log.summary_counts;
        let tallied = log.tallied_counts();
        vec![
            record.schema_version.to_string(),
            record.record_id.clone(),
            log.date_string(),
            log.author.clone(),
            log.revision_range.start.clone(),
            log.revision_range.end.clone(),
            stated.regressions.to_string(),
            stated.improvements.to_string(),
            stated.mixed.to_string(),
            tallied.regressions.to_string(),
            tallied.improvements.to_string(),
            tallied.mixed.to_string(),
            log.entries.len().to_string(),
            log.nags.len().to_string(),
            log.rollups.map(|v| v.to_string()).unwrap_or_default(),
            (stated != tallied).to_string(),
            record.source_sha256.clone(),
        ]
    }
}
