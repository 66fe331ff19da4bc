//! JSONL (JSON Lines) history store for parsed triage logs.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use time::Date;
use tracing::debug;

use crate::TriageError;
use crate::core::record::TriageRecord;
use crate::core::schema::SCHEMA_VERSION;

/// Append-only JSONL store of triage records.
///
/// Each record is stored as a single JSON line. A log is published once and
/// never revised, so the store holds at most one record per log date.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a new JsonlStore for the given path.
    ///
    /// The file will be created if it doesn't exist when writing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonlStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single record to the JSONL file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The record's schema_version doesn't match SCHEMA_VERSION
    /// - A record for the same log date is already stored
    /// - File operations or JSON serialization fail
    pub fn append(&self, record: &TriageRecord) -> Result<(), TriageError> {
        let mut stored = self.dates()?;
        if self.append_if_new(record, &mut stored)? {
            Ok(())
        } else {
            Err(TriageError::Message(format!(
                "log for {} is already stored",
                record.log.date_string()
            )))
        }
    }

    /// Append `record` unless its date is in `stored`.
    ///
    /// `stored` must hold the dates already in the file, as returned by
    /// [`JsonlStore::dates`]; it is updated on success. Returns `false` for a
    /// duplicate date. Lets a caller appending many records read the file once.
    pub fn append_if_new(
        &self,
        record: &TriageRecord,
        stored: &mut BTreeSet<Date>,
    ) -> Result<bool, TriageError> {
        if record.schema_version != SCHEMA_VERSION {
            return Err(TriageError::Message(format!(
                "schema version mismatch: record has v{}, expected v{}",
                record.schema_version, SCHEMA_VERSION
            )));
        }
        if stored.contains(&record.log.date) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TriageError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let json = serde_json::to_string(record)
            .map_err(|e| TriageError::Message(format!("failed to serialize record: {e}")))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TriageError::Message(format!("failed to open file: {e}")))?;
        writeln!(file, "{}", json)
            .map_err(|e| TriageError::Message(format!("failed to write record: {e}")))?;

        stored.insert(record.log.date);
        debug!(record_id = %record.record_id, "appended record");
        Ok(true)
    }

    /// Read all records from the JSONL file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, cannot be read, or any
    /// line fails to deserialize.
    pub fn read_all(&self) -> Result<Vec<TriageRecord>, TriageError> {
        self.read_filtered(None)
    }

    /// Read records, optionally keeping only those triaged by `author`.
    ///
    /// A leading `@` on `author` is ignored.
    pub fn read_filtered(&self, author: Option<&str>) -> Result<Vec<TriageRecord>, TriageError> {
        if !self.path.exists() {
            return Err(TriageError::Message(format!(
                "file not found: {}",
                self.path.display()
            )));
        }
        let handle = author.map(|a| a.trim_start_matches('@'));

        let mut records = Vec::new();
        for (line_no, line) in self.lines()? {
            let record: TriageRecord = serde_json::from_str(&line).map_err(|e| {
                TriageError::Message(format!("failed to parse line {line_no}: {e}"))
            })?;
            if handle.is_none_or(|h| record.log.author == h) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Dates of every stored log; empty when the file doesn't exist yet.
    pub fn dates(&self) -> Result<BTreeSet<Date>, TriageError> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        Ok(self.read_all()?.into_iter().map(|r| r.log.date).collect())
    }

    /// True when a record for `date` is already stored.
    pub fn contains_date(&self, date: Date) -> Result<bool, TriageError> {
        Ok(self.dates()?.contains(&date))
    }

    /// Check if the JSONL file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Number of records in the file, 0 when it doesn't exist yet.
    ///
    /// Unreadable lines are errors, as in [`JsonlStore::read_all`].
    pub fn count(&self) -> Result<usize, TriageError> {
        if !self.path.exists() {
            return Ok(0);
        }
        Ok(self.lines()?.len())
    }

    /// Non-blank lines with their 1-based line numbers.
    fn lines(&self) -> Result<Vec<(usize, String)>, TriageError> {
        let file = File::open(&self.path)
            .map_err(|e| TriageError::Message(format!("failed to open file: {e}")))?;

        let mut lines = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                TriageError::Message(format!("failed to read line {}: {e}", idx + 1))
            })?;
            if !line.trim().is_empty() {
                lines.push((idx + 1, line));
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RevisionRange, TriageLog};
    use time::macros::date;

    fn make_test_record() -> TriageRecord {
        let log = TriageLog::new(
            date!(2021 - 01 - 05),
            "tester",
            RevisionRange::new("a".repeat(40), "b".repeat(40)),
            "https://perf.example/",
        );
        TriageRecord::new(log, "00".repeat(32), Vec::new())
    }

    #[test]
    fn test_schema_version_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.jsonl");
        let store = JsonlStore::new(&path);

        let mut record = make_test_record();
        record.schema_version = 999; // Wrong version

        let result = store.append(&record);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("schema version mismatch")
        );
    }

    #[test]
    fn test_append_if_new_tracks_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("history.jsonl"));

        let mut stored = store.dates().unwrap();
        assert!(stored.is_empty());
        assert!(store.append_if_new(&make_test_record(), &mut stored).unwrap());
        assert!(stored.contains(&date!(2021 - 01 - 05)));
        assert!(!store.append_if_new(&make_test_record(), &mut stored).unwrap());
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.dates().unwrap(), stored);
    }

    #[test]
    fn test_count_and_read_agree_on_unreadable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jsonl");
        std::fs::write(&path, b"\xff\xfe\n").unwrap();
        let store = JsonlStore::new(&path);

        let count_err = store.count().unwrap_err().to_string();
        let read_err = store.read_all().unwrap_err().to_string();
        assert!(count_err.contains("failed to read line 1"));
        assert_eq!(count_err, read_err);
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("history.jsonl"));

        store.append(&make_test_record()).unwrap();
        let err = store.append(&make_test_record()).unwrap_err();
        assert!(err.to_string().contains("already stored"));
        assert_eq!(store.count().unwrap(), 1);
    }
}
