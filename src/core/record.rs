//! Stored form of a parsed triage log.

use serde::{Deserialize, Serialize};

use super::schema::{SCHEMA_VERSION, TriageLog};
use crate::validate::ValidationWarning;

/// One line of the history store: a parsed log plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRecord {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    /// `<date>-<first 12 hex digits of the source hash>`
    pub record_id: String,

    /// ISO 8601 timestamp of ingestion
    pub ingested_at: String,

    /// Path the document was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// SHA-256 of the document text
    pub source_sha256: String,

    pub log: TriageLog,

    /// Validation warnings at ingestion time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
}

impl TriageRecord {
    /// Create a new TriageRecord with required fields
    pub fn new(log: TriageLog, source_sha256: String, warnings: Vec<ValidationWarning>) -> Self {
        let ingested_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        let short = source_sha256.get(..12).unwrap_or(&source_sha256);
        let record_id = format!("{}-{}", log.date_string(), short);

        TriageRecord {
            schema_version: SCHEMA_VERSION,
            record_id,
            ingested_at,
            source_path: None,
            source_sha256,
            log,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RevisionRange;
    use time::macros::date;

    #[test]
    fn test_record_id_from_date_and_hash() {
        let log = TriageLog::new(
            date!(2021 - 01 - 05),
            "tester",
            RevisionRange::new("a".repeat(40), "b".repeat(40)),
            "https://perf.example/",
        );
        let record = TriageRecord::new(log, crate::sha256_hex(b"doc"), Vec::new());
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert!(record.record_id.starts_with("2021-01-05-"));
        assert_eq!(record.record_id.len(), "2021-01-05-".len() + 12);
        assert!(record.source_path.is_none());
    }

    #[test]
    fn test_optional_fields_skipped_when_empty() {
        let log = TriageLog::new(
            date!(2021 - 01 - 05),
            "tester",
            RevisionRange::new("a".repeat(40), "b".repeat(40)),
            "https://perf.example/",
        );
        let record = TriageRecord::new(log, "abc".to_string(), Vec::new());
        assert_eq!(record.record_id, "2021-01-05-abc");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("source_path"));
        assert!(!json.contains("warnings"));
    }
}
