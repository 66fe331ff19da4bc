//! Storage layer for triage records.
//!
//! This module provides persistence for `TriageRecord` data in various formats.

pub mod csv;
pub mod jsonl;

// Re-export key types
pub use csv::{CSV_HEADERS, CsvExporter};
pub use jsonl::JsonlStore;
