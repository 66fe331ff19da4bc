//! Core types and schemas for perf-triage.
//!
//! This module contains the canonical `TriageLog` schema (v1), its stored form
//! `TriageRecord`, and the link conventions the logs follow.

pub mod links;
pub mod record;
pub mod schema;

// Re-export key types for convenience
pub use record::TriageRecord;
pub use schema::{
    BuildLabel, Category, HASH_LEN, MagnitudeNote, RevisionRange, SCHEMA_VERSION, SectionNote,
    SummaryCounts, TriageEntry, TriageLog,
};
