//! Reporting module for batch check results.
//!
//! This module provides:
//! - `BatchReport`: Stable machine-readable report structure
//! - Markdown rendering for review
//! - JSON output for CI pipelines

pub mod batch;

// Re-export key types
pub use batch::{
    BATCH_REPORT_VERSION, BatchReport, DocumentReport, DocumentStatus, ReportMetadata,
    ReportSummary, ReportedError, render_markdown,
};
