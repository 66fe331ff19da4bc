//! Optional `triage.toml` configuration.

use std::path::Path;

use serde::Deserialize;

use crate::{TriageError, TriageResult};

pub const DEFAULT_PERF_BASE: &str = "https://perf.example";
pub const DEFAULT_ISSUES_BASE: &str = "https://issues.example";
pub const DEFAULT_PROJECT: &str = "compiler";
pub const DEFAULT_STAT: &str = "instructions:u";

/// Link conventions for comparison dashboards and the issue tracker.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkConfig {
    pub perf_base: String,
    pub issues_base: String,
    pub project: String,
    pub stat: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            perf_base: DEFAULT_PERF_BASE.to_string(),
            issues_base: DEFAULT_ISSUES_BASE.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            stat: DEFAULT_STAT.to_string(),
        }
    }
}

/// Batch checking options.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckConfig {
    /// Treat validation warnings as failures for the exit code
    pub strict: bool,
    /// File extensions picked up when walking directories
    pub extensions: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            strict: false,
            extensions: vec!["md".to_string()],
        }
    }
}

impl CheckConfig {
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Full configuration file.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    pub links: LinkConfig,
    pub check: CheckConfig,
}

impl TriageConfig {
    pub fn from_toml_str(s: &str) -> TriageResult<Self> {
        toml::from_str(s).map_err(|e| TriageError::Message(format!("failed to parse config: {e}")))
    }
}

/// Load configuration; `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> TriageResult<TriageConfig> {
    let Some(path) = path else {
        return Ok(TriageConfig::default());
    };
    let s = std::fs::read_to_string(path).map_err(|e| {
        TriageError::Message(format!("failed to read config {}: {e}", path.display()))
    })?;
    TriageConfig::from_toml_str(&s)
}
