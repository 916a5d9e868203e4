//! Result document construction and serialization.

use std::io::Write;
use std::path::Path;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::models::{Metric, MetricSelection};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::aggregator::AggregateState;

// ── ResultDocument ────────────────────────────────────────────────────────────

/// The requested metrics of one run.
///
/// Absent fields were not requested and are left out of the JSON entirely.
/// Field declaration order is the key order of the encoded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultDocument {
    #[serde(rename = "most_frequent_ip", skip_serializing_if = "Option::is_none")]
    pub most_frequent_address: Option<String>,
    #[serde(rename = "least_frequent_ip", skip_serializing_if = "Option::is_none")]
    pub least_frequent_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<i128>,
}

impl ResultDocument {
    /// Compute every metric in `selection` from `state`.
    ///
    /// Fails with [`AnalyzerError::EmptyAggregate`] when a requested
    /// frequency or rate metric has no records to work from. `total_bytes`
    /// is zero on an empty state.
    pub fn build(state: &AggregateState, selection: MetricSelection) -> Result<Self> {
        let mut doc = Self::default();
        for metric in selection.enabled() {
            match metric {
                Metric::MostFrequentAddress => {
                    doc.most_frequent_address = Some(state.most_frequent_address()?.to_string());
                }
                Metric::LeastFrequentAddress => {
                    doc.least_frequent_address =
                        Some(state.least_frequent_address()?.to_string());
                }
                Metric::EventsPerSecond => {
                    doc.events_per_second = Some(state.events_per_second()?);
                }
                Metric::TotalBytes => {
                    doc.total_bytes = Some(state.total_bytes());
                }
            }
        }
        Ok(doc)
    }

    /// Canonical text form: indented JSON followed by a newline.
    pub fn encode(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Atomically replace `path` with `contents`.
///
/// The bytes go to a uniquely named temporary file in the same directory and
/// are persisted over `path`, so a failed write never leaves a truncated
/// document behind and never touches other files in that directory.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source| AnalyzerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Dropping an unpersisted NamedTempFile removes it.
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
