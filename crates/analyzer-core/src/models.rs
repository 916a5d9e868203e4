use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Number of whitespace-separated tokens in every access-log record.
pub const FIELD_COUNT: usize = 10;

/// A single access-log line after validation and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Seconds since the Unix epoch, floored to the whole second.
    pub timestamp: i64,
    /// Size of the response header as written in the log.
    pub response_header_size: i64,
    /// Client address token; never interpreted as a real address.
    pub client_address: String,
    /// HTTP status code.
    pub http_status: i64,
    /// Response body size in bytes.
    pub response_size: i64,
    pub http_method: String,
    pub url: String,
    pub username: String,
    pub access_type: String,
    pub response_type: String,
}

/// The integer-typed columns of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Timestamp,
    ResponseHeaderSize,
    HttpStatus,
    ResponseSize,
}

impl NumericField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::ResponseHeaderSize => "response_header_size",
            Self::HttpStatus => "http_status",
            Self::ResponseSize => "response_size",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a raw line was not turned into a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The line did not split into exactly [`FIELD_COUNT`] tokens.
    FieldCountMismatch,
    /// A numeric column could not be parsed as an integer.
    FieldTypeMismatch { field: NumericField },
    /// The line bytes are not valid UTF-8.
    InvalidEncoding,
}

impl RejectReason {
    /// Stable label used in diagnostics and per-reason counters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FieldCountMismatch => "field_count_mismatch",
            Self::FieldTypeMismatch { .. } => "field_type_mismatch",
            Self::InvalidEncoding => "invalid_encoding",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldTypeMismatch { field } => write!(f, "{} ({})", self.label(), field),
            _ => f.write_str(self.label()),
        }
    }
}

/// Rejected-line counters for one input file, keyed by [`RejectReason::label`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    by_reason: BTreeMap<&'static str, u64>,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        *self.by_reason.entry(reason.label()).or_insert(0) += 1;
    }

    /// Number of lines rejected for `label` (e.g. `"field_count_mismatch"`).
    pub fn get(&self, label: &str) -> u64 {
        self.by_reason.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.by_reason.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_reason.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.by_reason.iter().map(|(k, v)| (*k, *v))
    }

    /// Fold another file's counters into this one.
    pub fn merge(&mut self, other: &RejectionCounts) {
        for (label, count) in other.iter() {
            *self.by_reason.entry(label).or_insert(0) += count;
        }
    }
}

/// Outcome of reading one input file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Lines that produced a valid [`LogRecord`].
    pub accepted: u64,
    pub rejected: RejectionCounts,
    /// Terminal I/O error, if the file could not be opened or fully read.
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// `true` when the file was read to the end without an I/O failure.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

/// One of the aggregate values the caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MostFrequentAddress,
    LeastFrequentAddress,
    EventsPerSecond,
    TotalBytes,
}

impl Metric {
    /// Key under which the metric appears in the output document.
    pub fn output_key(&self) -> &'static str {
        match self {
            Self::MostFrequentAddress => "most_frequent_ip",
            Self::LeastFrequentAddress => "least_frequent_ip",
            Self::EventsPerSecond => "events_per_second",
            Self::TotalBytes => "total_bytes",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.output_key())
    }
}

/// Which metrics a run should compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    pub most_frequent_address: bool,
    pub least_frequent_address: bool,
    pub events_per_second: bool,
    pub total_bytes: bool,
}

impl MetricSelection {
    /// Every metric enabled.
    pub fn all() -> Self {
        Self {
            most_frequent_address: true,
            least_frequent_address: true,
            events_per_second: true,
            total_bytes: true,
        }
    }

    pub fn contains(&self, metric: Metric) -> bool {
        match metric {
            Metric::MostFrequentAddress => self.most_frequent_address,
            Metric::LeastFrequentAddress => self.least_frequent_address,
            Metric::EventsPerSecond => self.events_per_second,
            Metric::TotalBytes => self.total_bytes,
        }
    }

    /// Enabled metrics in output-document order.
    pub fn enabled(&self) -> Vec<Metric> {
        [
            Metric::MostFrequentAddress,
            Metric::LeastFrequentAddress,
            Metric::EventsPerSecond,
            Metric::TotalBytes,
        ]
        .into_iter()
        .filter(|m| self.contains(*m))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().is_empty()
    }
}
