//! Diagnostics reporting for the parsing pipeline.
//!
//! The reader and the analysis driver never log directly; they report to a
//! [`DiagnosticsSink`] supplied by the caller. The binary installs
//! [`TracingDiagnostics`], tests use [`CollectingDiagnostics`].

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::models::{FileReport, RejectReason};

/// Receiver for per-line and per-file events raised while reading input.
pub trait DiagnosticsSink {
    /// A line was skipped. `line_number` is 1-based.
    fn line_rejected(&mut self, path: &Path, line_number: u64, reason: RejectReason);

    /// A file could not be opened or read; its records are discarded.
    fn file_failed(&mut self, path: &Path, error: &str);

    /// A file was read to the end (successfully or not).
    fn file_finished(&mut self, report: &FileReport);
}

// ── TracingDiagnostics ────────────────────────────────────────────────────────

/// Forwards every event to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn line_rejected(&mut self, path: &Path, line_number: u64, reason: RejectReason) {
        debug!("Skipping {}:{}: {}", path.display(), line_number, reason);
    }

    fn file_failed(&mut self, path: &Path, error: &str) {
        warn!("Failed to read file {}: {}", path.display(), error);
    }

    fn file_finished(&mut self, report: &FileReport) {
        if report.accepted == 0 && report.is_ok() {
            warn!("File {} contained no valid records", report.path.display());
        }
        if !report.rejected.is_empty() {
            let breakdown: Vec<String> = report
                .rejected
                .iter()
                .map(|(label, count)| format!("{}={}", label, count))
                .collect();
            warn!(
                "File {}: {} line(s) rejected ({})",
                report.path.display(),
                report.rejected.total(),
                breakdown.join(", ")
            );
        }
        info!(
            "File {}: {} record(s) accepted",
            report.path.display(),
            report.accepted
        );
    }
}

// ── CollectingDiagnostics ─────────────────────────────────────────────────────

/// A single event captured by [`CollectingDiagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    LineRejected {
        path: PathBuf,
        line_number: u64,
        reason: RejectReason,
    },
    FileFailed {
        path: PathBuf,
        error: String,
    },
    FileFinished {
        path: PathBuf,
        accepted: u64,
        rejected: u64,
    },
}

/// Stores every event in memory for later inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectingDiagnostics {
    pub events: Vec<DiagnosticEvent>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rejections, in the order they were reported.
    pub fn rejections(&self) -> Vec<(u64, RejectReason)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DiagnosticEvent::LineRejected {
                    line_number,
                    reason,
                    ..
                } => Some((*line_number, *reason)),
                _ => None,
            })
            .collect()
    }

    /// Paths of every file that failed.
    pub fn failed_files(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DiagnosticEvent::FileFailed { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticsSink for CollectingDiagnostics {
    fn line_rejected(&mut self, path: &Path, line_number: u64, reason: RejectReason) {
        self.events.push(DiagnosticEvent::LineRejected {
            path: path.to_path_buf(),
            line_number,
            reason,
        });
    }

    fn file_failed(&mut self, path: &Path, error: &str) {
        self.events.push(DiagnosticEvent::FileFailed {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }

    fn file_finished(&mut self, report: &FileReport) {
        self.events.push(DiagnosticEvent::FileFinished {
            path: report.path.clone(),
            accepted: report.accepted,
            rejected: report.rejected.total(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumericField;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_collecting_diagnostics_records_rejections_in_order() {
        let mut sink = CollectingDiagnostics::new();
        let path = Path::new("access.log");
        sink.line_rejected(path, 3, RejectReason::FieldCountMismatch);
        sink.line_rejected(
            path,
            7,
            RejectReason::FieldTypeMismatch {
                field: NumericField::ResponseSize,
            },
        );

        let rejections = sink.rejections();
        assert_eq!(rejections.len(), 2);
        assert_eq!(rejections[0], (3, RejectReason::FieldCountMismatch));
        assert_eq!(rejections[1].0, 7);
    }

    #[test]
    fn test_collecting_diagnostics_failed_files() {
        let mut sink = CollectingDiagnostics::new();
        sink.file_failed(Path::new("/missing.log"), "not found");
        sink.file_finished(&FileReport::new("/other.log"));

        assert_eq!(sink.failed_files(), vec![PathBuf::from("/missing.log")]);
        assert_eq!(sink.events.len(), 2);
    }

    // ── TracingDiagnostics ────────────────────────────────────────────────────

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture<F: FnOnce()>(level: tracing::Level, f: F) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_target(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        log.contents()
    }

    #[test]
    fn test_tracing_diagnostics_emits_rejections_and_file_results() {
        let output = capture(tracing::Level::DEBUG, || {
            let mut sink = TracingDiagnostics;
            let mut report = FileReport::new("a.log");
            report.accepted = 4;
            report.rejected.record(RejectReason::FieldCountMismatch);
            sink.line_rejected(Path::new("a.log"), 3, RejectReason::FieldCountMismatch);
            sink.file_finished(&report);
            sink.file_failed(Path::new("missing.log"), "No such file or directory");
        });

        assert!(output.contains("DEBUG"));
        assert!(output.contains("Skipping a.log:3: field_count_mismatch"));
        assert!(output.contains("File a.log: 1 line(s) rejected (field_count_mismatch=1)"));
        assert!(output.contains("File a.log: 4 record(s) accepted"));
        assert!(output.contains("Failed to read file missing.log: No such file or directory"));
        assert!(!output.contains("contained no valid records"));
    }

    #[test]
    fn test_tracing_diagnostics_rejections_hidden_above_debug() {
        let output = capture(tracing::Level::INFO, || {
            let mut sink = TracingDiagnostics;
            sink.line_rejected(Path::new("a.log"), 1, RejectReason::InvalidEncoding);
            sink.file_finished(&FileReport::new("empty.log"));
        });

        assert!(!output.contains("Skipping"));
        assert!(output.contains("File empty.log contained no valid records"));
    }
}
