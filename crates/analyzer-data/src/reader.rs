//! Access-log file reading.
//!
//! [`FileRecords`] is a lazy iterator over the valid records of one input.
//! Malformed lines are counted and reported to the [`DiagnosticsSink`] but
//! never end the iteration; an I/O failure does, and is recorded on the
//! file's [`FileReport`].

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use analyzer_core::diagnostics::DiagnosticsSink;
use analyzer_core::error::AnalyzerError;
use analyzer_core::models::{FileReport, LogRecord};

use crate::aggregator::AggregateState;
use crate::parser::{decode_line, parse_line};

// ── FileRecords ───────────────────────────────────────────────────────────────

/// Lazy sequence of valid [`LogRecord`]s read from a single source.
pub struct FileRecords<'a, R: BufRead> {
    reader: R,
    sink: &'a mut dyn DiagnosticsSink,
    report: FileReport,
    /// Extra lines split off a chunk on bare `\r` terminators.
    pending: VecDeque<Vec<u8>>,
    line_number: u64,
    exhausted: bool,
}

impl<'a> FileRecords<'a, BufReader<File>> {
    /// Open `path` for reading.
    pub fn open(
        path: &Path,
        sink: &'a mut dyn DiagnosticsSink,
    ) -> Result<Self, AnalyzerError> {
        let file = File::open(path).map_err(|source| AnalyzerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, BufReader::new(file), sink))
    }
}

impl<'a, R: BufRead> FileRecords<'a, R> {
    /// Wrap an already-open reader; `path` is only used for reporting.
    pub fn new(path: impl Into<PathBuf>, reader: R, sink: &'a mut dyn DiagnosticsSink) -> Self {
        Self {
            reader,
            sink,
            report: FileReport::new(path),
            pending: VecDeque::new(),
            line_number: 0,
            exhausted: false,
        }
    }

    /// Counters gathered so far.
    pub fn report(&self) -> &FileReport {
        &self.report
    }

    /// Stop reading, notify the sink, and hand back the file's report.
    pub fn finish(self) -> FileReport {
        self.sink.file_finished(&self.report);
        self.report
    }

    /// Next raw line without its terminator, or `None` at EOF / on error.
    ///
    /// `\n`, `\r\n` and bare `\r` all end a line.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }
        if self.exhausted {
            return None;
        }

        let mut chunk = Vec::new();
        match self.reader.read_until(b'\n', &mut chunk) {
            Ok(0) => {
                self.exhausted = true;
                None
            }
            Ok(_) => {
                if chunk.last() == Some(&b'\n') {
                    chunk.pop();
                }
                if chunk.last() == Some(&b'\r') {
                    chunk.pop();
                }
                if !chunk.contains(&b'\r') {
                    return Some(chunk);
                }
                self.pending
                    .extend(chunk.split(|b| *b == b'\r').map(<[u8]>::to_vec));
                self.pending.pop_front()
            }
            Err(e) => {
                self.exhausted = true;
                let message = e.to_string();
                self.sink.file_failed(&self.report.path, &message);
                self.report.error = Some(message);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for FileRecords<'_, R> {
    type Item = LogRecord;

    fn next(&mut self) -> Option<LogRecord> {
        loop {
            let line = self.next_line()?;
            self.line_number += 1;

            match decode_line(&line).and_then(parse_line) {
                Ok(record) => {
                    self.report.accepted += 1;
                    return Some(record);
                }
                Err(reason) => {
                    self.report.rejected.record(reason);
                    self.sink
                        .line_rejected(&self.report.path, self.line_number, reason);
                }
            }
        }
    }
}

// ── Per-file aggregation ──────────────────────────────────────────────────────

/// Fold every valid record of `path` into a fresh partial aggregate.
///
/// A file that cannot be opened, or fails part-way through, contributes an
/// empty aggregate; the failure is recorded on the returned report.
pub fn aggregate_file(
    path: &Path,
    sink: &mut dyn DiagnosticsSink,
) -> (AggregateState, FileReport) {
    match FileRecords::open(path, sink) {
        Ok(records) => fold_records(records),
        Err(e) => {
            let message = match e {
                AnalyzerError::FileRead { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            sink.file_failed(path, &message);
            let mut report = FileReport::new(path);
            report.error = Some(message);
            sink.file_finished(&report);
            (AggregateState::new(), report)
        }
    }
}

/// Same as [`aggregate_file`] for an already-open reader.
pub fn aggregate_reader<R: BufRead>(
    path: &Path,
    reader: R,
    sink: &mut dyn DiagnosticsSink,
) -> (AggregateState, FileReport) {
    fold_records(FileRecords::new(path, reader, sink))
}

/// Drain `records` into a partial aggregate, discarding it on I/O failure.
fn fold_records<R: BufRead>(mut records: FileRecords<'_, R>) -> (AggregateState, FileReport) {
    let mut partial = AggregateState::new();
    for record in records.by_ref() {
        partial.add_record(&record);
    }
    let report = records.finish();

    if report.is_ok() {
        (partial, report)
    } else {
        (AggregateState::new(), report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
