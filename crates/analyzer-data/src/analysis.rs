//! Main analysis pipeline.
//!
//! Reads every input in order, merges the per-file aggregates, checks that
//! at least one valid record was seen, and builds (and optionally writes)
//! the [`ResultDocument`].

use std::path::{Path, PathBuf};

use analyzer_core::diagnostics::DiagnosticsSink;
use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::models::{FileReport, MetricSelection, RejectionCounts};
use chrono::{DateTime, Utc};

use crate::aggregator::AggregateState;
use crate::encoder::{write_output, ResultDocument};
use crate::reader::aggregate_file;

// ── Public types ──────────────────────────────────────────────────────────────

/// Run-level counters produced alongside the result document.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp when this run finished.
    pub generated_at: String,
    /// Number of input paths supplied.
    pub files_total: usize,
    /// Inputs that could not be opened or read to the end.
    pub files_failed: usize,
    /// Valid records folded into the aggregate.
    pub records_accepted: u64,
    /// Rejected lines across every input, by reason.
    pub lines_rejected: RejectionCounts,
    /// Earliest observed second.
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest observed second.
    pub last_seen: Option<DateTime<Utc>>,
    /// Distinct client addresses seen.
    pub distinct_addresses: usize,
    /// Wall-clock seconds spent reading and aggregating.
    pub elapsed_seconds: f64,
}

/// The complete output of [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub document: ResultDocument,
    pub state: AggregateState,
    pub reports: Vec<FileReport>,
    pub summary: RunSummary,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Read `paths` in order and merge their records into one aggregate.
///
/// Per-file failures are absorbed: they appear in the returned reports and
/// in `sink`, and the file contributes nothing.
pub fn aggregate_inputs(
    paths: &[PathBuf],
    sink: &mut dyn DiagnosticsSink,
) -> (AggregateState, Vec<FileReport>) {
    let mut state = AggregateState::new();
    let mut reports = Vec::with_capacity(paths.len());

    for path in paths {
        let (partial, report) = aggregate_file(path, sink);
        state.merge(partial);
        reports.push(report);
    }

    (state, reports)
}

/// Run the full pipeline without writing anything.
///
/// 1. Aggregate every input via [`aggregate_inputs`].
/// 2. Fail with [`AnalyzerError::NoValidData`] if no record survived.
/// 3. Build the [`ResultDocument`] for `selection`.
pub fn analyze(
    paths: &[PathBuf],
    selection: MetricSelection,
    sink: &mut dyn DiagnosticsSink,
) -> Result<AnalysisResult> {
    let start = std::time::Instant::now();

    let (state, reports) = aggregate_inputs(paths, sink);
    if state.is_empty() {
        return Err(AnalyzerError::NoValidData { files: paths.len() });
    }

    let document = ResultDocument::build(&state, selection)?;
    let summary = summarize(&state, &reports, start.elapsed().as_secs_f64());

    Ok(AnalysisResult {
        document,
        state,
        reports,
        summary,
    })
}

/// Analyze `paths` and write the encoded document to `output`.
///
/// Nothing is written when the run fails.
pub fn run(
    paths: &[PathBuf],
    output: &Path,
    selection: MetricSelection,
    sink: &mut dyn DiagnosticsSink,
) -> Result<AnalysisResult> {
    let result = analyze(paths, selection, sink)?;
    let encoded = result.document.encode()?;
    write_output(output, &encoded)?;
    Ok(result)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn summarize(state: &AggregateState, reports: &[FileReport], elapsed: f64) -> RunSummary {
    let mut lines_rejected = RejectionCounts::default();
    for report in reports {
        lines_rejected.merge(&report.rejected);
    }

    let to_datetime = |secs: i64| DateTime::<Utc>::from_timestamp(secs, 0);

    RunSummary {
        generated_at: Utc::now().to_rfc3339(),
        files_total: reports.len(),
        files_failed: reports.iter().filter(|r| !r.is_ok()).count(),
        records_accepted: state.record_count(),
        lines_rejected,
        first_seen: state.first_second().and_then(to_datetime),
        last_seen: state.last_second().and_then(to_datetime),
        distinct_addresses: state.address_counts().len(),
        elapsed_seconds: elapsed,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
