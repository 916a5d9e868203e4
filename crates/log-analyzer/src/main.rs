mod bootstrap;

use anyhow::{Context, Result};
use analyzer_core::diagnostics::TracingDiagnostics;
use analyzer_core::settings::Settings;
use analyzer_data::aggregator::ranked_addresses;
use analyzer_data::analysis::{self, AnalysisResult};

/// Number of addresses listed in the debug-level frequency summary.
const TOP_ADDRESSES: usize = 5;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Log Analyzer v{} starting", env!("CARGO_PKG_VERSION"));
    settings.validate()?;

    let selection = settings.metrics();
    if selection.is_empty() {
        tracing::warn!("No metrics selected; the output will contain no metric keys");
    }
    tracing::info!(
        "Reading {} input file(s), writing {}",
        settings.inputs.len(),
        settings.output.display()
    );

    let mut sink = TracingDiagnostics;
    let result = analysis::run(&settings.inputs, &settings.output, selection, &mut sink)
        .with_context(|| format!("no output written to {}", settings.output.display()))?;

    log_summary(&result);
    tracing::info!("Results written to {}", settings.output.display());

    Ok(())
}

fn log_summary(result: &AnalysisResult) {
    let summary = &result.summary;
    tracing::info!(
        "Processed {} file(s) ({} failed): {} record(s) accepted, {} line(s) rejected in {:.3}s",
        summary.files_total,
        summary.files_failed,
        summary.records_accepted,
        summary.lines_rejected.total(),
        summary.elapsed_seconds
    );
    if let (Some(first), Some(last)) = (summary.first_seen, summary.last_seen) {
        tracing::info!(
            "Observed {} distinct address(es) between {} and {}",
            summary.distinct_addresses,
            first.to_rfc3339(),
            last.to_rfc3339()
        );
    }
    for (address, count) in ranked_addresses(&result.state).into_iter().take(TOP_ADDRESSES) {
        tracing::debug!("{:>8}  {}", count, address);
    }
}
