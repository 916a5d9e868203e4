use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, Result};
use crate::models::MetricSelection;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Analyze access-log files and compute aggregate metrics
#[derive(Parser, Debug, Clone)]
#[command(
    name = "log-analyzer",
    about = "Analyze access-log files and compute aggregate metrics",
    version
)]
pub struct Settings {
    /// Path to an input file (repeat for several files)
    #[arg(long = "input", value_name = "PATH", required = true, value_parser = existing_path)]
    pub inputs: Vec<PathBuf>,

    /// Path of the JSON document to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Most frequent IP
    #[arg(long)]
    pub mfip: bool,

    /// Least frequent IP
    #[arg(long)]
    pub lfip: bool,

    /// Events per second
    #[arg(long)]
    pub eps: bool,

    /// Total amount of bytes exchanged
    #[arg(long)]
    pub bytes: bool,

    /// Logging level
    #[arg(
        long,
        env = "LOG_ANALYZER_LOG_LEVEL",
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"]
    )]
    pub log_level: String,

    /// Log file path (logs go to stderr when absent)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::parse().resolved()
    }

    /// Same as [`load`](Self::load) but from an explicit argument list.
    pub fn try_load_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?.resolved())
    }

    /// `--debug` overrides the log level.
    fn resolved(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// The metrics selected by the `--mfip`/`--lfip`/`--eps`/`--bytes` flags.
    pub fn metrics(&self) -> MetricSelection {
        MetricSelection {
            most_frequent_address: self.mfip,
            least_frequent_address: self.lfip,
            events_per_second: self.eps,
            total_bytes: self.bytes,
        }
    }

    /// Reject argument combinations clap cannot express.
    ///
    /// The output path must not name one of the inputs, since it is
    /// replaced on write. Paths are compared after resolving `.`, `..`
    /// and symlinks, so differently spelled aliases are caught too.
    pub fn validate(&self) -> Result<()> {
        let Some(output) = resolve_output(&self.output) else {
            // Parent directory is missing: the write fails later on its own.
            return Ok(());
        };
        let clash = self
            .inputs
            .iter()
            .filter_map(|input| std::fs::canonicalize(input).ok())
            .any(|input| input == output);
        if clash {
            return Err(AnalyzerError::Config(format!(
                "output path {} is also an input",
                self.output.display()
            )));
        }
        Ok(())
    }
}

/// Canonical location the output will be written to.
///
/// The file itself may not exist yet, so the parent is resolved and the
/// file name appended. An existing output (possibly a symlink) resolves
/// directly.
fn resolve_output(output: &Path) -> Option<PathBuf> {
    if let Ok(existing) = std::fs::canonicalize(output) {
        return Some(existing);
    }
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

/// Value parser for `--input`: the path must exist when arguments are parsed.
fn existing_path(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path '{}' does not exist", value))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
