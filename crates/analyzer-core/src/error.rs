use std::path::PathBuf;
use thiserror::Error;

use crate::models::Metric;

/// All errors produced by the log analyzer.
///
/// Malformed lines are not errors; they are counted as
/// [`RejectReason`](crate::models::RejectReason)s by the reader.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// An input file could not be opened or read to the end.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No input file produced a single valid record.
    #[error("No valid data found in {files} input file(s)")]
    NoValidData { files: usize },

    /// A requested metric needs at least one record.
    #[error("Cannot compute {0} on an empty aggregate")]
    EmptyAggregate(Metric),

    /// The result document could not be written to its destination.
    #[error("Failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The result document could not be serialized.
    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyzerError::FileRead {
            path: PathBuf::from("/var/log/access.log"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/var/log/access.log"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_no_valid_data() {
        let err = AnalyzerError::NoValidData { files: 2 };
        assert_eq!(err.to_string(), "No valid data found in 2 input file(s)");
    }

    #[test]
    fn test_error_display_empty_aggregate() {
        let err = AnalyzerError::EmptyAggregate(Metric::EventsPerSecond);
        assert_eq!(
            err.to_string(),
            "Cannot compute events_per_second on an empty aggregate"
        );
    }

    #[test]
    fn test_error_display_output_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AnalyzerError::OutputWrite {
            path: PathBuf::from("/root/out.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/out.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_config() {
        let err = AnalyzerError::Config("no metrics".to_string());
        assert_eq!(err.to_string(), "Configuration error: no metrics");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AnalyzerError = json_err.into();
        assert!(err.to_string().contains("Failed to serialize result"));
    }
}
