//! Shared types for the access-log analyzer.
//!
//! Holds the record and metric models, the error taxonomy, the diagnostics
//! sink used by the ingestion pipeline, and command-line settings.

pub mod diagnostics;
pub mod error;
pub mod models;
pub mod settings;
