//! Ingestion and aggregation pipeline for the access-log analyzer.
//!
//! Validates and parses raw log lines, streams records out of input files,
//! folds them into running aggregates and encodes the requested metrics as
//! a JSON document.

pub mod aggregator;
pub mod analysis;
pub mod encoder;
pub mod parser;
pub mod reader;

pub use analyzer_core as core;
