//! Streaming aggregation of parsed log records.
//!
//! Records are folded one at a time into an [`AggregateState`]; nothing is
//! retained beyond the address frequency table and the per-second buckets.
//! Partial states built from different files merge associatively.

use std::cmp::Ordering;
use std::collections::HashMap;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::models::{LogRecord, Metric};

// ── AggregateState ────────────────────────────────────────────────────────────

/// Running totals over every valid record of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    address_counts: HashMap<String, u64>,
    bucket_counts: HashMap<i64, u64>,
    total_bytes: i128,
    record_count: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single record into the running totals.
    pub fn add_record(&mut self, record: &LogRecord) {
        *self
            .address_counts
            .entry(record.client_address.clone())
            .or_insert(0) += 1;
        *self.bucket_counts.entry(record.timestamp).or_insert(0) += 1;
        self.total_bytes += i128::from(record.response_size);
        self.record_count += 1;
    }

    /// Combine another partial aggregate into this one.
    pub fn merge(&mut self, other: AggregateState) {
        for (address, count) in other.address_counts {
            *self.address_counts.entry(address).or_insert(0) += count;
        }
        for (second, count) in other.bucket_counts {
            *self.bucket_counts.entry(second).or_insert(0) += count;
        }
        self.total_bytes += other.total_bytes;
        self.record_count += other.record_count;
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn address_counts(&self) -> &HashMap<String, u64> {
        &self.address_counts
    }

    pub fn bucket_counts(&self) -> &HashMap<i64, u64> {
        &self.bucket_counts
    }

    /// Sum of `response_size` over all records; zero when empty.
    pub fn total_bytes(&self) -> i128 {
        self.total_bytes
    }

    /// Earliest observed second, if any.
    pub fn first_second(&self) -> Option<i64> {
        self.bucket_counts.keys().min().copied()
    }

    /// Latest observed second, if any.
    pub fn last_second(&self) -> Option<i64> {
        self.bucket_counts.keys().max().copied()
    }

    // ── Derived metrics ───────────────────────────────────────────────────────

    /// Address with the highest count; ties go to the lexicographically
    /// smallest address.
    pub fn most_frequent_address(&self) -> Result<&str> {
        self.address_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(address, _)| address.as_str())
            .ok_or(AnalyzerError::EmptyAggregate(Metric::MostFrequentAddress))
    }

    /// Address with the lowest count; ties go to the lexicographically
    /// smallest address.
    pub fn least_frequent_address(&self) -> Result<&str> {
        self.address_counts
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(address, _)| address.as_str())
            .ok_or(AnalyzerError::EmptyAggregate(Metric::LeastFrequentAddress))
    }

    /// Mean number of events per observed second.
    ///
    /// Seconds with no events are not part of the mean.
    pub fn events_per_second(&self) -> Result<f64> {
        if self.bucket_counts.is_empty() {
            return Err(AnalyzerError::EmptyAggregate(Metric::EventsPerSecond));
        }
        let events: u64 = self.bucket_counts.values().sum();
        Ok(events as f64 / self.bucket_counts.len() as f64)
    }
}

impl Extend<LogRecord> for AggregateState {
    fn extend<I: IntoIterator<Item = LogRecord>>(&mut self, records: I) {
        for record in records {
            self.add_record(&record);
        }
    }
}

impl FromIterator<LogRecord> for AggregateState {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(records: I) -> Self {
        let mut state = Self::new();
        state.extend(records);
        state
    }
}

/// Order addresses by descending count, then ascending address.
///
/// Handy for reporting the head of the frequency table.
pub fn ranked_addresses(state: &AggregateState) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = state
        .address_counts
        .iter()
        .map(|(address, count)| (address.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    ranked
}

// ── Tests ─────────────────────────────────────────────────────────────────────
