//! Line validation and record parsing.
//!
//! A raw line goes through three gates, each of which can reject it with a
//! [`RejectReason`]:
//!
//! 1. [`decode_line`] – the bytes must be valid UTF-8.
//! 2. [`validate_line`] – the line must split into exactly ten tokens.
//! 3. [`parse_record`] – the numeric columns must parse as integers.
//!
//! All three are pure functions; rejection is a value, never a panic.

use analyzer_core::models::{LogRecord, NumericField, RejectReason, FIELD_COUNT};

// ── Public API ────────────────────────────────────────────────────────────────

/// Interpret raw line bytes as text.
pub fn decode_line(bytes: &[u8]) -> Result<&str, RejectReason> {
    std::str::from_utf8(bytes).map_err(|_| RejectReason::InvalidEncoding)
}

/// Accept `line` unchanged when it has exactly [`FIELD_COUNT`] tokens.
///
/// Tokens are separated by runs of whitespace, so stray `\r` characters and
/// padding are ignored. Blank lines have zero tokens and are rejected.
pub fn validate_line(line: &str) -> Result<&str, RejectReason> {
    if line.split_whitespace().count() == FIELD_COUNT {
        Ok(line)
    } else {
        Err(RejectReason::FieldCountMismatch)
    }
}

/// Build a [`LogRecord`] from a validated line.
///
/// Column order: timestamp, response header size, client address, HTTP
/// status, response size, method, URL, username, access type, response type.
pub fn parse_record(line: &str) -> Result<LogRecord, RejectReason> {
    let fields: [&str; FIELD_COUNT] = line
        .split_whitespace()
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| RejectReason::FieldCountMismatch)?;

    let [timestamp, header_size, address, status, size, method, url, username, access, kind] =
        fields;

    Ok(LogRecord {
        timestamp: parse_timestamp(timestamp)?,
        response_header_size: parse_int(header_size, NumericField::ResponseHeaderSize)?,
        client_address: address.to_string(),
        http_status: parse_int(status, NumericField::HttpStatus)?,
        response_size: parse_int(size, NumericField::ResponseSize)?,
        http_method: method.to_string(),
        url: url.to_string(),
        username: username.to_string(),
        access_type: access.to_string(),
        response_type: kind.to_string(),
    })
}

/// Validate and parse in one step.
pub fn parse_line(line: &str) -> Result<LogRecord, RejectReason> {
    validate_line(line).and_then(parse_record)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_int(token: &str, field: NumericField) -> Result<i64, RejectReason> {
    token
        .parse::<i64>()
        .map_err(|_| RejectReason::FieldTypeMismatch { field })
}

/// Parse epoch seconds, flooring an optional decimal fraction
/// (`"1157689312.049"` → `1157689312`, `"-0.5"` → `-1`).
fn parse_timestamp(token: &str) -> Result<i64, RejectReason> {
    let mismatch = RejectReason::FieldTypeMismatch {
        field: NumericField::Timestamp,
    };

    let Some((whole, fraction)) = token.split_once('.') else {
        return parse_int(token, NumericField::Timestamp);
    };

    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(mismatch);
    }
    // "-.5" and ".5" have no whole part.
    if whole.is_empty() || whole == "-" || whole == "+" {
        return Err(mismatch);
    }

    let seconds: i64 = whole.parse().map_err(|_| mismatch)?;
    let has_fraction = fraction.bytes().any(|b| b != b'0');
    if whole.starts_with('-') && has_fraction {
        seconds.checked_sub(1).ok_or(mismatch)
    } else {
        Ok(seconds)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
