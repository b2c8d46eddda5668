//! Strict UTC timestamp parsing.
//!
//! Every timestamp in the protocol — event `ts_utc`, key validity windows,
//! revocation instants — is RFC 3339 with a mandatory `Z` suffix. Offsets
//! like `+00:00` are rejected even though they denote the same instant, so
//! that a timestamp has exactly one accepted spelling.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("timestamp '{0}' must end with Z")]
    MissingZuluSuffix(String),

    #[error("timestamp '{value}' is not valid RFC 3339: {source}")]
    Invalid {
        value: String,
        source: chrono::ParseError,
    },
}

/// Parse an RFC 3339 `Z`-suffixed timestamp into UTC.
pub fn parse_ts_utc(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    if !s.ends_with('Z') {
        return Err(TimestampError::MissingZuluSuffix(s.to_string()));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| TimestampError::Invalid {
            value: s.to_string(),
            source,
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};

    use super::{parse_ts_utc, TimestampError};

    #[test]
    fn parses_zulu_timestamps() {
        let ts = parse_ts_utc("2026-03-01T12:30:45Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).unwrap());
    }

    #[test]
    fn preserves_subsecond_precision() {
        let ts = parse_ts_utc("2026-03-01T12:30:45.000001Z").unwrap();
        assert_eq!(ts.nanosecond(), 1_000);
    }

    /// `+00:00` denotes the same instant but is not the accepted spelling.
    #[test]
    fn rejects_offset_suffixes() {
        let err = parse_ts_utc("2026-03-01T12:30:45+00:00").unwrap_err();
        assert!(matches!(err, TimestampError::MissingZuluSuffix(_)));
    }

    #[test]
    fn rejects_calendar_invalid_values() {
        let err = parse_ts_utc("2026-13-01T12:30:45Z").unwrap_err();
        assert!(matches!(err, TimestampError::Invalid { .. }));
    }
}
