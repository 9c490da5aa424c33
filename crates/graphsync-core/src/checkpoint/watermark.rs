//! Per-stream progress cursor.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::stream::StreamKind;

/// Lower bound used when a stream has never been synced.
pub const DEFAULT_EPOCH: &str = "2023-01-01T00:00:00";

const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The most recent source timestamp known to be fully merged for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    pub stream: StreamKind,
    pub value: NaiveDateTime,
}

impl Watermark {
    pub fn new(stream: StreamKind, value: NaiveDateTime) -> Self {
        Self { stream, value }
    }

    /// Watermark at the default epoch.
    pub fn epoch(stream: StreamKind) -> Self {
        Self::new(stream, epoch())
    }

    /// Render for the checkpoint store, e.g. `2024-03-01 10:15:00.250`.
    pub fn to_storage_string(&self) -> String {
        self.value.format(STORAGE_FORMAT).to_string()
    }

    /// Parse a stored value for `stream`.
    pub fn parse(stream: StreamKind, raw: &str) -> SyncResult<Self> {
        parse_timestamp(raw).map(|value| Self::new(stream, value))
    }
}

/// The default epoch as a timestamp.
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, the `T`-separated ISO form, or a bare date.
pub fn parse_timestamp(raw: &str) -> SyncResult<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| SyncError::InvalidWatermark(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_matches_constant() {
        assert_eq!(parse_timestamp(DEFAULT_EPOCH).unwrap(), epoch());
    }

    #[test]
    fn test_parse_accepted_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 5, 123_456)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01 12:30:05.123456").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T12:30:05.123456").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2023-01-01").unwrap(),
            epoch(),
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(SyncError::InvalidWatermark(_))
        ));
    }

    #[test]
    fn test_storage_string_keeps_precision() {
        let value = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 5, 17)
            .unwrap();
        let wm = Watermark::new(StreamKind::Users, value);
        let stored = wm.to_storage_string();
        assert_eq!(Watermark::parse(StreamKind::Users, &stored).unwrap(), wm);
    }
}
