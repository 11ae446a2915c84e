//! Conversion between caller-side time representations and the extraction
//! service's timestamp encoding.
//!
//! Callers may express a window bound in three forms:
//!
//! - A text timestamp `"YYYY-MM-DD HH:MM:SS[.ffffff]"` (interpreted as UTC).
//! - A structured `DateTime<Utc>`.
//! - Raw (possibly fractional) seconds since the Unix epoch.
//!
//! The service side works in [`ServiceTimestamp`]: whole seconds since the
//! epoch plus an explicit nanosecond remainder. Fractional epoch inputs are
//! split into those two components directly, so sub-microsecond precision is
//! never routed through (and truncated by) a formatted string.
//!
//! Decoding is the exact inverse and is bound to a caller-supplied
//! [`TimeFormat`]: query results carry their timestamps either as fractional
//! epoch seconds or as structured `DateTime<Utc>` values, and that choice is
//! threaded through the whole query engine.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// Text layout accepted for string time bounds. The fractional part is
/// optional and may carry up to nine digits.
const TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// The extraction service's timestamp representation: whole seconds since
/// the Unix epoch plus a nanosecond remainder in `0..1_000_000_000`.
///
/// Ordering is chronological. The remainder is kept separate from the
/// seconds component so a service-side timestamp can resolve finer than the
/// microseconds a formatted string carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceTimestamp {
    /// Whole seconds since `1970-01-01T00:00:00Z`.
    pub secs: i64,
    /// Nanosecond remainder, always `< 1_000_000_000`.
    pub nanos: u32,
}

impl ServiceTimestamp {
    /// Build a timestamp from seconds and a nanosecond remainder.
    pub fn new(secs: i64, nanos: u32) -> Self {
        debug_assert!(nanos < NANOS_PER_SEC, "nanosecond remainder out of range: {nanos}");
        ServiceTimestamp { secs, nanos }
    }
}

/// A caller-supplied time bound in one of the accepted host representations.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeInput {
    /// `"YYYY-MM-DD HH:MM:SS[.ffffff]"`, interpreted as UTC.
    Text(String),
    /// A structured instant.
    DateTime(DateTime<Utc>),
    /// Seconds since the Unix epoch; may be fractional.
    Epoch(f64),
}

impl From<&str> for TimeInput {
    fn from(text: &str) -> Self {
        TimeInput::Text(text.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(text: String) -> Self {
        TimeInput::Text(text)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(dt: DateTime<Utc>) -> Self {
        TimeInput::DateTime(dt)
    }
}

impl From<f64> for TimeInput {
    fn from(secs: f64) -> Self {
        TimeInput::Epoch(secs)
    }
}

impl From<i64> for TimeInput {
    fn from(secs: i64) -> Self {
        TimeInput::Epoch(secs as f64)
    }
}

/// Errors raised while converting caller time bounds.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TimestampError {
    /// The text bound did not match `"YYYY-MM-DD HH:MM:SS[.ffffff]"`.
    #[snafu(display("Cannot parse time bound {text:?} (expected YYYY-MM-DD HH:MM:SS[.ffffff])"))]
    UnparsableText {
        /// The offending input text.
        text: String,
    },

    /// An epoch-seconds bound was NaN or infinite.
    #[snafu(display("Epoch-seconds time bound must be finite, got {value}"))]
    NonFiniteEpoch {
        /// The offending input value.
        value: f64,
    },

    /// A service timestamp does not fit chrono's representable range.
    #[snafu(display("Service timestamp out of representable range: secs={secs}, nanos={nanos}"))]
    OutOfRange {
        /// Seconds component of the unrepresentable timestamp.
        secs: i64,
        /// Nanosecond component of the unrepresentable timestamp.
        nanos: u32,
    },
}

/// Encode one caller-side time bound into the service representation.
///
/// Fractional epoch inputs preserve nanosecond precision: the value is split
/// into `floor(t)` seconds and a rounded nanosecond remainder, carried
/// explicitly rather than through string truncation.
pub fn encode(input: TimeInput) -> Result<ServiceTimestamp, TimestampError> {
    match input {
        TimeInput::Text(text) => {
            let parsed = NaiveDateTime::parse_from_str(&text, TEXT_FORMAT)
                .ok()
                .context(UnparsableTextSnafu { text: text.clone() })?;
            let dt = parsed.and_utc();
            Ok(ServiceTimestamp::new(dt.timestamp(), dt.timestamp_subsec_nanos()))
        }
        TimeInput::DateTime(dt) => {
            Ok(ServiceTimestamp::new(dt.timestamp(), dt.timestamp_subsec_nanos()))
        }
        TimeInput::Epoch(secs) => {
            ensure!(secs.is_finite(), NonFiniteEpochSnafu { value: secs });
            let whole = secs.floor();
            let mut s = whole as i64;
            let mut n = ((secs - whole) * f64::from(NANOS_PER_SEC)).round() as u32;
            // Rounding the remainder can carry into the next second.
            if n >= NANOS_PER_SEC {
                s += 1;
                n = 0;
            }
            Ok(ServiceTimestamp::new(s, n))
        }
    }
}

/// Encode an optional bound; `None` passes through as "no bound".
pub fn encode_opt(input: Option<TimeInput>) -> Result<Option<ServiceTimestamp>, TimestampError> {
    input.map(encode).transpose()
}

/// Decode a service timestamp into a structured UTC instant.
pub fn decode(ts: ServiceTimestamp) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::from_timestamp(ts.secs, ts.nanos).context(OutOfRangeSnafu {
        secs: ts.secs,
        nanos: ts.nanos,
    })
}

/// Decode a service timestamp into fractional seconds since the epoch.
pub fn decode_unix(ts: ServiceTimestamp) -> f64 {
    ts.secs as f64 + f64::from(ts.nanos) * 1e-9
}

/// Output representation for result timestamps, chosen per query call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// Fractional seconds since the Unix epoch.
    #[default]
    UnixSeconds,
    /// Structured `DateTime<Utc>` values.
    DateTime,
}

/// A decoded timestamp sequence in the representation the caller asked for.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamps {
    /// Fractional epoch seconds.
    Unix(Vec<f64>),
    /// Structured UTC instants.
    Utc(Vec<DateTime<Utc>>),
}

impl Timestamps {
    /// An empty sequence in the given output representation.
    pub fn with_format(format: TimeFormat) -> Self {
        match format {
            TimeFormat::UnixSeconds => Timestamps::Unix(Vec::new()),
            TimeFormat::DateTime => Timestamps::Utc(Vec::new()),
        }
    }

    /// Decode and append one service timestamp.
    pub fn push_raw(&mut self, ts: ServiceTimestamp) -> Result<(), TimestampError> {
        match self {
            Timestamps::Unix(seq) => seq.push(decode_unix(ts)),
            Timestamps::Utc(seq) => seq.push(decode(ts)?),
        }
        Ok(())
    }

    /// Number of timestamps in the sequence.
    pub fn len(&self) -> usize {
        match self {
            Timestamps::Unix(seq) => seq.len(),
            Timestamps::Utc(seq) => seq.len(),
        }
    }

    /// Whether the sequence holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encode_text_without_fraction() {
        let ts = encode("2018-05-01 12:00:00".into()).unwrap();
        let expected = Utc.with_ymd_and_hms(2018, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(ts.secs, expected.timestamp());
        assert_eq!(ts.nanos, 0);
    }

    #[test]
    fn encode_text_with_microseconds() {
        let ts = encode("2018-05-01 12:00:00.250000".into()).unwrap();
        assert_eq!(ts.nanos, 250_000_000);
    }

    #[test]
    fn encode_rejects_garbage_text() {
        let err = encode("yesterday at noon".into()).unwrap_err();
        assert!(matches!(err, TimestampError::UnparsableText { .. }));
    }

    #[test]
    fn encode_epoch_preserves_nanoseconds() {
        // 1.5 us past the second; a microsecond-truncating string path
        // would already lose the trailing 500 ns.
        let ts = encode(TimeInput::Epoch(100.000_001_5)).unwrap();
        assert_eq!(ts.secs, 100);
        assert_eq!(ts.nanos, 1_500);
    }

    #[test]
    fn encode_epoch_carries_rounded_remainder() {
        let ts = encode(TimeInput::Epoch(10.999_999_999_9)).unwrap();
        assert_eq!(ts.secs, 11);
        assert_eq!(ts.nanos, 0);
    }

    #[test]
    fn encode_rejects_non_finite_epoch() {
        assert!(matches!(
            encode(TimeInput::Epoch(f64::NAN)),
            Err(TimestampError::NonFiniteEpoch { .. })
        ));
    }

    #[test]
    fn decode_round_trips_text_input_to_sub_millisecond() {
        let ts = encode("2020-03-14 15:09:26.535897".into()).unwrap();
        let dt = decode(ts).unwrap();
        assert_eq!(dt.timestamp(), ts.secs);
        assert_eq!(dt.timestamp_subsec_micros(), 535_897);
    }

    #[test]
    fn decode_round_trips_epoch_input() {
        // f64 resolves ~0.24 us at 2018-era epoch values; the round trip
        // must stay well under a millisecond.
        let t = 1_525_168_800.123_456;
        let ts = encode(TimeInput::Epoch(t)).unwrap();
        assert!((decode_unix(ts) - t).abs() < 1e-6);
    }

    #[test]
    fn decode_round_trips_datetime_input() {
        let dt = Utc.with_ymd_and_hms(2016, 7, 1, 8, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let ts = encode(dt.into()).unwrap();
        assert_eq!(decode(ts).unwrap(), dt);
    }

    #[test]
    fn encode_opt_passes_absent_bound_through() {
        assert_eq!(encode_opt(None).unwrap(), None);
        assert!(encode_opt(Some(TimeInput::Epoch(0.0))).unwrap().is_some());
    }

    #[test]
    fn timestamps_track_format_and_length() {
        let mut unix = Timestamps::with_format(TimeFormat::UnixSeconds);
        let mut utc = Timestamps::with_format(TimeFormat::DateTime);
        assert!(unix.is_empty());

        let ts = ServiceTimestamp::new(100, 500_000_000);
        unix.push_raw(ts).unwrap();
        utc.push_raw(ts).unwrap();

        assert_eq!(unix.len(), 1);
        assert_eq!(utc.len(), 1);
        match unix {
            Timestamps::Unix(seq) => assert!((seq[0] - 100.5).abs() < 1e-12),
            Timestamps::Utc(_) => panic!("unix format expected"),
        }
    }
}
