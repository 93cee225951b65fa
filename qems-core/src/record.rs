//! Schedule records and the CSV line format
//!
//! One record per line, fixed positional fields:
//!
//! ```text
//! 0         1         2
//! 0123456789012345678901234
//! DD.MM.YYYY HH:MM:SS;NN,NN
//! ```
//!
//! - chars `0..19`: local calendar timestamp
//! - chars `20..25`: decimal saving (comma or dot separator), stored as
//!   `round(value * 100)`

use core::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// strftime pattern of the timestamp field
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Length of the timestamp field
pub const TIMESTAMP_LEN: usize = 19;

/// First character of the value field
pub const VALUE_START: usize = 20;

/// End (exclusive) of the value field
pub const VALUE_END: usize = 25;

/// Point in time on the local calendar
///
/// Seconds since 1970-01-01 00:00:00 of the *local* wall clock, i.e. the
/// naive calendar time converted as if it were UTC. Clock and schedule files
/// share this convention, so no timezone database is needed on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create from local epoch seconds
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Local epoch seconds
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    /// Create from a naive local date/time
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.and_utc().timestamp())
    }

    /// Create from calendar fields, `None` if the date or time is invalid
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, min, sec)
            .map(Self::from_datetime)
    }

    /// Parse a `DD.MM.YYYY HH:MM:SS` timestamp
    pub fn parse(text: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .ok()
            .map(Self::from_datetime)
    }

    /// Convert back to a naive local date/time
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.0, 0).map(|dt| dt.naive_utc())
    }

    /// Shift by a number of seconds
    pub const fn add_secs(self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Clock label, `HH:MM:SS`
    pub fn time_label(self) -> String<8> {
        let mut label = String::new();
        if let Some(dt) = self.to_datetime() {
            if write!(label, "{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second()).is_err() {
                label.clear();
            }
        }
        label
    }

    /// Date label, `DD.MM.YYYY`, empty if the year needs more than four chars
    pub fn date_label(self) -> String<10> {
        let mut label = String::new();
        if let Some(dt) = self.to_datetime() {
            if write!(label, "{:02}.{:02}.{:04}", dt.day(), dt.month(), dt.year()).is_err() {
                label.clear();
            }
        }
        label
    }
}

/// One scheduled saving value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Start of the time slot this value applies to
    pub timestamp: Timestamp,
    /// Saving in percent, nominally 0..=100 (not clamped)
    pub value: i32,
}

impl Record {
    /// Create a record
    pub const fn new(timestamp: Timestamp, value: i32) -> Self {
        Self { timestamp, value }
    }
}

/// Reasons a line does not produce a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line ends before the timestamp field is complete
    TooShort,
    /// Timestamp field is not a valid `DD.MM.YYYY HH:MM:SS`
    InvalidTimestamp,
}

/// Parse one schedule line into a record
///
/// The value field never fails; see [`parse_value`].
pub fn parse_line(line: &str) -> Result<Record, LineError> {
    let stamp = line.get(..TIMESTAMP_LEN).ok_or(LineError::TooShort)?;
    let timestamp = Timestamp::parse(stamp).ok_or(LineError::InvalidTimestamp)?;
    Ok(Record::new(timestamp, parse_value(value_field(line))))
}

/// Extract the value field, clipped to the end of the line
fn value_field(line: &str) -> &str {
    let end = line.len().min(VALUE_END);
    line.get(VALUE_START..end).unwrap_or("")
}

/// Best-effort decimal parse into hundredths
///
/// Accepts an optional sign, integer digits, one `,` or `.` separator and
/// fractional digits; parsing stops at the first other character. The third
/// fractional digit rounds half-up. Text without digits yields 0.
pub fn parse_value(field: &str) -> i32 {
    let mut bytes = field.trim_start().bytes().peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut whole: i64 = 0;
    let mut cents: i64 = 0;
    let mut fraction_len: u8 = 0;
    let mut in_fraction = false;
    let mut round_up = false;

    for b in bytes {
        match b {
            b'0'..=b'9' => {
                let digit = i64::from(b - b'0');
                if !in_fraction {
                    whole = whole.saturating_mul(10).saturating_add(digit);
                    continue;
                }
                match fraction_len {
                    0 => cents += digit * 10,
                    1 => cents += digit,
                    2 => round_up = digit >= 5,
                    _ => {}
                }
                fraction_len = fraction_len.saturating_add(1);
            }
            b',' | b'.' if !in_fraction => in_fraction = true,
            _ => break,
        }
    }

    let magnitude = whole
        .saturating_mul(100)
        .saturating_add(cents)
        .saturating_add(i64::from(round_up));
    let hundredths = if negative { -magnitude } else { magnitude };

    i32::try_from(hundredths).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}
