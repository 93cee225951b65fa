//! Wall-clock traits
//!
//! The store compares schedule timestamps against the local wall clock.
//! The clock is synchronized externally (SNTP on the device); the core only
//! needs "now" in the same calendar convention as the schedule files.

use crate::config::ClockConfig;
use crate::record::Timestamp;

/// Source of the current local time
pub trait Clock {
    /// Current local time
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Source of the current UTC time (seconds since the Unix epoch)
///
/// Implemented by the network time client.
pub trait UtcSource {
    /// Current UTC time in seconds
    fn utc_now(&self) -> i64;
}

impl<T: UtcSource + ?Sized> UtcSource for &T {
    fn utc_now(&self) -> i64 {
        (**self).utc_now()
    }
}

/// Local clock with a fixed GMT and daylight offset
#[derive(Debug, Clone)]
pub struct LocalClock<U> {
    utc: U,
    offset_s: i64,
}

impl<U: UtcSource> LocalClock<U> {
    /// Create a local clock applying both offsets from the clock config
    pub fn new(utc: U, config: &ClockConfig) -> Self {
        Self {
            utc,
            offset_s: i64::from(config.gmt_offset_s) + i64::from(config.dst_offset_s),
        }
    }

    /// Total offset to UTC in seconds
    pub fn offset_s(&self) -> i64 {
        self.offset_s
    }
}

impl<U: UtcSource> Clock for LocalClock<U> {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.utc.utc_now().saturating_add(self.offset_s))
    }
}
