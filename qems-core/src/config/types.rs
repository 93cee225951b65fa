//! Configuration type definitions
//!
//! These types represent the appliance configuration. It is read from
//! `qems.toml` on the device file system, with an embedded default.

use heapless::String;

use crate::metric::Metric;
use crate::store::LookupMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum source identifier length (file system path)
pub const MAX_SOURCE_ID_LEN: usize = 32;

/// Maximum host name length
pub const MAX_HOST_LEN: usize = 32;

/// Configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Identifier of a schedule source
pub type SourceId = String<MAX_SOURCE_ID_LEN>;

/// Build a source identifier, `None` if the path is too long
pub fn source_id(path: &str) -> Option<SourceId> {
    let mut id = SourceId::new();
    id.push_str(path).ok()?;
    Some(id)
}

/// Per-metric schedule configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricConfig {
    /// Schedule file path
    pub source: SourceId,
    /// Which buffered record the lookup may return
    pub lookup: LookupMode,
}

impl MetricConfig {
    /// Config for a schedule file with the default lookup
    ///
    /// An oversized path leaves the source empty, which never exists.
    pub fn with_source(path: &str) -> Self {
        Self {
            source: source_id(path).unwrap_or_default(),
            lookup: LookupMode::default(),
        }
    }
}

/// Task periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleConfig {
    /// Render task period (ms)
    pub render_interval_ms: u32,
    /// Loader task period (ms)
    pub reload_interval_ms: u32,
    /// Pause after a reload before the next check (ms)
    pub settle_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 5,
            reload_interval_ms: 1000,
            settle_ms: 200,
        }
    }
}

/// Wall clock configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// NTP server host name
    pub ntp_server: String<MAX_HOST_LEN>,
    /// Zone offset to GMT in seconds
    pub gmt_offset_s: i32,
    /// Daylight saving offset in seconds
    pub dst_offset_s: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let mut ntp_server = String::new();
        let _ = ntp_server.push_str("pool.ntp.org");
        Self {
            ntp_server,
            gmt_offset_s: 3600,
            dst_offset_s: 3600,
        }
    }
}

/// Complete appliance configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppConfig {
    /// Config format version
    pub version: u8,
    /// CO2 saving schedule
    pub co2: MetricConfig,
    /// Cost saving schedule
    pub cost: MetricConfig,
    /// Task periods
    pub schedule: ScheduleConfig,
    /// Wall clock
    pub clock: ClockConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            co2: MetricConfig::with_source("/co2.csv"),
            cost: MetricConfig::with_source("/costs.csv"),
            schedule: ScheduleConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule configuration of a metric
    pub fn metric(&self, metric: Metric) -> &MetricConfig {
        match metric {
            Metric::Co2 => &self.co2,
            Metric::Cost => &self.cost,
        }
    }

    /// Mutable schedule configuration of a metric
    pub fn metric_mut(&mut self, metric: Metric) -> &mut MetricConfig {
        match metric {
            Metric::Co2 => &mut self.co2,
            Metric::Cost => &mut self.cost,
        }
    }
}
