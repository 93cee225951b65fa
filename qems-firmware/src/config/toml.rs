//! Simple TOML parser for the appliance configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `qems.toml`. It does NOT support the full TOML language.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[metric.co2]`, `[metric cost]`, `[schedule]` and `[clock]` headers
//! - Comments (# ...)
//!
//! The parser is fed one line at a time so the config can be streamed from
//! the file system without buffering the whole file.

use heapless::String as HString;

use qems_core::config::{AppConfig, CONFIG_VERSION};
use qems_core::metric::Metric;
use qems_core::store::LookupMode;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type or range
    InvalidValue,
    /// String value does not fit its buffer
    TooLong,
    /// Config written for another format version
    UnsupportedVersion,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Metric(Metric),
    Schedule,
    Clock,
}

/// Line-by-line config parser
pub struct ConfigParser {
    config: AppConfig,
    section: Section,
}

impl ConfigParser {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            section: Section::Root,
        }
    }

    /// Parse one line
    pub fn feed(&mut self, line: &str) -> Result<(), ParseError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if line.starts_with('[') && line.ends_with(']') {
            self.section = parse_section_header(&line[1..line.len() - 1])?;
            return Ok(());
        }

        if let Some((key, value)) = parse_key_value(line) {
            self.apply_value(key, value)?;
        }
        Ok(())
    }

    /// Finish parsing and return the configuration
    pub fn finish(self) -> AppConfig {
        self.config
    }

    fn apply_value(&mut self, key: &str, value: &str) -> Result<(), ParseError> {
        let config = &mut self.config;
        match self.section {
            Section::Root => {
                if key == "version" {
                    let version: u8 = parse_int(value)?;
                    if version != CONFIG_VERSION {
                        return Err(ParseError::UnsupportedVersion);
                    }
                    config.version = version;
                }
            }
            Section::Metric(metric) => {
                let m = config.metric_mut(metric);
                match key {
                    "source" => {
                        m.source = HString::try_from(parse_string(value))
                            .map_err(|_| ParseError::TooLong)?
                    }
                    "lookup" => m.lookup = parse_lookup(value)?,
                    _ => {} // Ignore unknown keys
                }
            }
            Section::Schedule => {
                let s = &mut config.schedule;
                match key {
                    "render_interval_ms" => s.render_interval_ms = parse_interval(value)?,
                    "reload_interval_ms" => s.reload_interval_ms = parse_interval(value)?,
                    "settle_ms" => s.settle_ms = parse_int(value)?,
                    _ => {}
                }
            }
            Section::Clock => {
                let c = &mut config.clock;
                match key {
                    "ntp_server" => {
                        c.ntp_server = HString::try_from(parse_string(value))
                            .map_err(|_| ParseError::TooLong)?
                    }
                    "gmt_offset_s" => c.gmt_offset_s = parse_int(value)?,
                    "dst_offset_s" => c.dst_offset_s = parse_int(value)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse TOML configuration into AppConfig
///
/// Keys that are not present keep their default value.
pub fn parse_config(input: &str) -> Result<AppConfig, ParseError> {
    let mut parser = ConfigParser::new();
    for line in input.lines() {
        parser.feed(line)?;
    }
    Ok(parser.finish())
}

/// Parse section header like "metric co2", "metric.co2" or "schedule"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    let (section_type, name) = match header.split_once('.') {
        Some((section_type, name)) => (section_type.trim(), Some(name.trim())),
        None => {
            let mut parts = header.split_whitespace();
            let section_type = parts.next().ok_or(ParseError::InvalidSection)?;
            if parts.clone().count() > 1 {
                return Err(ParseError::InvalidSection);
            }
            (section_type, parts.next())
        }
    };

    match (section_type, name) {
        ("metric", Some("co2")) => Ok(Section::Metric(Metric::Co2)),
        ("metric", Some("cost")) => Ok(Section::Metric(Metric::Cost)),
        ("schedule", None) => Ok(Section::Schedule),
        ("clock", None) => Ok(Section::Clock),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse a key = value line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Strip quotes from a string value
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Task period, must be non-zero
fn parse_interval(value: &str) -> Result<u32, ParseError> {
    match parse_int(value)? {
        0 => Err(ParseError::InvalidValue),
        ms => Ok(ms),
    }
}

fn parse_lookup(value: &str) -> Result<LookupMode, ParseError> {
    match parse_string(value) {
        "skip_first" => Ok(LookupMode::SkipFirst),
        "first_future" => Ok(LookupMode::FirstFuture),
        _ => Err(ParseError::InvalidValue),
    }
}
