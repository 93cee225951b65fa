//! Configuration loading
//!
//! Reads `qems.toml` from the device file system. Falls back to the
//! configuration embedded at build time, and to the compiled-in defaults if
//! even that does not parse.

use qems_core::config::AppConfig;
use qems_core::traits::{LineBuffer, LineReader, LineSource, SourceError};

use super::toml::{parse_config, ConfigParser, ParseError};

/// Path of the configuration file on the device file system
pub const CONFIG_PATH: &str = "/qems.toml";

/// Configuration embedded at build time (validated by build.rs)
pub const EMBEDDED_CONFIG: &str = include_str!("../../qems.toml");

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// File system operation failed
    Source(SourceError),
    /// TOML parsing failed
    Parse(ParseError),
}

impl From<SourceError> for ConfigError {
    fn from(e: SourceError) -> Self {
        ConfigError::Source(e)
    }
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigOrigin {
    /// `qems.toml` on the file system
    File,
    /// Configuration embedded in the firmware image
    Embedded,
    /// Compiled-in defaults
    Default,
}

/// Configuration loader
pub struct ConfigLoader<S> {
    source: S,
}

impl<S: LineSource> ConfigLoader<S> {
    /// Create a config loader over the device file system
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load the configuration, never failing
    pub fn load(&self) -> (AppConfig, ConfigOrigin) {
        info!("Loading configuration...");

        match self.load_file() {
            Ok(config) => {
                info!("Loaded configuration from {}", CONFIG_PATH);
                log_config_summary(&config);
                return (config, ConfigOrigin::File);
            }
            Err(ConfigError::Source(SourceError::NotFound)) => {
                debug!("No {} found, using embedded config", CONFIG_PATH);
            }
            Err(e) => {
                warn!("Failed to load {}: {:?}, using embedded config", CONFIG_PATH, e);
            }
        }

        match parse_config(EMBEDDED_CONFIG) {
            Ok(config) => {
                log_config_summary(&config);
                (config, ConfigOrigin::Embedded)
            }
            Err(e) => {
                warn!("Embedded config invalid: {:?}, using defaults", e);
                (AppConfig::default(), ConfigOrigin::Default)
            }
        }
    }

    /// Load the configuration file
    pub fn load_file(&self) -> Result<AppConfig, ConfigError> {
        let mut reader = self.source.open(CONFIG_PATH)?;
        let mut parser = ConfigParser::new();
        let mut line = LineBuffer::new();

        while reader.read_line(&mut line)? {
            parser.feed(&line)?;
        }

        Ok(parser.finish())
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &AppConfig) {
    info!("Configuration loaded successfully");
    debug!("  co2 schedule: {}", config.co2.source.as_str());
    debug!("  cost schedule: {}", config.cost.source.as_str());
    debug!(
        "  render every {} ms, reload check every {} ms",
        config.schedule.render_interval_ms,
        config.schedule.reload_interval_ms
    );
}
