//! Configuration loading and parsing
//!
//! Loads configuration from the device file system or embedded defaults.
//! Uses TOML format parsed by a custom no_std parser.

pub mod loader;
pub mod toml;

pub use loader::{ConfigError, ConfigLoader, ConfigOrigin, CONFIG_PATH, EMBEDDED_CONFIG};
pub use toml::{parse_config, ConfigParser, ParseError};
