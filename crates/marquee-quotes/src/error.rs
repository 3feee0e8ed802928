//! # Service Error Types
//!
//! Configuration failures. Quote operations themselves report
//! [`marquee_core::CoreError`], so the transport layer only has one
//! taxonomy to map onto responses.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Service Error Sources                            │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌────────────────────────────────┐    │
//! │  │  ConfigError         │        │  CoreError (marquee-core)      │    │
//! │  │                      │        │                                │    │
//! │  │  InvalidConfig       │        │  Validation                    │    │
//! │  │  ConfigLoadFailed    │        │  NotFound                      │    │
//! │  │  ConfigSaveFailed    │        │  Unavailable  ◄── DbError      │    │
//! │  │  NoConfigPath        │        │  ItemUnavailable               │    │
//! │  └──────────────────────┘        └────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value was read but is not acceptable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// No explicit path given and no platform config directory exists.
    #[error("No config path available")]
    NoConfigPath,
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ConfigSaveFailed(err.to_string())
    }
}
