//! # Quote Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARQUEE_DB_PATH=/var/lib/marquee/marquee.db                        │
//! │     MARQUEE_APPROVAL_POLICY=idempotent                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/marquee/quotes.toml (Linux)                              │
//! │     ~/Library/Application Support/za.marquee.marquee/quotes.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./marquee.db, prefix "QT", permissive approvals                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # quotes.toml
//! [database]
//! path = "./marquee.db"
//! max_connections = 5
//! run_migrations = true
//!
//! [quotes]
//! reference_prefix = "QT"
//! approval_policy = "permissive"  # permissive | idempotent
//!
//! [logging]
//! filter = "info,marquee=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use marquee_core::{ApprovalPolicy, DEFAULT_REFERENCE_PREFIX};
use marquee_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::telemetry::DEFAULT_LOG_FILTER;

/// Longest accepted reference prefix.
pub const MAX_PREFIX_LEN: usize = 8;

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. `:memory:` opens a private in-memory database.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply embedded migrations on startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./marquee.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Quote Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSettings {
    /// Leading segment of every quote reference (`QT-261019-0001A3F9`).
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// How repeat approvals of one quote are booked.
    #[serde(default)]
    pub approval_policy: ApprovalPolicy,
}

fn default_reference_prefix() -> String {
    DEFAULT_REFERENCE_PREFIX.to_string()
}

impl Default for QuoteSettings {
    fn default() -> Self {
        QuoteSettings {
            reference_prefix: default_reference_prefix(),
            approval_policy: ApprovalPolicy::default(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` still wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration for the quote services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotesConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub quotes: QuoteSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl QuotesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`quotes.toml`), when it exists
    /// 3. Environment variables
    ///
    /// The result is validated before it is returned.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading quotes config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load quotes config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses one TOML file without applying environment overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Quotes config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        let prefix = self.quotes.reference_prefix.trim();
        if prefix.is_empty()
            || prefix.len() > MAX_PREFIX_LEN
            || !prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::InvalidConfig(format!(
                "quotes.reference_prefix must be 1-{} ASCII letters or digits, got: {:?}",
                MAX_PREFIX_LEN, self.quotes.reference_prefix
            )));
        }

        Ok(())
    }

    /// Applies `MARQUEE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Unparseable numeric or policy values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MARQUEE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("MARQUEE_MAX_CONNECTIONS") {
            match max.trim().parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid MARQUEE_MAX_CONNECTIONS"),
            }
        }

        if let Some(prefix) = lookup("MARQUEE_REFERENCE_PREFIX") {
            debug!(prefix = %prefix, "Overriding reference prefix from environment");
            self.quotes.reference_prefix = prefix;
        }

        if let Some(policy) = lookup("MARQUEE_APPROVAL_POLICY") {
            match policy.parse::<ApprovalPolicy>() {
                Ok(parsed) => {
                    debug!(policy = %parsed, "Overriding approval policy from environment");
                    self.quotes.approval_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring invalid MARQUEE_APPROVAL_POLICY"),
            }
        }

        if let Some(filter) = lookup("MARQUEE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("za", "marquee", "marquee")
            .map(|dirs| dirs.config_dir().join("quotes.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Database settings as a pool configuration.
    pub fn to_db_config(&self) -> DbConfig {
        let base = if self.database.path == Path::new(":memory:") {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
        };

        base.run_migrations(self.database.run_migrations)
    }

    pub fn reference_prefix(&self) -> String {
        self.quotes.reference_prefix.trim().to_uppercase()
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        self.quotes.approval_policy
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = QuotesConfig::default();
        assert_eq!(config.database.path, PathBuf::from("./marquee.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.quotes.reference_prefix, "QT");
        assert_eq!(config.approval_policy(), ApprovalPolicy::Permissive);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = QuotesConfig::from_toml(
            r#"
            [quotes]
            approval_policy = "idempotent"
            reference_prefix = "MQ"
            "#,
        )
        .unwrap();

        assert_eq!(config.approval_policy(), ApprovalPolicy::Idempotent);
        assert_eq!(config.reference_prefix(), "MQ");
        assert_eq!(config.database, DatabaseSettings::default());
    }

    #[test]
    fn test_unknown_policy_fails_to_parse() {
        let err = QuotesConfig::from_toml("[quotes]\napproval_policy = \"strict\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigLoadFailed(_)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = QuotesConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());
        config.database.max_connections = 1;

        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
        config.database.path = PathBuf::from("quotes.db");

        for bad in ["", "QT-", "TOOLONGPREFIX", "Q T"] {
            config.quotes.reference_prefix = bad.to_string();
            assert!(config.validate().is_err(), "prefix {:?} should fail", bad);
        }

        config.quotes.reference_prefix = "mr2".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_prefix(), "MR2");
    }

    #[test]
    fn test_overrides() {
        let mut config = QuotesConfig::default();
        config.apply_overrides(lookup(&[
            ("MARQUEE_DB_PATH", "/tmp/marquee.db"),
            ("MARQUEE_MAX_CONNECTIONS", "9"),
            ("MARQUEE_REFERENCE_PREFIX", "EV"),
            ("MARQUEE_APPROVAL_POLICY", "Idempotent"),
            ("MARQUEE_LOG", "debug"),
        ]));

        assert_eq!(config.database.path, PathBuf::from("/tmp/marquee.db"));
        assert_eq!(config.database.max_connections, 9);
        assert_eq!(config.quotes.reference_prefix, "EV");
        assert_eq!(config.approval_policy(), ApprovalPolicy::Idempotent);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = QuotesConfig::default();
        config.apply_overrides(lookup(&[
            ("MARQUEE_MAX_CONNECTIONS", "lots"),
            ("MARQUEE_APPROVAL_POLICY", "whatever"),
        ]));

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.approval_policy(), ApprovalPolicy::Permissive);
    }

    #[test]
    fn test_memory_path_maps_to_in_memory_db() {
        let mut config = QuotesConfig::default();
        config.database.path = PathBuf::from(":memory:");
        assert!(config.to_db_config().is_in_memory());

        config.database.path = PathBuf::from("./marquee.db");
        assert!(!config.to_db_config().is_in_memory());
    }

    #[test]
    fn test_toml_serialization() {
        let config = QuotesConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[quotes]"));
        assert!(toml_str.contains("approval_policy = \"permissive\""));

        let back = QuotesConfig::from_toml(&toml_str).unwrap();
        assert_eq!(back, config);
    }
}
