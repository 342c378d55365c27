//! Configuration for processes hosting the sharing domain.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/sharing/config.toml`
//! 3. Project config: `.sharing/config.toml`
//! 4. Environment variables: `SHARING_*`
//!
//! Only keys present in a file override lower layers. Unknown keys are
//! rejected so typos do not pass silently.

#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings read by the domain's hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Days between archiving a conversation and its deletion
    pub conversation_retention_days: u32,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            conversation_retention_days: 180,
            log_level: "info".to_string(),
        }
    }
}

/// A config file layer; absent keys leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialDomainConfig {
    pub conversation_retention_days: Option<u32>,
    pub log_level: Option<String>,
}

impl DomainConfig {
    #[must_use]
    pub fn merge(self, layer: PartialDomainConfig) -> Self {
        Self {
            conversation_retention_days: layer
                .conversation_retention_days
                .unwrap_or(self.conversation_retention_days),
            log_level: layer.log_level.unwrap_or(self.log_level),
        }
    }

    /// Apply `SHARING_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a variable does not parse.
    pub fn apply_env_vars(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var("SHARING_CONVERSATION_RETENTION_DAYS") {
            self.conversation_retention_days = value.parse().map_err(|e| {
                ConfigError::Invalid(format!(
                    "Invalid SHARING_CONVERSATION_RETENTION_DAYS value: {e}"
                ))
            })?;
        }

        if let Ok(value) = std::env::var("SHARING_LOG_LEVEL") {
            self.log_level = value;
        }

        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3650).contains(&self.conversation_retention_days) {
            return Err(ConfigError::Invalid(format!(
                "conversation_retention_days must be between 1 and 3650, got {}",
                self.conversation_retention_days
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }

        Ok(())
    }

    /// Retention window for `Conversation::schedule_for_deletion_with`.
    #[must_use]
    pub fn conversation_retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.conversation_retention_days))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from every source.
///
/// # Errors
///
/// Returns an error for malformed files, bad env values, or values that
/// fail validation. Missing files are skipped.
pub async fn load_config() -> Result<DomainConfig, ConfigError> {
    let project = std::env::current_dir()
        .map(|dir| dir.join(".sharing/config.toml"))
        .ok();
    load_config_from(global_config_path().as_deref(), project.as_deref()).await
}

/// Load configuration with explicit file locations.
///
/// # Errors
///
/// Same as [`load_config`].
pub async fn load_config_from(
    global: Option<&Path>,
    project: Option<&Path>,
) -> Result<DomainConfig, ConfigError> {
    let mut config = DomainConfig::default();

    for path in [global, project].into_iter().flatten() {
        if let Some(layer) = load_layer(path).await? {
            tracing::debug!(path = %path.display(), "loaded config layer");
            config = config.merge(layer);
        }
    }

    let config = config.apply_env_vars()?;
    config.validate()?;
    Ok(config)
}

#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sharing")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Read one layer; `None` when the file does not exist.
async fn load_layer(path: &Path) -> Result<Option<PartialDomainConfig>, ConfigError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Io(format!(
                "Failed to read config file metadata {}: {e}",
                path.display()
            )))
        }
    };

    if metadata.is_dir() {
        return Err(ConfigError::Io(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid(format!(
            "Config file {} exceeds maximum size of {MAX_CONFIG_FILE_SIZE} bytes",
            path.display()
        )));
    }

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        ConfigError::Io(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::Parse(format!("Failed to parse config {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DomainConfig::default();
        assert_eq!(config.conversation_retention_days, 180);
        assert!(config.validate().is_ok());
        assert_eq!(config.conversation_retention(), chrono::Duration::days(180));
    }

    #[test]
    fn test_merge_only_overrides_present_keys() {
        let merged = DomainConfig::default().merge(PartialDomainConfig {
            conversation_retention_days: Some(30),
            log_level: None,
        });
        assert_eq!(merged.conversation_retention_days, 30);
        assert_eq!(merged.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let config = DomainConfig {
            conversation_retention_days: 0,
            ..DomainConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let config = DomainConfig {
            log_level: "loud".to_string(),
            ..DomainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let parsed: Result<PartialDomainConfig, _> = toml::from_str("retention = 3");
        assert!(parsed.is_err());
    }
}
