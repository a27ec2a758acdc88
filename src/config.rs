//! Promptor Configuration Module
//!
//! Config is stored in `~/.config/promptor/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. CLI flags (applied by the binary)
//! 2. Environment variables (`PROMPTOR_SCHEMA_DIR`, `PROMPTOR_UNRESOLVED`)
//! 3. Config file
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PromptorError, Result};
use crate::template::UnresolvedPolicy;
use crate::validator::DEFAULT_FALLBACK_COLOR;

pub const ENV_SCHEMA_DIR: &str = "PROMPTOR_SCHEMA_DIR";
pub const ENV_UNRESOLVED: &str = "PROMPTOR_UNRESOLVED";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptorConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `<id>.yaml` schemas
    pub schema_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerateConfig {
    pub unresolved: UnresolvedPolicy,

    /// Seed dropdown defaults before applying the input
    pub apply_defaults: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub fallback_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
        }
    }
}

impl PromptorConfig {
    /// Returns `~/.config/promptor/` on Unix, `%APPDATA%/promptor/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptor")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| PromptorError::ConfigError {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| PromptorError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| PromptorError::ConfigError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| PromptorError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| PromptorError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })?;

        Ok(())
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Merge from any variable source; empty values are ignored
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SCHEMA_DIR).filter(|v| !v.is_empty()) {
            self.store.schema_dir = PathBuf::from(dir);
        }

        if let Some(policy) = lookup(ENV_UNRESOLVED).filter(|v| !v.is_empty()) {
            self.generate.unresolved = policy.parse()?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_contains_promptor() {
        let path = PromptorConfig::config_path();
        assert!(path.to_string_lossy().contains("promptor"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = PromptorConfig::default();
        assert_eq!(config.store.schema_dir, PathBuf::from("schemas"));
        assert_eq!(config.generate.unresolved, UnresolvedPolicy::Keep);
        assert!(!config.generate.apply_defaults);
        assert_eq!(config.style.fallback_color, "bg");
    }

    #[test]
    fn test_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = PromptorConfig::load_from(&tmp.path().join("none.toml")).unwrap();
        assert_eq!(config, PromptorConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[generate]\nunresolved = \"blank\"\n").unwrap();

        let config = PromptorConfig::load_from(&path).unwrap();
        assert_eq!(config.generate.unresolved, UnresolvedPolicy::Blank);
        assert_eq!(config.store.schema_dir, PathBuf::from("schemas"));
        assert_eq!(config.style.fallback_color, "bg");
    }

    #[test]
    fn test_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[generate\nunresolved = ").unwrap();

        let err = PromptorConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, PromptorError::ConfigError { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = PromptorConfig::default();
        config.store.schema_dir = PathBuf::from("/srv/uis");
        config.generate.apply_defaults = true;
        config.save_to(&path).unwrap();

        assert_eq!(PromptorConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_vars_override_file() {
        let vars: HashMap<&str, &str> = [(ENV_SCHEMA_DIR, "/tmp/x"), (ENV_UNRESOLVED, "error")]
            .into_iter()
            .collect();
        let config = PromptorConfig::default()
            .with_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.store.schema_dir, PathBuf::from("/tmp/x"));
        assert_eq!(config.generate.unresolved, UnresolvedPolicy::Error);
    }

    #[test]
    fn test_empty_vars_ignored() {
        let config = PromptorConfig::default()
            .with_vars(|_| Some(String::new()))
            .unwrap();
        assert_eq!(config, PromptorConfig::default());
    }

    #[test]
    fn test_bad_policy_var() {
        let result = PromptorConfig::default().with_vars(|k| {
            (k == ENV_UNRESOLVED).then(|| "sometimes".to_string())
        });
        assert!(matches!(result, Err(PromptorError::ConfigError { .. })));
    }
}
