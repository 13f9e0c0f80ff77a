//! Configuration management for the portal.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use crate::rewards::RewardRates;
use crate::schedule::PatternTable;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Contributor payout rates
    #[serde(default)]
    pub rewards: RewardRates,

    /// Consumption rewards and achievement thresholds
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Sign-up age gates
    #[serde(default)]
    pub onboarding: OnboardingConfig,

    /// Weekday sets per release pattern
    #[serde(default)]
    pub schedule: PatternTable,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,

    /// Catalog seed file (relative to data directory or absolute)
    pub catalog: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
            catalog: "catalog.toml".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// Rewards attached to each mastery-gained event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Flat earnings credited per consumption
    pub earning_per_consumption: f64,

    /// Session minutes credited per consumption
    pub minutes_per_consumption: u64,

    /// Total earnings that unlock the "Deep Scholar" achievement
    pub earnings_milestone: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            earning_per_consumption: 5.0,
            minutes_per_consumption: 15,
            earnings_milestone: 50.0,
        }
    }
}

/// Age gates applied at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Youngest age allowed to create an account
    pub min_age: i32,

    /// Age from which adult rating and low censorship apply
    pub adult_age: i32,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            min_age: 3,
            adult_age: 18,
        }
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a non-negative number, got {}", name, value);
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Reject rates and thresholds that would produce negative credits
    pub fn validate(&self) -> Result<()> {
        check_non_negative("rewards.page_rate", self.rewards.page_rate)?;
        check_non_negative("rewards.minute_rate", self.rewards.minute_rate)?;
        check_non_negative(
            "progress.earning_per_consumption",
            self.progress.earning_per_consumption,
        )?;
        check_non_negative("progress.earnings_milestone", self.progress.earnings_milestone)?;

        if self.onboarding.min_age < 0 || self.onboarding.adult_age < self.onboarding.min_age {
            bail!(
                "onboarding ages are inconsistent: min_age={}, adult_age={}",
                self.onboarding.min_age,
                self.onboarding.adult_age
            );
        }

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }

    /// Get the absolute path for the catalog file
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.data.catalog)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.rewards.page_rate, 10.0);
        assert_eq!(config.rewards.minute_rate, 10.0);
        assert_eq!(config.progress.earning_per_consumption, 5.0);
        assert_eq!(config.progress.minutes_per_consumption, 15);
        assert_eq!(config.onboarding.min_age, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.rewards.page_rate = 4.0;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.rewards.page_rate, 4.0);
        assert_eq!(loaded_config.rewards.minute_rate, 10.0);
        assert_eq!(loaded_config.schedule, original_config.schedule);

        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[rewards]
page_rate = 2.5
minute_rate = 12.0

[schedule]
sunday = ["Sat", "Sun"]
"#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.rewards.page_rate, 2.5);
        assert_eq!(config.rewards.minute_rate, 12.0);
        assert_eq!(config.schedule.sunday, vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(config.schedule.mwf, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(config.progress.earnings_milestone, 50.0);

        Ok(())
    }

    #[test]
    fn test_negative_rate_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[rewards]\npage_rate = -1.0\nminute_rate = 10.0\n",
        )?;

        assert!(Config::from_file(&config_path).is_err());
        // Fallback path keeps the defaults
        assert_eq!(Config::load_or_default(&config_path).rewards.page_rate, 10.0);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        assert!(config.catalog_path().ends_with("data/catalog.toml"));
        assert!(config.log_dir().ends_with("data/logs"));
    }
}
