//! Configuration file management
//!
//! This module handles loading and saving the application configuration file,
//! which says where the shared-preferences snapshot lives and how the host
//! platform delivers alarms.

use crate::constants::{DEBOUNCE_DEFAULT_MS, DEBOUNCE_MAX_MS, DEBOUNCE_MIN_MS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_exact_alarms() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    DEBOUNCE_DEFAULT_MS
}

fn default_notification_timeout_ms() -> u32 {
    10_000
}

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// JSON snapshot of the app's shared preferences
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
    /// Whether the platform permits exact alarms (default: true)
    #[serde(default = "default_exact_alarms")]
    pub exact_alarms: bool,
    /// Trigger coalescing window in milliseconds (default: 2000)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Widget text locale ("tr", "en", "ar"); the app's setting when absent
    #[serde(default)]
    pub locale: Option<String>,
    /// Desktop notification display time in milliseconds
    #[serde(default = "default_notification_timeout_ms")]
    pub notification_timeout_ms: u32,
    /// Widget instances the host shows
    #[serde(default)]
    pub widget_ids: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefs_path: None,
            exact_alarms: default_exact_alarms(),
            debounce_ms: default_debounce_ms(),
            locale: None,
            notification_timeout_ms: default_notification_timeout_ms(),
            widget_ids: Vec::new(),
        }
    }
}

impl Config {
    /// Get the standard config file path
    ///
    /// - macOS: `~/Library/Application Support/namazvakti/config.toml`
    /// - Linux: `~/.config/namazvakti/config.toml`
    /// - Windows: `%APPDATA%\namazvakti\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("namazvakti");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from standard location
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file doesn't exist
    /// - Failed to read file
    /// - TOML parsing fails
    /// - A value is out of range
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from standard location, or defaults when there is none
    pub fn load_or_default() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load config from a specific path
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Configuration file not found at: {}", path.display());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(DEBOUNCE_MIN_MS..=DEBOUNCE_MAX_MS).contains(&self.debounce_ms) {
            anyhow::bail!(
                "debounce_ms must be {}-{}, got {}",
                DEBOUNCE_MIN_MS,
                DEBOUNCE_MAX_MS,
                self.debounce_ms
            );
        }
        if let Some(ref locale) = self.locale {
            if !matches!(locale.as_str(), "tr" | "en" | "ar") {
                anyhow::bail!("locale must be one of tr, en, ar; got '{}'", locale);
            }
        }
        Ok(())
    }

    /// Save config to standard location
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}
