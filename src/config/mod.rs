//! Configuration module for the scheduling dashboard.
//!
//! # Module Structure
//!
//! - `loader`: Handles loading settings from files and serialization formats
//!
//! # Settings Management
//!
//! `SettingsManager` loads `DashboardSettings` from
//! `~/.config/sched-dashboard/settings.json`. A missing or unreadable file is
//! not an error: the dashboard starts on defaults and logs a warning.

pub mod loader;

use crate::error::ConfigError;
use log::LevelFilter;

/// Log levels accepted in `log_level`
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Runtime settings for the dashboard controller
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    // Simulator endpoint
    pub server_url: String,
    pub simulate_path: String,
    pub request_timeout_secs: u64,

    /// Round Robin quantum used when the field is blank or invalid
    pub default_time_quantum: u32,

    // Logging
    pub log_level: String,
    pub log_dir: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            server_url: "http://localhost:5000".to_string(),
            simulate_path: "/api/simulate".to_string(),
            request_timeout_secs: 10,
            default_time_quantum: 2,
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
        }
    }
}

impl DashboardSettings {
    /// Full URL of the simulate endpoint.
    pub fn simulate_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.simulate_path)
    }

    /// `log_level` as a filter; unknown names fall back to `Info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "server_url cannot be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "server_url must use http or https, got '{}'",
                url
            )));
        }
        if !self.simulate_path.starts_with('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "simulate_path must start with '/', got '{}'",
                self.simulate_path
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.default_time_quantum == 0 {
            return Err(ConfigError::ValidationFailed(
                "default_time_quantum must be greater than 0".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Unknown log_level '{}' (expected one of: {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Loads and persists `DashboardSettings` at the global settings path
pub struct SettingsManager;

impl SettingsManager {
    /// Load settings from the global path, or return defaults.
    ///
    /// A file that fails to parse or validate is reported with a warning and
    /// replaced by defaults instead of failing startup.
    pub fn load() -> DashboardSettings {
        let path = match loader::get_global_settings_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("[Config] {}; using default settings", e);
                return DashboardSettings::default();
            }
        };

        if !path.exists() {
            log::debug!("[Config] No settings at {}; using defaults", path.display());
            return DashboardSettings::default();
        }

        match loader::load_settings_from_file(&path) {
            Ok(settings) => {
                log::info!("[Config] Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!(
                    "[Config] Failed to load {}, falling back to defaults: {}",
                    path.display(),
                    e
                );
                DashboardSettings::default()
            }
        }
    }

    /// Save settings to the global path.
    pub fn save(settings: &DashboardSettings) -> Result<(), ConfigError> {
        loader::ensure_settings_dir_exists()?;
        let path = loader::get_global_settings_path()?;
        loader::save_settings_to_file(settings, &path)
    }
}
