//! Settings file loader and serialization.

use super::DashboardSettings;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".config/sched-dashboard";

/// Serialization format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

/// Get the global settings path: ~/.config/sched-dashboard/settings.json
pub fn get_global_settings_path() -> Result<PathBuf, ConfigError> {
    Ok(settings_dir()?.join("settings.json"))
}

/// Ensure the global settings directory exists
pub fn ensure_settings_dir_exists() -> Result<(), ConfigError> {
    fs::create_dir_all(settings_dir()?).map_err(ConfigError::IoError)?;
    Ok(())
}

fn settings_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::ValidationFailed("Cannot determine home directory".to_string())
    })?;
    Ok(home.join(SETTINGS_DIR))
}

/// Load and validate settings from a .json or .toml file.
pub fn load_settings_from_file(path: &Path) -> Result<DashboardSettings, ConfigError> {
    let format = validate_config_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Settings file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let settings: DashboardSettings = match format {
        SettingsFormat::Json => serde_json::from_str(&content)?,
        SettingsFormat::Toml => toml::from_str(&content)?,
    };

    settings.validate()?;
    Ok(settings)
}

/// Save settings in the format implied by the file extension.
pub fn save_settings_to_file(settings: &DashboardSettings, path: &Path) -> Result<(), ConfigError> {
    let format = validate_config_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }
    }

    let content = match format {
        SettingsFormat::Json => serde_json::to_string_pretty(settings)?,
        SettingsFormat::Toml => toml::to_string_pretty(settings)?,
    };

    fs::write(path, content).map_err(ConfigError::IoError)?;
    Ok(())
}

/// Validate a settings path (.json or .toml extension required).
pub fn validate_config_path(path: &Path) -> Result<SettingsFormat, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Settings path cannot be empty".to_string(),
        ));
    }

    if path.to_str().is_none() {
        return Err(ConfigError::ValidationFailed(
            "Settings path contains invalid characters".to_string(),
        ));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(SettingsFormat::Json),
        Some("toml") => Ok(SettingsFormat::Toml),
        Some(ext) => Err(ConfigError::ValidationFailed(format!(
            "Settings file must have .json or .toml extension, got .{}",
            ext
        ))),
        None => Err(ConfigError::ValidationFailed(
            "Settings file must have .json or .toml extension".to_string(),
        )),
    }
}
