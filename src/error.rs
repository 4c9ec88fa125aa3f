//! Unified error type hierarchy for the scheduling dashboard
//!
//! Provides structured error handling with ValidationError, SimulationError,
//! ConfigError, and the DashboardError umbrella used for status display.

use std::io;
use thiserror::Error;

/// User-recoverable input problems. No network call is made when one of these fires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add at least one process")]
    EmptyProcessSet,

    #[error("P{pid}: {label} must be a positive integer")]
    MissingExtraParam { pid: u32, label: String },

    #[error("Comparison needs at least {need} simulated algorithms, have {have}")]
    ComparisonUnavailable { need: usize, have: usize },

    #[error("Select an algorithm before executing")]
    NoDashboard,
}

/// Simulation endpoint failures (network, non-success status, malformed body).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Simulator unreachable: {0}")]
    Transport(String),

    #[error("Simulator returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed simulator response: {0}")]
    MalformedResponse(String),
}

impl SimulationError {
    /// Message shown in the dashboard's failure state.
    ///
    /// Server errors surface the server's own `error` text.
    pub fn user_message(&self) -> String {
        match self {
            SimulationError::Transport(msg) => format!("Simulation Failed: {}", msg),
            SimulationError::Server { message, .. } => format!("Simulation Failed: {}", message),
            SimulationError::MalformedResponse(_) => "Simulation Failed: server error".to_string(),
        }
    }
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Errors that terminate at the controller boundary and become status text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl DashboardError {
    /// Get a user-facing error message suitable for the status badge
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(e) => e.to_string(),
            DashboardError::Simulation(e) => e.user_message(),
        }
    }
}

/// Top-level result type for glue code that mixes error kinds.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_message_reports_count() {
        let err = ValidationError::ComparisonUnavailable { need: 2, have: 1 };
        assert_eq!(
            err.to_string(),
            "Comparison needs at least 2 simulated algorithms, have 1"
        );
    }

    #[test]
    fn test_missing_extra_param_display() {
        let err = ValidationError::MissingExtraParam {
            pid: 3,
            label: "Deadline".to_string(),
        };
        assert_eq!(err.to_string(), "P3: Deadline must be a positive integer");
    }

    #[test]
    fn test_no_dashboard_message() {
        let err: DashboardError = ValidationError::NoDashboard.into();
        assert_eq!(err.user_message(), "Select an algorithm before executing");
    }

    #[test]
    fn test_server_error_propagates_server_text() {
        let err = SimulationError::Server {
            status: 400,
            message: "Simulation Crashed (Code 139)".to_string(),
        };
        assert_eq!(err.user_message(), "Simulation Failed: Simulation Crashed (Code 139)");
        let wrapped: DashboardError = err.into();
        assert!(wrapped.user_message().contains("Code 139"));
    }

    #[test]
    fn test_malformed_response_is_generic() {
        let err = SimulationError::MalformedResponse("expected value at line 1".to_string());
        assert_eq!(err.user_message(), "Simulation Failed: server error");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::FileNotFound("/etc/settings.json".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /etc/settings.json"
        );
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err("test error".into());
        assert!(result.is_err());
    }
}
