//! CPU Scheduling Dashboard Controller
//!
//! This crate is the state owner behind an interactive CPU-scheduling
//! dashboard. It keeps the editable process table, turns it into simulation
//! requests for an external scheduler simulator, caches the latest result per
//! algorithm, and drives the home / dashboard / comparison views. Rendering
//! is left to whatever front end consumes [`dashboard::RenderModel`].
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Algorithm ids, process specs, and decoded simulation results
//! - **profiles**: Static per-algorithm input requirements and display content
//! - **config**: Dashboard settings and settings-file loading
//! - **log_collector**: Decoupled disk/console logging pipeline
//! - **dashboard**: Process set, request assembly, simulator client, result
//!   cache, view state machine, comparison, and the controller itself

// Core foundational modules
pub mod error;
pub mod models;
pub mod profiles;

// Settings and logging
pub mod config;
pub mod log_collector;

// Dashboard state and simulator plumbing
pub mod dashboard;

// Re-export the log crate for macro usage
pub use log;

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{ConfigError, DashboardError, Result, SimulationError, ValidationError};

pub use models::{
    AlgorithmId, Averages, GanttEntry, ProcessMetrics, ProcessSpec, SimulationResult,
    VruntimeSample,
};

pub use profiles::{get_profile, AlgorithmProfile};

pub use config::{DashboardSettings, SettingsManager};

pub use log_collector::{initialize_logging, LogCollector, LogLine};

pub use dashboard::{
    Command, DashboardController, DashboardEvent, HttpSimulator, Simulator, Status, View,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
    }

    #[test]
    fn test_every_algorithm_has_profile() {
        for id in AlgorithmId::ALL {
            assert_eq!(get_profile(id).id, id);
        }
    }
}
