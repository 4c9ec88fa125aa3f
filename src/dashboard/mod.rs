//! Dashboard state and result-cache controller
//!
//! Everything between the user's actions and the simulator: the process
//! table, request assembly, the simulator seam, the per-algorithm result
//! cache, the view state machine, and the comparison snapshot.
//!
//! # Module Structure
//!
//! - `process_set`: editable process rows, PID assignment, forgiving parsing
//! - `request`: validated `SimulationRequest` assembly
//! - `client`: reqwest implementation of [`Simulator`]
//! - `cache`: latest result per algorithm
//! - `view`: `Home` / `Dashboard(algorithm)` / `Comparison` transitions
//! - `comparison`: canonical-order averages across cached algorithms
//! - `controller`: command dispatch and stale-response handling

pub mod cache;
pub mod client;
pub mod comparison;
pub mod controller;
pub mod process_set;
pub mod request;
pub mod view;

use futures::future::BoxFuture;

use crate::error::SimulationError;
use crate::models::SimulationResult;

pub use cache::ResultCache;
pub use client::HttpSimulator;
pub use comparison::{ComparisonEntry, ComparisonSnapshot, Metric};
pub use controller::{
    Applied, Command, DashboardController, DashboardEvent, FieldVisibility, PendingSimulation,
    RenderModel, Status, Ticket,
};
pub use process_set::{ProcessField, ProcessRow, ProcessSet};
pub use request::{GlobalParams, SimulationRequest};
pub use view::View;

/// Trait for the external scheduling simulator
///
/// Exactly one exchange per call. The returned future owns everything it
/// needs so the controller can spawn it and keep handling user actions.
pub trait Simulator: Send + Sync {
    fn simulate(&self, request: SimulationRequest) -> BoxFuture<'static, Result<SimulationResult, SimulationError>>;
}
