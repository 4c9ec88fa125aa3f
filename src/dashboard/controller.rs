//! DashboardController: central state owner for the scheduling dashboard
//!
//! User actions arrive as [`Command`]s; simulator replies arrive as
//! [`DashboardEvent`]s on an mpsc channel. All state is touched from the
//! caller's thread between those two entry points, so no locks are needed.
//!
//! Every execute action is tagged with a per-algorithm sequence number. A
//! reply is applied only if its number is still the latest issued for that
//! algorithm; older replies are dropped silently.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;

use super::cache::ResultCache;
use super::comparison::{self, ComparisonSnapshot};
use super::process_set::{ProcessField, ProcessSet};
use super::request::{self, GlobalParams, SimulationRequest};
use super::view::{View, ViewController};
use super::{HttpSimulator, Simulator};
use crate::config::DashboardSettings;
use crate::error::{DashboardError, SimulationError, ValidationError};
use crate::models::{AlgorithmId, SimulationResult};
use crate::profiles::{get_profile, AlgorithmProfile, FieldLabel};
use crate::{log_info, log_parsed};

/// Closed set of user actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    AddRow,
    RemoveRow(u32),
    EditField {
        pid: u32,
        field: ProcessField,
        value: String,
    },
    SetTimeQuantum(String),
    SelectAlgorithm(AlgorithmId),
    Execute,
    OpenComparison,
    CloseComparison,
}

/// Discrete events delivered back to the controller from background tasks
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    SimulationFinished {
        ticket: Ticket,
        outcome: Result<SimulationResult, SimulationError>,
    },
}

/// Identity of one execute action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub algorithm: AlgorithmId,
    pub seq: u64,
}

/// A request that has been issued but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingSimulation {
    pub ticket: Ticket,
    pub request: SimulationRequest,
}

/// What happened to a simulator reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Cached as the algorithm's latest result.
    Stored,
    /// Reported as a failure; cache untouched.
    Failed,
    /// A newer request for the same algorithm exists; reply ignored.
    Stale,
}

/// Status badge state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Completed,
    Restored,
    NoData,
    Failed(String),
    Invalid(String),
}

impl Status {
    /// Text shown on the badge.
    pub fn message(&self) -> String {
        match self {
            Status::Ready => "System Ready".to_string(),
            Status::Running => "Simulating...".to_string(),
            Status::Completed => "Simulation Completed".to_string(),
            Status::Restored => "Restored previous results".to_string(),
            Status::NoData => "No simulation data available".to_string(),
            Status::Failed(msg) | Status::Invalid(msg) => msg.clone(),
        }
    }

    /// Badge style class: "ready", "running", or "error".
    pub fn badge(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Failed(_) | Status::Invalid(_) => "error",
            _ => "ready",
        }
    }

    pub fn is_error(&self) -> bool {
        self.badge() == "error"
    }
}

/// Which input columns the dashboard shows for the active algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldVisibility {
    pub priority_label: FieldLabel,
    pub priority_placeholder: &'static str,
    pub priority_max: Option<u32>,
    pub show_extra: bool,
    pub extra_label: FieldLabel,
    pub show_time_quantum: bool,
}

impl FieldVisibility {
    pub fn for_profile(profile: &AlgorithmProfile) -> Self {
        FieldVisibility {
            priority_label: profile.priority_label(),
            priority_placeholder: profile.priority_kind.placeholder(),
            priority_max: profile.priority_kind.max_value(),
            show_extra: profile.needs_extra_field,
            extra_label: profile.extra_field_label,
            show_time_quantum: profile.needs_global_time_quantum,
        }
    }
}

/// Everything a renderer needs for the current state.
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub view: View,
    pub profile: &'static AlgorithmProfile,
    pub fields: FieldVisibility,
    pub result: Option<Arc<SimulationResult>>,
    pub comparison: Option<ComparisonSnapshot>,
    pub status: Status,
}

/// Central state manager for the dashboard
pub struct DashboardController {
    processes: ProcessSet,
    views: ViewController,
    cache: ResultCache,
    params: GlobalParams,
    status: Status,
    /// Latest sequence number issued per algorithm
    latest_seq: HashMap<AlgorithmId, u64>,
    /// Tickets whose replies have not arrived yet
    outstanding: HashSet<Ticket>,
    simulator: Arc<dyn Simulator>,
    event_tx: mpsc::Sender<DashboardEvent>,
}

impl DashboardController {
    /// Create a controller with the three default rows, on the home view.
    pub fn new(
        simulator: Arc<dyn Simulator>,
        event_tx: mpsc::Sender<DashboardEvent>,
        settings: &DashboardSettings,
    ) -> Self {
        let views = ViewController::new();
        let processes = ProcessSet::seeded(get_profile(views.active_algorithm()));
        log_info!(
            "[Controller] Initialized with {} default processes, simulator quantum default {}",
            processes.len(),
            settings.default_time_quantum
        );
        DashboardController {
            processes,
            views,
            cache: ResultCache::new(),
            params: GlobalParams {
                time_quantum: String::new(),
                default_time_quantum: settings.default_time_quantum,
            },
            status: Status::Ready,
            latest_seq: HashMap::new(),
            outstanding: HashSet::new(),
            simulator,
            event_tx,
        }
    }

    /// Production constructor: reqwest simulator pointed at the configured endpoint.
    pub fn from_settings(
        settings: &DashboardSettings,
        event_tx: mpsc::Sender<DashboardEvent>,
    ) -> Result<Self, SimulationError> {
        let simulator = HttpSimulator::new(settings)?;
        log_info!("[Controller] Using simulator at {}", simulator.endpoint());
        Ok(Self::new(Arc::new(simulator), event_tx, settings))
    }

    // ------------------------------------------------------------------
    // Command dispatch
    // ------------------------------------------------------------------

    /// Apply one user action. Returns the resulting status.
    pub fn dispatch(&mut self, command: Command) -> &Status {
        log::debug!("[Controller] Command: {:?}", command);
        match command {
            Command::Start => self.start(),
            Command::AddRow => {
                self.add_row();
            }
            Command::RemoveRow(pid) => {
                self.remove_row(pid);
            }
            Command::EditField { pid, field, value } => {
                self.edit_field(pid, field, value);
            }
            Command::SetTimeQuantum(value) => self.set_time_quantum(value),
            Command::SelectAlgorithm(algorithm) => self.select_algorithm(algorithm),
            Command::Execute => {
                self.execute();
            }
            Command::OpenComparison => {
                self.open_comparison();
            }
            Command::CloseComparison => self.close_comparison(),
        }
        &self.status
    }

    pub fn start(&mut self) {
        let algorithm = self.views.start();
        self.enter_dashboard(algorithm);
    }

    pub fn add_row(&mut self) -> u32 {
        let pid = self.processes.add_row(self.active_profile());
        log::debug!("[Controller] Added P{} ({} rows)", pid, self.processes.len());
        pid
    }

    pub fn remove_row(&mut self, pid: u32) -> bool {
        let removed = self.processes.remove_row(pid);
        if !removed {
            log::warn!("[Controller] Remove ignored: no row with PID {}", pid);
        }
        removed
    }

    pub fn edit_field(&mut self, pid: u32, field: ProcessField, value: impl Into<String>) -> bool {
        let edited = self.processes.set_field(pid, field, value);
        if !edited {
            log::warn!("[Controller] Edit ignored: no row with PID {}", pid);
        }
        edited
    }

    pub fn set_time_quantum(&mut self, value: impl Into<String>) {
        self.params.time_quantum = value.into();
    }

    /// Switch to `algorithm`'s dashboard, restoring its cached result if any.
    pub fn select_algorithm(&mut self, algorithm: AlgorithmId) {
        let previous = self.views.select(algorithm);
        log_info!("[Controller] View {} -> dashboard({})", previous.as_str(), algorithm);
        self.enter_dashboard(algorithm);
    }

    fn enter_dashboard(&mut self, algorithm: AlgorithmId) {
        self.processes.apply_profile(get_profile(algorithm));
        let status = if self.is_running(algorithm) {
            Status::Running
        } else if self.cache.contains(algorithm) {
            Status::Restored
        } else {
            Status::NoData
        };
        self.set_status(status);
    }

    /// Enter the comparison view. Returns false (and sets an error status) when refused.
    pub fn open_comparison(&mut self) -> bool {
        match self.views.open_comparison(&self.cache) {
            Ok(()) => {
                log_info!("[Controller] Comparing {} algorithms", self.cache.len());
                self.set_status(Status::Ready);
                true
            }
            Err(e) => {
                self.report(e.into());
                false
            }
        }
    }

    /// Return to the last dashboard. Outside the comparison view this is a no-op.
    pub fn close_comparison(&mut self) {
        if self.views.view() != View::Comparison {
            log::debug!("[Controller] Close comparison ignored in {} view", self.views.view().as_str());
            return;
        }
        let algorithm = self.views.close_comparison();
        self.enter_dashboard(algorithm);
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Validate the current table and issue a new ticket for the shown algorithm.
    ///
    /// Refused outside a dashboard view, leaving the status as it was. On
    /// validation failure the status shows the problem. Either way nothing
    /// is issued.
    pub fn begin_execute(&mut self) -> Result<PendingSimulation, ValidationError> {
        let algorithm = match self.views.view() {
            View::Dashboard(algorithm) => algorithm,
            view => {
                log::warn!("[Controller] Execute ignored in {} view", view.as_str());
                return Err(ValidationError::NoDashboard);
            }
        };
        let specs = self.processes.snapshot(get_profile(algorithm));
        let request = match request::build(&specs, algorithm, &self.params) {
            Ok(request) => request,
            Err(e) => {
                self.report(e.clone().into());
                return Err(e);
            }
        };

        let seq = self.latest_seq.entry(algorithm).or_insert(0);
        *seq += 1;
        let ticket = Ticket {
            algorithm,
            seq: *seq,
        };
        self.outstanding.insert(ticket);
        self.set_status(Status::Running);
        log_info!(
            "[Controller] Issued {}#{} with {} processes",
            algorithm,
            ticket.seq,
            request.processes().len()
        );
        Ok(PendingSimulation { ticket, request })
    }

    /// Apply a simulator reply for `ticket`.
    pub fn finish_execute(
        &mut self,
        ticket: Ticket,
        outcome: Result<SimulationResult, SimulationError>,
    ) -> Applied {
        self.outstanding.remove(&ticket);

        if self.latest_seq.get(&ticket.algorithm) != Some(&ticket.seq) {
            log::debug!(
                "[Controller] Dropping stale reply {}#{}",
                ticket.algorithm,
                ticket.seq
            );
            return Applied::Stale;
        }

        let on_screen = self.views.view() == View::Dashboard(ticket.algorithm);
        match outcome {
            Ok(result) => {
                log_info!(
                    "[Controller] {}#{} completed: avg wait {:.2}",
                    ticket.algorithm,
                    ticket.seq,
                    result.averages.avg_wait
                );
                self.cache.put(ticket.algorithm, result);
                if on_screen {
                    self.set_status(Status::Completed);
                }
                Applied::Stored
            }
            Err(e) => {
                log::warn!("[Controller] {}#{} failed: {}", ticket.algorithm, ticket.seq, e);
                if on_screen {
                    self.report(e.into());
                }
                Applied::Failed
            }
        }
    }

    /// Start a simulation in the background.
    ///
    /// The reply comes back as a [`DashboardEvent`] on the controller's
    /// channel; feed it to [`handle_event`](Self::handle_event). Must be called
    /// inside a tokio runtime.
    pub fn execute(&mut self) -> Option<Ticket> {
        let pending = self.begin_execute().ok()?;
        let ticket = pending.ticket;
        let future = self.simulator.simulate(pending.request);
        let event_tx = self.event_tx.clone();

        // Every issued ticket gets exactly one event, even if the simulator panics.
        tokio::spawn(async move {
            let outcome = unwind_to_error(ticket, future).await;
            if event_tx
                .send(DashboardEvent::SimulationFinished { ticket, outcome })
                .await
                .is_err()
            {
                log::warn!("[Controller] Event channel closed; reply for {}#{} lost", ticket.algorithm, ticket.seq);
            }
        });
        Some(ticket)
    }

    /// Process an event from a background simulation.
    pub fn handle_event(&mut self, event: DashboardEvent) -> Applied {
        match event {
            DashboardEvent::SimulationFinished { ticket, outcome } => self.finish_execute(ticket, outcome),
        }
    }

    /// Run one simulation and wait for it.
    ///
    /// Returns `None` when the request was refused.
    pub async fn execute_now(&mut self) -> Option<Applied> {
        let pending = self.begin_execute().ok()?;
        let future = self.simulator.simulate(pending.request);
        let outcome = unwind_to_error(pending.ticket, future).await;
        Some(self.finish_execute(pending.ticket, outcome))
    }

    fn is_running(&self, algorithm: AlgorithmId) -> bool {
        self.latest_seq
            .get(&algorithm)
            .map_or(false, |seq| self.outstanding.contains(&Ticket { algorithm, seq: *seq }))
    }

    // ------------------------------------------------------------------
    // Status and render data
    // ------------------------------------------------------------------

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            log_parsed!("[Status] {}", status.message());
        }
        self.status = status;
    }

    fn report(&mut self, error: DashboardError) {
        let message = error.user_message();
        let status = match error {
            DashboardError::Validation(_) => Status::Invalid(message),
            DashboardError::Simulation(_) => Status::Failed(message),
        };
        self.set_status(status);
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn view(&self) -> View {
        self.views.view()
    }

    pub fn active_algorithm(&self) -> AlgorithmId {
        self.views.active_algorithm()
    }

    pub fn active_profile(&self) -> &'static AlgorithmProfile {
        get_profile(self.views.active_algorithm())
    }

    pub fn fields(&self) -> FieldVisibility {
        FieldVisibility::for_profile(self.active_profile())
    }

    pub fn processes(&self) -> &ProcessSet {
        &self.processes
    }

    pub fn params(&self) -> &GlobalParams {
        &self.params
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Result shown on the dashboard, or `None` for the "no data" placeholder.
    pub fn current_result(&self) -> Option<Arc<SimulationResult>> {
        match self.views.view() {
            View::Dashboard(algorithm) => self.cache.get(algorithm),
            _ => None,
        }
    }

    /// Comparison snapshot while the comparison view is open.
    pub fn comparison(&self) -> Option<ComparisonSnapshot> {
        match self.views.view() {
            View::Comparison => comparison::snapshot(&self.cache).ok(),
            _ => None,
        }
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel {
            view: self.view(),
            profile: self.active_profile(),
            fields: self.fields(),
            result: self.current_result(),
            comparison: self.comparison(),
            status: self.status.clone(),
        }
    }
}

/// Await a simulator future, turning a panic inside it into a transport failure.
async fn unwind_to_error(
    ticket: Ticket,
    future: BoxFuture<'static, Result<SimulationResult, SimulationError>>,
) -> Result<SimulationResult, SimulationError> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            log::error!("[Controller] Simulator panicked while running {}#{}", ticket.algorithm, ticket.seq);
            Err(SimulationError::Transport("simulator client crashed".to_string()))
        }
    }
}
