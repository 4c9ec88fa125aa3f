//! Simulation request assembly
//!
//! Turns a process snapshot plus the selected algorithm into one validated,
//! immutable request. Each algorithm's extra inputs are attached here so the
//! simulator never has to guess which field means what.

use serde::ser::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::models::{AlgorithmId, ProcessSpec};
use crate::profiles::{get_profile, AlgorithmProfile};

/// Quantum used when the user leaves the Round Robin field blank or invalid.
pub const DEFAULT_TIME_QUANTUM: u32 = 2;

/// Dashboard-wide inputs that are not per-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalParams {
    /// Raw text of the time quantum field.
    pub time_quantum: String,
    /// Fallback when `time_quantum` is blank or not a positive integer.
    pub default_time_quantum: u32,
}

impl Default for GlobalParams {
    fn default() -> Self {
        GlobalParams {
            time_quantum: String::new(),
            default_time_quantum: DEFAULT_TIME_QUANTUM,
        }
    }
}

impl GlobalParams {
    /// Effective Round Robin quantum.
    pub fn resolved_time_quantum(&self) -> u32 {
        match self.time_quantum.trim().parse::<i64>() {
            Ok(q) if q > 0 && q <= u32::MAX as i64 => q as u32,
            _ => {
                if !self.time_quantum.trim().is_empty() {
                    log::warn!(
                        "[Request] Ignoring time quantum '{}', using {}",
                        self.time_quantum,
                        self.default_time_quantum
                    );
                }
                self.default_time_quantum
            }
        }
    }
}

/// One validated request for the simulator. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRequest {
    algorithm: AlgorithmId,
    processes: Vec<ProcessSpec>,
    time_quantum: Option<u32>,
}

impl SimulationRequest {
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    pub fn processes(&self) -> &[ProcessSpec] {
        &self.processes
    }

    /// Set only for Round Robin.
    pub fn time_quantum(&self) -> Option<u32> {
        self.time_quantum
    }
}

/// Build a request from a process snapshot.
///
/// Fails when the set is empty or when a deadline/period algorithm has a
/// row without a positive value in that column.
pub fn build(
    processes: &[ProcessSpec],
    algorithm: AlgorithmId,
    params: &GlobalParams,
) -> Result<SimulationRequest, ValidationError> {
    if processes.is_empty() {
        return Err(ValidationError::EmptyProcessSet);
    }

    let profile = get_profile(algorithm);
    validate_extra_params(processes, profile)?;

    let processes = processes
        .iter()
        .map(|p| ProcessSpec {
            extra_param: if profile.needs_extra_field { p.extra_param } else { None },
            ..*p
        })
        .collect();

    let time_quantum = if profile.needs_global_time_quantum {
        Some(params.resolved_time_quantum())
    } else {
        None
    };

    Ok(SimulationRequest {
        algorithm,
        processes,
        time_quantum,
    })
}

fn validate_extra_params(
    processes: &[ProcessSpec],
    profile: &AlgorithmProfile,
) -> Result<(), ValidationError> {
    if !profile.needs_extra_field {
        return Ok(());
    }
    match processes.iter().find(|p| p.extra_param.unwrap_or(0) == 0) {
        Some(p) => Err(ValidationError::MissingExtraParam {
            pid: p.pid,
            label: profile.extra_field_label.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(serde::Serialize)]
struct WireProcess {
    pid: u32,
    arrival: u32,
    burst: u32,
    priority: u32,
    #[serde(rename = "extraParam", skip_serializing_if = "Option::is_none")]
    extra_param: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tickets: Option<u32>,
}

#[derive(serde::Serialize)]
struct WireRequest<'a> {
    algorithm: &'a str,
    processes: Vec<WireProcess>,
    #[serde(rename = "timeQuantum", skip_serializing_if = "Option::is_none")]
    time_quantum: Option<u32>,
}

impl Serialize for SimulationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let uses_tickets = get_profile(self.algorithm).uses_tickets();
        let wire = WireRequest {
            algorithm: self.algorithm.as_str(),
            processes: self
                .processes
                .iter()
                .map(|p| WireProcess {
                    pid: p.pid,
                    arrival: p.arrival,
                    burst: p.burst,
                    priority: p.priority_or_tickets,
                    extra_param: p.extra_param,
                    tickets: uses_tickets.then_some(p.priority_or_tickets),
                })
                .collect(),
            time_quantum: self.time_quantum,
        };
        wire.serialize(serializer)
    }
}
