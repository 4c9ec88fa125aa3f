//! Process table store
//!
//! Rows keep the raw text the user typed; parsing happens at snapshot time and
//! never fails, falling back to each field's default instead. PIDs are always
//! the dense sequence 1..N in row order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ProcessSpec;
use crate::profiles::{AlgorithmProfile, PriorityKind};

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([-+]?[0-9]+)").expect("Invalid leading integer regex"));

/// Editable columns of a process row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessField {
    Arrival,
    Burst,
    /// Priority or ticket count, depending on the selected algorithm.
    Priority,
    /// Deadline or period, depending on the selected algorithm.
    Extra,
}

/// One row of the process table as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRow {
    pub pid: u32,
    pub arrival: String,
    pub burst: String,
    pub priority: String,
    pub extra: String,
}

impl ProcessRow {
    fn blank(pid: u32, priority_kind: PriorityKind) -> Self {
        ProcessRow {
            pid,
            arrival: "0".to_string(),
            burst: "1".to_string(),
            priority: priority_kind.default_value().to_string(),
            extra: String::new(),
        }
    }

    fn field_mut(&mut self, field: ProcessField) -> &mut String {
        match field {
            ProcessField::Arrival => &mut self.arrival,
            ProcessField::Burst => &mut self.burst,
            ProcessField::Priority => &mut self.priority,
            ProcessField::Extra => &mut self.extra,
        }
    }

    /// Parse this row under the given profile's column semantics.
    pub fn to_spec(&self, profile: &AlgorithmProfile) -> ProcessSpec {
        let priority_or_tickets = match profile.priority_kind {
            PriorityKind::Priority => parse_int(&self.priority)
                .map(|v| v.clamp(0, crate::profiles::MAX_PRIORITY as i64) as u32)
                .unwrap_or(0),
            PriorityKind::Tickets => parse_int(&self.priority)
                .filter(|v| *v > 0)
                .map(clamp_u32)
                .unwrap_or(1),
        };

        ProcessSpec {
            pid: self.pid,
            arrival: parse_int(&self.arrival).map(|v| clamp_u32(v.max(0))).unwrap_or(0),
            burst: parse_int(&self.burst)
                .filter(|v| *v > 0)
                .map(clamp_u32)
                .unwrap_or(1),
            priority_or_tickets,
            extra_param: parse_int(&self.extra).filter(|v| *v >= 0).map(clamp_u32),
        }
    }
}

/// Leading signed integer of `text` ("7.5" -> 7, "4abc" -> 4), saturating on overflow.
fn parse_int(text: &str) -> Option<i64> {
    let digits = LEADING_INT.captures(text)?.get(1)?.as_str();
    match digits.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

fn clamp_u32(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

/// Ordered set of process rows. Owns PID assignment.
#[derive(Debug, Clone, Default)]
pub struct ProcessSet {
    rows: Vec<ProcessRow>,
}

impl ProcessSet {
    pub fn new() -> Self {
        ProcessSet { rows: Vec::new() }
    }

    /// The three rows a fresh dashboard starts with.
    pub fn seeded(profile: &AlgorithmProfile) -> Self {
        let mut set = ProcessSet::new();
        for (arrival, burst) in [(0, 5), (2, 3), (4, 1)] {
            let pid = set.add_row(profile);
            set.set_field(pid, ProcessField::Arrival, arrival.to_string());
            set.set_field(pid, ProcessField::Burst, burst.to_string());
        }
        set
    }

    /// Append a row with default values for the current algorithm. Returns its PID.
    pub fn add_row(&mut self, profile: &AlgorithmProfile) -> u32 {
        let pid = self.rows.iter().map(|r| r.pid).max().unwrap_or(0) + 1;
        self.rows.push(ProcessRow::blank(pid, profile.priority_kind));
        pid
    }

    /// Delete a row and renumber the rest to 1..N, keeping their order.
    ///
    /// Returns false when no row has that PID.
    pub fn remove_row(&mut self, pid: u32) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.pid != pid);
        if self.rows.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    fn renumber(&mut self) {
        for (idx, row) in self.rows.iter_mut().enumerate() {
            row.pid = idx as u32 + 1;
        }
    }

    /// Replace the text of one cell. Returns false when no row has that PID.
    pub fn set_field(&mut self, pid: u32, field: ProcessField, value: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|r| r.pid == pid) {
            Some(row) => {
                *row.field_mut(field) = value.into();
                true
            }
            None => false,
        }
    }

    /// Adjust the priority/ticket column after an algorithm switch.
    ///
    /// Ticket algorithms upgrade an exact 0 to 1; priority algorithms clamp
    /// values above the maximum. Other values are left as typed.
    pub fn apply_profile(&mut self, profile: &AlgorithmProfile) {
        for row in &mut self.rows {
            let current = parse_int(&row.priority);
            match profile.priority_kind {
                PriorityKind::Tickets => {
                    if current == Some(0) {
                        row.priority = "1".to_string();
                    }
                }
                PriorityKind::Priority => {
                    let max = crate::profiles::MAX_PRIORITY as i64;
                    if current.map_or(false, |v| v > max) {
                        row.priority = max.to_string();
                    }
                }
            }
        }
    }

    /// Parsed, ordered view of all rows.
    pub fn snapshot(&self, profile: &AlgorithmProfile) -> Vec<ProcessSpec> {
        self.rows.iter().map(|r| r.to_spec(profile)).collect()
    }

    pub fn rows(&self) -> &[ProcessRow] {
        &self.rows
    }

    pub fn row(&self, pid: u32) -> Option<&ProcessRow> {
        self.rows.iter().find(|r| r.pid == pid)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
