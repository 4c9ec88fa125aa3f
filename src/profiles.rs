//! Scheduling algorithm profiles.
//!
//! Static table describing which inputs each algorithm needs and how the
//! dashboard labels them. Pure data: no side effects, loaded once.

use crate::models::AlgorithmId;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Largest priority value accepted by the priority-based algorithms.
pub const MAX_PRIORITY: u32 = 9;

/// Column headings the dashboard can show for per-process parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Priority,
    Tickets,
    Deadline,
    Period,
    Extra,
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLabel::Priority => write!(f, "Priority"),
            FieldLabel::Tickets => write!(f, "Tickets"),
            FieldLabel::Deadline => write!(f, "Deadline"),
            FieldLabel::Period => write!(f, "Period"),
            FieldLabel::Extra => write!(f, "Extra"),
        }
    }
}

/// How the priority/ticket column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityKind {
    /// 0-9, lower runs first.
    Priority,
    /// Lottery tickets, unbounded, never 0.
    Tickets,
}

impl PriorityKind {
    /// Value a fresh row gets in this column.
    pub fn default_value(&self) -> u32 {
        match self {
            PriorityKind::Priority => 0,
            PriorityKind::Tickets => 1,
        }
    }

    pub fn label(&self) -> FieldLabel {
        match self {
            PriorityKind::Priority => FieldLabel::Priority,
            PriorityKind::Tickets => FieldLabel::Tickets,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            PriorityKind::Priority => "0-9",
            PriorityKind::Tickets => "e.g. 100",
        }
    }

    /// Upper bound enforced on the column, if any.
    pub fn max_value(&self) -> Option<u32> {
        match self {
            PriorityKind::Priority => Some(MAX_PRIORITY),
            PriorityKind::Tickets => None,
        }
    }
}

/// Field requirements and display content for one algorithm.
#[derive(Debug, Clone)]
pub struct AlgorithmProfile {
    pub id: AlgorithmId,
    pub display_name: &'static str,
    pub description: &'static str,
    pub formula: &'static str,
    /// The simulator reads the priority/ticket column.
    pub needs_priority_field: bool,
    pub priority_kind: PriorityKind,
    pub needs_extra_field: bool,
    pub extra_field_label: FieldLabel,
    /// Only Round Robin takes a global time quantum.
    pub needs_global_time_quantum: bool,
}

impl AlgorithmProfile {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: AlgorithmId,
        display_name: &'static str,
        description: &'static str,
        formula: &'static str,
        needs_priority_field: bool,
        priority_kind: PriorityKind,
        extra_field_label: Option<FieldLabel>,
        needs_global_time_quantum: bool,
    ) -> Self {
        AlgorithmProfile {
            id,
            display_name,
            description,
            formula,
            needs_priority_field,
            priority_kind,
            needs_extra_field: extra_field_label.is_some(),
            extra_field_label: extra_field_label.unwrap_or(FieldLabel::Extra),
            needs_global_time_quantum,
        }
    }

    pub fn uses_tickets(&self) -> bool {
        self.priority_kind == PriorityKind::Tickets
    }

    pub fn priority_label(&self) -> FieldLabel {
        self.priority_kind.label()
    }
}

lazy_static! {
    static ref PROFILES: HashMap<AlgorithmId, AlgorithmProfile> = {
        let mut profiles = HashMap::new();

        profiles.insert(
            AlgorithmId::Cfs,
            AlgorithmProfile::new(
                AlgorithmId::Cfs,
                "Completely Fair Scheduler (CFS)",
                "Tracks each task's virtual runtime and always runs the task with the lowest vruntime. \
                 Priorities map to weights: a higher weight slows vruntime growth and earns more CPU time.",
                "vruntime += Δexec × (W_base / W_i)",
                true, PriorityKind::Priority, None, false,
            ),
        );

        profiles.insert(
            AlgorithmId::Edf,
            AlgorithmProfile::new(
                AlgorithmId::Edf,
                "Earliest Deadline First (EDF)",
                "Dynamic-priority real-time scheduling: the task with the closest absolute deadline runs. \
                 A newly arrived task with a sooner deadline preempts the current one.",
                "Priority ∝ 1 / (T_arrival + T_deadline)",
                false, PriorityKind::Priority, Some(FieldLabel::Deadline), false,
            ),
        );

        profiles.insert(
            AlgorithmId::Fcfs,
            AlgorithmProfile::new(
                AlgorithmId::Fcfs,
                "First Come First Serve (FCFS)",
                "Runs processes strictly in arrival order. Simple, but short jobs can wait behind long ones \
                 (the convoy effect).",
                "Wait = T_start - T_arrival",
                false, PriorityKind::Priority, None, false,
            ),
        );

        profiles.insert(
            AlgorithmId::Mlfq,
            AlgorithmProfile::new(
                AlgorithmId::Mlfq,
                "Multi-Level Feedback Queue (MLFQ)",
                "Several queues with different priorities and time slices. Jobs start at the top and are \
                 demoted when they use a full slice, favoring interactive work over CPU-bound work.",
                "If T_cpu > TQ, Demote(P)",
                false, PriorityKind::Priority, None, false,
            ),
        );

        profiles.insert(
            AlgorithmId::Priority,
            AlgorithmProfile::new(
                AlgorithmId::Priority,
                "Preemptive Priority Scheduling",
                "The CPU goes to the process with the highest priority (lowest number). A higher-priority \
                 arrival preempts the running process.",
                "Min(Priority Value) = Highest Priority",
                true, PriorityKind::Priority, None, false,
            ),
        );

        profiles.insert(
            AlgorithmId::PropShare,
            AlgorithmProfile::new(
                AlgorithmId::PropShare,
                "Proportional Share (Lottery)",
                "Each process holds tickets and a lottery picks the next process to run; the chance of \
                 winning equals the share of all tickets held.",
                "P(win) = Tickets_i / Σ Tickets_all",
                true, PriorityKind::Tickets, None, false,
            ),
        );

        profiles.insert(
            AlgorithmId::Rms,
            AlgorithmProfile::new(
                AlgorithmId::Rms,
                "Rate Monotonic Scheduling (RMS)",
                "Static real-time scheduling for periodic tasks: the shorter the period, the higher the priority.",
                "Priority ∝ 1 / Period",
                false, PriorityKind::Priority, Some(FieldLabel::Period), false,
            ),
        );

        profiles.insert(
            AlgorithmId::Rr,
            AlgorithmProfile::new(
                AlgorithmId::Rr,
                "Round Robin (RR)",
                "Each process runs for at most one time quantum, then goes to the back of the ready queue.",
                "Run min(Burst, TQ), then switch",
                false, PriorityKind::Priority, None, true,
            ),
        );

        profiles.insert(
            AlgorithmId::Sjf,
            AlgorithmProfile::new(
                AlgorithmId::Sjf,
                "Shortest Job First (SRTF)",
                "Selects the process with the smallest remaining time; a shorter arrival preempts the running job.",
                "Select min(Burst - Executed)",
                false, PriorityKind::Priority, None, false,
            ),
        );

        profiles
    };
}

/// Get the profile of an algorithm.
///
/// # Panics
/// If the table lacks an entry for `id`. The table covers the closed
/// `AlgorithmId` set, so this indicates a build defect rather than bad input.
pub fn get_profile(id: AlgorithmId) -> &'static AlgorithmProfile {
    PROFILES
        .get(&id)
        .unwrap_or_else(|| panic!("no algorithm profile registered for '{}'", id))
}

/// Look up a profile by its wire identifier ("cfs", "rr", ...).
pub fn find_profile(name: &str) -> Option<&'static AlgorithmProfile> {
    name.parse::<AlgorithmId>().ok().map(get_profile)
}

/// All profiles in canonical algorithm order (menu order).
pub fn all_profiles() -> Vec<&'static AlgorithmProfile> {
    AlgorithmId::ALL.iter().map(|id| get_profile(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_algorithm_has_a_profile() {
        let profiles = all_profiles();
        assert_eq!(profiles.len(), 9);
        for (profile, id) in profiles.iter().zip(AlgorithmId::ALL) {
            assert_eq!(profile.id, id);
        }
    }

    #[test]
    fn test_only_round_robin_needs_time_quantum() {
        for profile in all_profiles() {
            assert_eq!(
                profile.needs_global_time_quantum,
                profile.id == AlgorithmId::Rr,
                "{}",
                profile.id
            );
        }
    }

    #[test]
    fn test_real_time_extra_fields() {
        let edf = get_profile(AlgorithmId::Edf);
        assert!(edf.needs_extra_field);
        assert_eq!(edf.extra_field_label, FieldLabel::Deadline);

        let rms = get_profile(AlgorithmId::Rms);
        assert!(rms.needs_extra_field);
        assert_eq!(rms.extra_field_label, FieldLabel::Period);

        let fcfs = get_profile(AlgorithmId::Fcfs);
        assert!(!fcfs.needs_extra_field);
        assert_eq!(fcfs.extra_field_label, FieldLabel::Extra);
    }

    #[test]
    fn test_propshare_uses_ticket_column() {
        let profile = get_profile(AlgorithmId::PropShare);
        assert!(profile.uses_tickets());
        assert!(!profile.needs_extra_field);
        assert_eq!(profile.priority_label(), FieldLabel::Tickets);
        assert_eq!(profile.priority_kind.default_value(), 1);
        assert_eq!(profile.priority_kind.max_value(), None);
    }

    #[test]
    fn test_priority_defaults() {
        let profile = get_profile(AlgorithmId::Priority);
        assert!(profile.needs_priority_field);
        assert_eq!(profile.priority_kind.default_value(), 0);
        assert_eq!(profile.priority_kind.max_value(), Some(MAX_PRIORITY));
        assert_eq!(profile.priority_kind.placeholder(), "0-9");
    }

    #[test]
    fn test_find_profile_by_name() {
        assert_eq!(find_profile("RR").map(|p| p.id), Some(AlgorithmId::Rr));
        assert!(find_profile("wfq").is_none());
    }
}
