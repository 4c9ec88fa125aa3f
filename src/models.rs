//! Core data types for the scheduling dashboard.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of distinct process colors in the Gantt palette.
pub const PALETTE_SIZE: usize = 9;

/// The nine scheduling algorithms the simulator understands.
///
/// Declaration order is the canonical order used by comparison views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    Cfs,
    Edf,
    Fcfs,
    Mlfq,
    Priority,
    PropShare,
    Rms,
    Rr,
    Sjf,
}

impl AlgorithmId {
    /// Every algorithm, in canonical order.
    pub const ALL: [AlgorithmId; 9] = [
        AlgorithmId::Cfs,
        AlgorithmId::Edf,
        AlgorithmId::Fcfs,
        AlgorithmId::Mlfq,
        AlgorithmId::Priority,
        AlgorithmId::PropShare,
        AlgorithmId::Rms,
        AlgorithmId::Rr,
        AlgorithmId::Sjf,
    ];

    /// Wire identifier sent to the simulator.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::Cfs => "cfs",
            AlgorithmId::Edf => "edf",
            AlgorithmId::Fcfs => "fcfs",
            AlgorithmId::Mlfq => "mlfq",
            AlgorithmId::Priority => "priority",
            AlgorithmId::PropShare => "propshare",
            AlgorithmId::Rms => "rms",
            AlgorithmId::Rr => "rr",
            AlgorithmId::Sjf => "sjf",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AlgorithmId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| format!("Unknown scheduling algorithm: {}", s))
    }
}

/// One parsed, validated row of the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessSpec {
    pub pid: u32,
    pub arrival: u32,
    pub burst: u32,
    /// Priority 0-9 (lower runs first), or the lottery ticket count for Proportional-Share.
    pub priority_or_tickets: u32,
    /// Relative deadline (EDF) or period (RMS).
    pub extra_param: Option<u32>,
}

/// Per-process row of a simulation result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    #[serde(deserialize_with = "lenient::u32_value")]
    pub pid: u32,
    #[serde(rename = "arrivalTime", alias = "at", deserialize_with = "lenient::u32_value")]
    pub arrival_time: u32,
    #[serde(rename = "burstTime", alias = "bt", deserialize_with = "lenient::u32_value")]
    pub burst_time: u32,
    #[serde(rename = "waitTime", alias = "wt", deserialize_with = "lenient::u32_value")]
    pub wait_time: u32,
    #[serde(rename = "turnaroundTime", alias = "tat", deserialize_with = "lenient::u32_value")]
    pub turnaround_time: u32,
    #[serde(rename = "responseTime", alias = "rt", deserialize_with = "lenient::u32_value")]
    pub response_time: u32,
}

impl ProcessMetrics {
    /// Completion time (arrival + turnaround).
    ///
    /// Widened to `u64`: both terms may be anywhere in the `u32` range.
    pub fn completion_time(&self) -> u64 {
        u64::from(self.arrival_time) + u64::from(self.turnaround_time)
    }
}

/// Aggregate metrics of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Averages {
    pub avg_wait: f64,
    pub avg_turnaround: f64,
    pub avg_response: f64,
    pub cpu_utilization_percent: f64,
    pub throughput_per_unit_time: f64,
    /// Jain's fairness index, 0..=1.
    pub fairness_index: Option<f64>,
}

impl Averages {
    /// Derive the aggregate metrics from per-process rows.
    ///
    /// Uses the simulator's formulas: the observed span is
    /// `max(completion) - min(arrival)`, at least 1; Jain's index is taken
    /// over `burst / turnaround` per process.
    pub fn derive(processes: &[ProcessMetrics]) -> Self {
        if processes.is_empty() {
            return Averages {
                avg_wait: 0.0,
                avg_turnaround: 0.0,
                avg_response: 0.0,
                cpu_utilization_percent: 0.0,
                throughput_per_unit_time: 0.0,
                fairness_index: None,
            };
        }

        let n = processes.len() as f64;
        let mean = |f: fn(&ProcessMetrics) -> u32| {
            processes.iter().map(|p| f(p) as f64).sum::<f64>() / n
        };

        let max_ct = processes.iter().map(|p| p.completion_time()).max().unwrap_or(0);
        let min_at = processes.iter().map(|p| u64::from(p.arrival_time)).min().unwrap_or(0);
        let span = (max_ct.saturating_sub(min_at)).max(1) as f64;
        let total_burst: u64 = processes.iter().map(|p| p.burst_time as u64).sum();

        Averages {
            avg_wait: mean(|p| p.wait_time),
            avg_turnaround: mean(|p| p.turnaround_time),
            avg_response: mean(|p| p.response_time),
            cpu_utilization_percent: total_burst as f64 / span * 100.0,
            throughput_per_unit_time: n / span,
            fairness_index: Some(jain_index(processes)),
        }
    }
}

/// Jain's fairness index over normalized allocations (`burst / turnaround`).
pub fn jain_index(processes: &[ProcessMetrics]) -> f64 {
    if processes.is_empty() {
        return 0.0;
    }
    let allocations: Vec<f64> = processes
        .iter()
        .map(|p| {
            if p.burst_time > 0 && p.turnaround_time > 0 {
                p.burst_time as f64 / p.turnaround_time as f64
            } else {
                0.0
            }
        })
        .collect();
    let sum: f64 = allocations.iter().sum();
    let sum_sq: f64 = allocations.iter().map(|x| x * x).sum();
    if sum_sq == 0.0 {
        return 0.0;
    }
    (sum * sum) / (allocations.len() as f64 * sum_sq)
}

/// One contiguous interval during which a process holds the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttEntry {
    #[serde(deserialize_with = "lenient::u32_value")]
    pub pid: u32,
    #[serde(rename = "startTime", alias = "start", deserialize_with = "lenient::u32_value")]
    pub start_time: u32,
    #[serde(rename = "endTime", alias = "end", deserialize_with = "lenient::u32_value")]
    pub end_time: u32,
}

impl GanttEntry {
    pub fn duration(&self) -> u32 {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// CFS virtual runtime sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VruntimeSample {
    #[serde(deserialize_with = "lenient::u32_value")]
    pub pid: u32,
    #[serde(alias = "real_time", deserialize_with = "lenient::u32_value")]
    pub time: u32,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub vruntime: f64,
}

/// Result of one simulation run, as cached and rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSimulationResult")]
pub struct SimulationResult {
    pub processes: Vec<ProcessMetrics>,
    pub averages: Averages,
    #[serde(rename = "gantt")]
    pub gantt_entries: Vec<GanttEntry>,
    /// Present only for CFS runs.
    #[serde(rename = "vruntime")]
    pub vruntime_trace: Option<Vec<VruntimeSample>>,
}

impl SimulationResult {
    /// Row for `pid`, if the result contains it.
    pub fn process(&self, pid: u32) -> Option<&ProcessMetrics> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    /// PIDs ordered by the time they finished.
    ///
    /// Uses the last Gantt interval of each pid; falls back to the process
    /// table's completion times when no timeline was returned.
    pub fn completion_order(&self) -> Vec<u32> {
        let mut finished: Vec<(u64, u32)> = if self.gantt_entries.is_empty() {
            self.processes
                .iter()
                .map(|p| (p.completion_time(), p.pid))
                .collect()
        } else {
            let mut last_end: Vec<(u64, u32)> = Vec::new();
            for entry in &self.gantt_entries {
                let end = u64::from(entry.end_time);
                match last_end.iter_mut().find(|(_, pid)| *pid == entry.pid) {
                    Some(slot) => slot.0 = slot.0.max(end),
                    None => last_end.push((end, entry.pid)),
                }
            }
            last_end
        };
        finished.sort();
        finished.into_iter().map(|(_, pid)| pid).collect()
    }

    /// End of the last Gantt interval.
    pub fn makespan(&self) -> u32 {
        self.gantt_entries.iter().map(|e| e.end_time).max().unwrap_or(0)
    }

    /// vruntime samples of one process, in time order.
    pub fn vruntime_of(&self, pid: u32) -> Vec<VruntimeSample> {
        let mut samples: Vec<VruntimeSample> = self
            .vruntime_trace
            .iter()
            .flatten()
            .filter(|s| s.pid == pid)
            .copied()
            .collect();
        samples.sort_by_key(|s| s.time);
        samples
    }
}

/// Palette slot for a process; renderers key colors off this.
pub fn color_slot(pid: u32) -> usize {
    (pid.saturating_sub(1) as usize) % PALETTE_SIZE
}

/// Averages block as it arrives on the wire; any field may be missing.
#[derive(Debug, Default, Deserialize)]
struct RawAverages {
    #[serde(default, rename = "avgWait", alias = "avg_wt", deserialize_with = "lenient::opt_f64_value")]
    avg_wait: Option<f64>,
    #[serde(default, rename = "avgTurnaround", alias = "avg_tat", deserialize_with = "lenient::opt_f64_value")]
    avg_turnaround: Option<f64>,
    #[serde(default, rename = "avgResponse", alias = "avg_rt", deserialize_with = "lenient::opt_f64_value")]
    avg_response: Option<f64>,
    #[serde(default, rename = "cpuUtilizationPercent", alias = "cpu_util", deserialize_with = "lenient::opt_f64_value")]
    cpu_utilization_percent: Option<f64>,
    #[serde(default, rename = "throughputPerUnitTime", alias = "throughput", deserialize_with = "lenient::opt_f64_value")]
    throughput_per_unit_time: Option<f64>,
    #[serde(default, rename = "fairnessIndex", alias = "fairness_index", deserialize_with = "lenient::opt_f64_value")]
    fairness_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSimulationResult {
    processes: Vec<ProcessMetrics>,
    #[serde(default)]
    averages: RawAverages,
    #[serde(default, alias = "ganttEntries")]
    gantt: Vec<GanttEntry>,
    #[serde(default, alias = "vruntimeTrace")]
    vruntime: Option<Vec<VruntimeSample>>,
}

impl From<RawSimulationResult> for SimulationResult {
    fn from(raw: RawSimulationResult) -> Self {
        let derived = Averages::derive(&raw.processes);
        let a = raw.averages;
        let averages = Averages {
            avg_wait: a.avg_wait.unwrap_or(derived.avg_wait),
            avg_turnaround: a.avg_turnaround.unwrap_or(derived.avg_turnaround),
            avg_response: a.avg_response.unwrap_or(derived.avg_response),
            cpu_utilization_percent: a
                .cpu_utilization_percent
                .unwrap_or(derived.cpu_utilization_percent),
            throughput_per_unit_time: a
                .throughput_per_unit_time
                .unwrap_or(derived.throughput_per_unit_time),
            fairness_index: a.fairness_index.or(derived.fairness_index),
        };

        let total = raw.gantt.len();
        let gantt_entries: Vec<GanttEntry> = raw
            .gantt
            .into_iter()
            .filter(|e| e.end_time > e.start_time)
            .collect();
        if gantt_entries.len() != total {
            log::warn!(
                "[Models] Dropped {} degenerate Gantt entries (end <= start)",
                total - gantt_entries.len()
            );
        }

        // The bridge sends an empty array for non-CFS runs.
        let vruntime_trace = raw.vruntime.filter(|trace| !trace.is_empty());

        SimulationResult {
            processes: raw.processes,
            averages,
            gantt_entries,
            vruntime_trace,
        }
    }
}

/// Forgiving numeric decoding for simulator output.
///
/// The bridge scrapes a text table, so numbers often arrive as strings with
/// units attached ("100.00%", "0.33 processes/unit time").
mod lenient {
    use super::*;
    use serde::de::{self, Visitor};

    static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)").expect("Invalid leading number regex")
    });

    pub(super) fn parse_leading(s: &str) -> Option<f64> {
        LEADING_NUMBER
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            match parse_leading(v) {
                Some(n) => Ok(Some(n)),
                None => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    pub fn u32_value<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let n = d
            .deserialize_any(NumberVisitor)?
            .ok_or_else(|| de::Error::custom("expected a number, found null"))?;
        if !n.is_finite() || n < 0.0 || n > u32::MAX as f64 {
            return Err(de::Error::custom(format!("{} is not a valid time value", n)));
        }
        Ok(n.round() as u32)
    }

    pub fn f64_value<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(NumberVisitor)?
            .ok_or_else(|| de::Error::custom("expected a number, found null"))
    }

    pub fn opt_f64_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        d.deserialize_any(NumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_algorithm_id_round_trip() {
        for id in AlgorithmId::ALL {
            assert_eq!(id.as_str().parse::<AlgorithmId>().unwrap(), id);
        }
        assert_eq!("PropShare".parse::<AlgorithmId>().unwrap(), AlgorithmId::PropShare);
        assert!("lottery".parse::<AlgorithmId>().is_err());
    }

    #[test]
    fn test_algorithm_id_serializes_lowercase() {
        let json = serde_json::to_string(&AlgorithmId::PropShare).unwrap();
        assert_eq!(json, "\"propshare\"");
    }

    #[test]
    fn test_color_slot_wraps_every_nine() {
        assert_eq!(color_slot(1), 0);
        assert_eq!(color_slot(9), 8);
        assert_eq!(color_slot(10), 0);
    }

    #[test]
    fn test_decodes_bridge_string_table() {
        let body = r#"{
            "processes": [
                {"pid": "1", "at": "0", "bt": "5", "wt": "0", "tat": "5", "rt": "0"},
                {"pid": "2", "at": "2", "bt": "3", "wt": "3", "tat": "6", "rt": "3"}
            ],
            "averages": {
                "avg_wt": "1.50", "avg_tat": "5.50", "avg_rt": "1.50",
                "cpu_util": "100.00%", "throughput": "0.25 processes/unit time",
                "fairness_index": "0.9000"
            },
            "gantt": [{"pid": 1, "start": 0, "end": 5}, {"pid": 2, "start": 5, "end": 8}],
            "vruntime": []
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.processes[1].wait_time, 3);
        assert!(approx(result.averages.cpu_utilization_percent, 100.0));
        assert!(approx(result.averages.throughput_per_unit_time, 0.25));
        assert_eq!(result.averages.fairness_index, Some(0.9));
        assert_eq!(result.gantt_entries.len(), 2);
        assert!(result.vruntime_trace.is_none());
    }

    #[test]
    fn test_missing_averages_are_derived() {
        let body = r#"{
            "processes": [
                {"pid": 1, "arrivalTime": 0, "burstTime": 5, "waitTime": 0, "turnaroundTime": 5, "responseTime": 0},
                {"pid": 2, "arrivalTime": 2, "burstTime": 3, "waitTime": 3, "turnaroundTime": 6, "responseTime": 3},
                {"pid": 3, "arrivalTime": 4, "burstTime": 1, "waitTime": 4, "turnaroundTime": 5, "responseTime": 4}
            ],
            "averages": {}
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        let avg = &result.averages;
        assert!(approx(avg.avg_wait, 2.33));
        assert!(approx(avg.avg_turnaround, 16.0 / 3.0));
        assert!(approx(avg.cpu_utilization_percent, 100.0));
        assert!(approx(avg.throughput_per_unit_time, 3.0 / 9.0));
        assert!(approx(avg.fairness_index.unwrap(), 0.7468));
    }

    #[test]
    fn test_extreme_times_do_not_overflow() {
        let body = r#"{
            "processes": [
                {"pid": 1, "at": 4000000000, "bt": 1, "wt": 0, "tat": 4000000000, "rt": 0},
                {"pid": 2, "at": 4294967295, "bt": 2, "wt": 0, "tat": 4294967295, "rt": 0}
            ],
            "averages": {}
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.processes[1].completion_time(), 2 * u32::MAX as u64);
        assert_eq!(result.completion_order(), vec![1, 2]);
        assert!(result.averages.cpu_utilization_percent.is_finite());
        assert!(result.averages.throughput_per_unit_time > 0.0);
    }

    #[test]
    fn test_degenerate_gantt_entries_dropped() {
        let body = r#"{
            "processes": [{"pid": 1, "at": 0, "bt": 2, "wt": 0, "tat": 2, "rt": 0}],
            "averages": {},
            "gantt": [{"pid": 1, "start": 0, "end": 0}, {"pid": 1, "start": 0, "end": 2}]
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.gantt_entries, vec![GanttEntry { pid: 1, start_time: 0, end_time: 2 }]);
    }

    #[test]
    fn test_completion_order_uses_last_interval() {
        let body = r#"{
            "processes": [
                {"pid": 1, "at": 0, "bt": 4, "wt": 2, "tat": 6, "rt": 0},
                {"pid": 2, "at": 1, "bt": 2, "wt": 0, "tat": 2, "rt": 0}
            ],
            "gantt": [
                {"pid": 1, "start": 0, "end": 1},
                {"pid": 2, "start": 1, "end": 3},
                {"pid": 1, "start": 3, "end": 6}
            ]
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.completion_order(), vec![2, 1]);
        assert_eq!(result.makespan(), 6);
    }

    #[test]
    fn test_vruntime_samples_per_pid_are_time_ordered() {
        let body = r#"{
            "processes": [{"pid": 1, "at": 0, "bt": 2, "wt": 0, "tat": 2, "rt": 0}],
            "vruntime": [
                {"time": 2, "pid": 1, "vruntime": 2.5},
                {"time": 1, "pid": 1, "vruntime": 1.25},
                {"time": 1, "pid": 2, "vruntime": 0.5}
            ]
        }"#;
        let result: SimulationResult = serde_json::from_str(body).unwrap();
        let samples = result.vruntime_of(1);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].time, 1);
        assert_eq!(samples[1].vruntime, 2.5);
    }

    #[test]
    fn test_rejects_non_numeric_time() {
        let body = r#"{"processes": [{"pid": "P1", "at": 0, "bt": 1, "wt": 0, "tat": 1, "rt": 0}]}"#;
        assert!(serde_json::from_str::<SimulationResult>(body).is_err());
    }
}
