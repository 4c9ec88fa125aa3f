//! Cross-algorithm comparison snapshot
//!
//! Derived on demand from the result cache; never cached itself.

use crate::dashboard::cache::ResultCache;
use crate::error::ValidationError;
use crate::models::{AlgorithmId, Averages};

/// Fewest cached algorithms a comparison is meaningful for.
pub const MIN_COMPARED: usize = 2;

/// A scalar metric that can be charted across algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    AvgWait,
    AvgTurnaround,
    AvgResponse,
    CpuUtilization,
    Throughput,
    Fairness,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::AvgWait,
        Metric::AvgTurnaround,
        Metric::AvgResponse,
        Metric::CpuUtilization,
        Metric::Throughput,
        Metric::Fairness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::AvgWait => "Avg Wait Time",
            Metric::AvgTurnaround => "Avg Turnaround",
            Metric::AvgResponse => "Avg Response",
            Metric::CpuUtilization => "CPU Utilization",
            Metric::Throughput => "Throughput",
            Metric::Fairness => "Jain Fairness Index",
        }
    }

    pub fn lower_is_better(&self) -> bool {
        matches!(self, Metric::AvgWait | Metric::AvgTurnaround | Metric::AvgResponse)
    }

    /// Read this metric from an averages block; `None` if the run lacks it.
    pub fn value(&self, averages: &Averages) -> Option<f64> {
        match self {
            Metric::AvgWait => Some(averages.avg_wait),
            Metric::AvgTurnaround => Some(averages.avg_turnaround),
            Metric::AvgResponse => Some(averages.avg_response),
            Metric::CpuUtilization => Some(averages.cpu_utilization_percent),
            Metric::Throughput => Some(averages.throughput_per_unit_time),
            Metric::Fairness => averages.fairness_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonEntry {
    pub algorithm: AlgorithmId,
    pub averages: Averages,
}

/// Averages of every cached algorithm, in canonical algorithm order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSnapshot {
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonSnapshot {
    /// One chart series: `(algorithm, value)` pairs for runs that report the metric.
    pub fn series(&self, metric: Metric) -> Vec<(AlgorithmId, f64)> {
        self.entries
            .iter()
            .filter_map(|e| metric.value(&e.averages).map(|v| (e.algorithm, v)))
            .collect()
    }

    /// Algorithm that does best on `metric`. Ties go to the earlier algorithm.
    pub fn best(&self, metric: Metric) -> Option<AlgorithmId> {
        let mut best: Option<(AlgorithmId, f64)> = None;
        for (algorithm, value) in self.series(metric) {
            let better = match best {
                None => true,
                Some((_, current)) if metric.lower_is_better() => value < current,
                Some((_, current)) => value > current,
            };
            if better {
                best = Some((algorithm, value));
            }
        }
        best.map(|(algorithm, _)| algorithm)
    }

    pub fn algorithms(&self) -> Vec<AlgorithmId> {
        self.entries.iter().map(|e| e.algorithm).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the comparison snapshot, refusing when fewer than two algorithms ran.
pub fn snapshot(cache: &ResultCache) -> Result<ComparisonSnapshot, ValidationError> {
    if !cache.has_at_least(MIN_COMPARED) {
        return Err(ValidationError::ComparisonUnavailable {
            need: MIN_COMPARED,
            have: cache.len(),
        });
    }

    let entries = AlgorithmId::ALL
        .iter()
        .filter_map(|id| {
            cache.get(*id).map(|result| ComparisonEntry {
                algorithm: *id,
                averages: result.averages.clone(),
            })
        })
        .collect();

    Ok(ComparisonSnapshot { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimulationResult;

    fn result(avg_wait: f64, cpu: f64, fairness: Option<f64>) -> SimulationResult {
        SimulationResult {
            processes: Vec::new(),
            averages: Averages {
                avg_wait,
                avg_turnaround: avg_wait + 3.0,
                avg_response: avg_wait,
                cpu_utilization_percent: cpu,
                throughput_per_unit_time: 0.3,
                fairness_index: fairness,
            },
            gantt_entries: Vec::new(),
            vruntime_trace: None,
        }
    }

    #[test]
    fn test_refused_below_two() {
        let mut cache = ResultCache::new();
        assert_eq!(
            snapshot(&cache).unwrap_err(),
            ValidationError::ComparisonUnavailable { need: 2, have: 0 }
        );
        cache.put(AlgorithmId::Fcfs, result(2.0, 90.0, None));
        assert_eq!(
            snapshot(&cache).unwrap_err(),
            ValidationError::ComparisonUnavailable { need: 2, have: 1 }
        );
    }

    #[test]
    fn test_snapshot_matches_cache_in_canonical_order() {
        let mut cache = ResultCache::new();
        cache.put(AlgorithmId::Sjf, result(1.0, 95.0, Some(0.9)));
        cache.put(AlgorithmId::Fcfs, result(2.33, 100.0, Some(0.75)));

        let snap = snapshot(&cache).unwrap();
        assert_eq!(snap.algorithms(), vec![AlgorithmId::Fcfs, AlgorithmId::Sjf]);
        assert_eq!(snap.entries[0].averages, cache.get(AlgorithmId::Fcfs).unwrap().averages);
        assert_eq!(snap.entries[1].averages, cache.get(AlgorithmId::Sjf).unwrap().averages);
    }

    #[test]
    fn test_snapshot_reflects_latest_overwrite() {
        let mut cache = ResultCache::new();
        cache.put(AlgorithmId::Rr, result(5.0, 80.0, None));
        cache.put(AlgorithmId::Cfs, result(3.0, 80.0, None));
        cache.put(AlgorithmId::Rr, result(4.0, 80.0, None));
        let snap = snapshot(&cache).unwrap();
        assert_eq!(snap.series(Metric::AvgWait), vec![(AlgorithmId::Cfs, 3.0), (AlgorithmId::Rr, 4.0)]);
    }

    #[test]
    fn test_best_respects_metric_direction() {
        let mut cache = ResultCache::new();
        cache.put(AlgorithmId::Fcfs, result(4.0, 100.0, Some(0.6)));
        cache.put(AlgorithmId::Sjf, result(1.5, 90.0, Some(0.8)));
        cache.put(AlgorithmId::Rr, result(3.0, 95.0, None));
        let snap = snapshot(&cache).unwrap();
        assert_eq!(snap.best(Metric::AvgWait), Some(AlgorithmId::Sjf));
        assert_eq!(snap.best(Metric::CpuUtilization), Some(AlgorithmId::Fcfs));
        assert_eq!(snap.best(Metric::Fairness), Some(AlgorithmId::Sjf));
        assert_eq!(snap.series(Metric::Fairness).len(), 2);
    }
}
