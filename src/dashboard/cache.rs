//! Per-algorithm result cache
//!
//! One slot per algorithm holding its latest successful result. Writes
//! replace the slot wholesale; nothing is merged, averaged, or evicted.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{AlgorithmId, SimulationResult};

#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: BTreeMap<AlgorithmId, Arc<SimulationResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache {
            entries: BTreeMap::new(),
        }
    }

    /// Store `result` as the latest for `algorithm`, replacing any previous one.
    pub fn put(&mut self, algorithm: AlgorithmId, result: SimulationResult) {
        let replaced = self.entries.insert(algorithm, Arc::new(result)).is_some();
        log::debug!(
            "[Cache] {} result for {} ({} cached)",
            if replaced { "Replaced" } else { "Stored" },
            algorithm,
            self.entries.len()
        );
    }

    pub fn get(&self, algorithm: AlgorithmId) -> Option<Arc<SimulationResult>> {
        self.entries.get(&algorithm).cloned()
    }

    pub fn contains(&self, algorithm: AlgorithmId) -> bool {
        self.entries.contains_key(&algorithm)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_at_least(&self, n: usize) -> bool {
        self.entries.len() >= n
    }

    /// Cached entries in canonical algorithm order.
    pub fn iter(&self) -> impl Iterator<Item = (AlgorithmId, &SimulationResult)> {
        self.entries.iter().map(|(id, result)| (*id, result.as_ref()))
    }
}
