//! View state machine
//!
//! **States**: `Home`, `Dashboard(algorithm)`, `Comparison`.
//! The last dashboard algorithm is remembered so leaving the comparison view
//! returns to it, and so field visibility is always defined.

use crate::dashboard::cache::ResultCache;
use crate::dashboard::comparison::MIN_COMPARED;
use crate::error::ValidationError;
use crate::models::AlgorithmId;

/// Algorithm opened by the "start" action.
pub const START_ALGORITHM: AlgorithmId = AlgorithmId::Cfs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Dashboard(AlgorithmId),
    Comparison,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Dashboard(_) => "dashboard",
            View::Comparison => "comparison",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewController {
    view: View,
    last_active: AlgorithmId,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        ViewController {
            view: View::Home,
            last_active: START_ALGORITHM,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Algorithm whose fields and results the dashboard shows (or last showed).
    pub fn active_algorithm(&self) -> AlgorithmId {
        self.last_active
    }

    /// Leave the landing page for the default algorithm's dashboard.
    ///
    /// Outside `Home` this is a no-op. Returns the algorithm now shown.
    pub fn start(&mut self) -> AlgorithmId {
        if self.view == View::Home {
            self.view = View::Dashboard(START_ALGORITHM);
            self.last_active = START_ALGORITHM;
        }
        self.last_active
    }

    /// Switch to `algorithm`'s dashboard from any state. Returns the previous view.
    pub fn select(&mut self, algorithm: AlgorithmId) -> View {
        let previous = self.view;
        self.view = View::Dashboard(algorithm);
        self.last_active = algorithm;
        previous
    }

    /// Enter the comparison view if enough algorithms have results.
    pub fn open_comparison(&mut self, cache: &ResultCache) -> Result<(), ValidationError> {
        if !cache.has_at_least(MIN_COMPARED) {
            return Err(ValidationError::ComparisonUnavailable {
                need: MIN_COMPARED,
                have: cache.len(),
            });
        }
        self.view = View::Comparison;
        Ok(())
    }

    /// Return from the comparison view to the last active dashboard.
    pub fn close_comparison(&mut self) -> AlgorithmId {
        if self.view == View::Comparison {
            self.view = View::Dashboard(self.last_active);
        }
        self.last_active
    }
}
