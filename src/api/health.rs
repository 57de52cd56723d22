//! Shared counters for the /health endpoint.
//! Updated by the predict and parlay handlers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime request counters. Handlers record, /health reads.
#[derive(Default)]
pub struct HealthState {
    /// Predictions answered since start.
    pub predictions_served: AtomicU64,
    /// Predictions whose narrative fell back instead of coming from the model.
    pub llm_fallbacks: AtomicU64,
    /// Parlays built, stored or not.
    pub parlays_built: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prediction(&self, llm_generated: bool) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if !llm_generated {
            self.llm_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_parlay(&self) {
        self.parlays_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn predictions_served(&self) -> u64 {
        self.predictions_served.load(Ordering::Relaxed)
    }

    pub fn llm_fallbacks(&self) -> u64 {
        self.llm_fallbacks.load(Ordering::Relaxed)
    }

    pub fn parlays_built(&self) -> u64 {
        self.parlays_built.load(Ordering::Relaxed)
    }
}
