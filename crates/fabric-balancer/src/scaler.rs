//! Queue-depth scaler with a cooldown window.
//!
//! Compares the post-assignment backlog against per-worker watermarks and
//! emits at most one scaling step per evaluation. The cooldown window
//! prevents rapid oscillation.

use serde::Serialize;
use tracing::debug;

use fabric_core::Cycle;

/// Queued requests per worker below which the pool shrinks.
pub const LOW_WATER_PER_WORKER: usize = 50;
/// Queued requests per worker above which the pool grows.
pub const HIGH_WATER_PER_WORKER: usize = 80;

/// Queue-depth watermarks for the current pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub low: usize,
    pub high: usize,
}

impl Thresholds {
    pub fn for_workers(workers: usize) -> Self {
        Self {
            low: LOW_WATER_PER_WORKER * workers,
            high: HIGH_WATER_PER_WORKER * workers,
        }
    }
}

/// A scaling decision for a single balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScaleDecision {
    /// Add one worker.
    ScaleUp,
    /// Remove the newest worker.
    ScaleDown,
    /// No change needed.
    NoChange,
}

/// Per-balancer scaling state.
#[derive(Debug, Clone)]
pub struct Scaler {
    cooldown: Cycle,
    /// Cycle of the last scaling action. Starts at 0, so the first action
    /// can happen no earlier than `cooldown`.
    last_scale: Cycle,
    thresholds: Thresholds,
}

impl Scaler {
    pub fn new(cooldown: Cycle, workers: usize) -> Self {
        Self {
            cooldown,
            last_scale: 0,
            thresholds: Thresholds::for_workers(workers),
        }
    }

    pub fn cooldown(&self) -> Cycle {
        self.cooldown
    }

    pub fn last_scale(&self) -> Cycle {
        self.last_scale
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Recompute watermarks after the pool size changed.
    pub fn rethreshold(&mut self, workers: usize) {
        self.thresholds = Thresholds::for_workers(workers);
    }

    /// Decide whether to grow or shrink given the backlog after this
    /// cycle's assignment pass.
    ///
    /// A `ScaleUp`/`ScaleDown` result stamps `now` as the last scaling
    /// cycle; the caller is expected to act on it.
    pub fn evaluate(&mut self, now: Cycle, depth: usize, workers: usize) -> ScaleDecision {
        if now.saturating_sub(self.last_scale) < self.cooldown {
            return ScaleDecision::NoChange;
        }

        let decision = if depth > self.thresholds.high {
            ScaleDecision::ScaleUp
        } else if depth < self.thresholds.low && workers > 1 {
            ScaleDecision::ScaleDown
        } else {
            ScaleDecision::NoChange
        };

        if decision != ScaleDecision::NoChange {
            debug!(
                cycle = now,
                depth,
                workers,
                low = self.thresholds.low,
                high = self.thresholds.high,
                ?decision,
                "scaling decision"
            );
            self.last_scale = now;
        }

        decision
    }
}
