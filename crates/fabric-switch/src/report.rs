//! End-of-run summary, serializable to JSON or rendered as text.

use std::ops::RangeInclusive;

use serde::Serialize;

use fabric_balancer::{BalancerStats, Thresholds};
use fabric_core::{AddressRange, Cycle, JobClass};

use crate::switch::Switch;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub cycles: Cycle,
    pub routed: u64,
    pub blocked: u64,
    /// Requests still waiting in any queue.
    pub queued: usize,
    pub workers: usize,
    pub balancers: Vec<BalancerRow>,
    pub blocked_ranges: Vec<AddressRange>,
    /// Bounds of generated request durations, if the source reported them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durations: Option<DurationRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationRange {
    pub min: Cycle,
    pub max: Cycle,
}

impl From<RangeInclusive<Cycle>> for DurationRange {
    fn from(range: RangeInclusive<Cycle>) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalancerRow {
    pub label: String,
    pub class: JobClass,
    pub queue_depth: usize,
    pub workers: usize,
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub stats: BalancerStats,
}

impl SimulationReport {
    pub fn from_switch(switch: &Switch) -> Self {
        let balancers: Vec<BalancerRow> = switch
            .all_balancers()
            .map(|(class, lb)| BalancerRow {
                label: lb.label().to_string(),
                class,
                queue_depth: lb.queue_depth(),
                workers: lb.worker_count(),
                thresholds: lb.thresholds(),
                stats: lb.stats().clone(),
            })
            .collect();

        let stats = switch.stats();
        Self {
            cycles: stats.cycles,
            routed: stats.routed,
            blocked: stats.blocked,
            queued: switch.total_queue_depth(),
            workers: balancers.iter().map(|b| b.workers).sum(),
            balancers,
            blocked_ranges: switch.blocked_ranges().to_vec(),
            durations: None,
        }
    }

    pub fn with_durations(mut self, durations: Option<RangeInclusive<Cycle>>) -> Self {
        self.durations = durations.map(DurationRange::from);
        self
    }

    pub fn format_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("\nSimulation finished after {} cycles\n", self.cycles));
        out.push_str(&format!("  Routed:  {}\n", self.routed));
        out.push_str(&format!("  Blocked: {}\n", self.blocked));
        out.push_str(&format!("  Queued:  {}\n", self.queued));
        out.push_str(&format!("  Workers: {}\n", self.workers));
        if let Some(range) = self.durations {
            out.push_str(&format!(
                "  Request time range: {} - {} cycles\n",
                range.min, range.max
            ));
        }
        out.push('\n');

        out.push_str(&format!(
            "  {:<6} {:<10} {:>7} {:>7} {:>9} {:>5} {:>5} {:>5} {:>7}\n",
            "LB", "CLASS", "QUEUE", "WORKERS", "ASSIGNED", "UP", "DOWN", "PEAK", "DROPPED"
        ));
        for row in &self.balancers {
            out.push_str(&format!(
                "  {:<6} {:<10} {:>7} {:>7} {:>9} {:>5} {:>5} {:>5} {:>7}\n",
                row.label,
                row.class.as_str(),
                row.queue_depth,
                row.workers,
                row.stats.assigned,
                row.stats.scale_ups,
                row.stats.scale_downs,
                row.stats.peak_workers,
                row.stats.dropped_in_flight,
            ));
        }

        out.push_str(&format!("\n  Blocked ranges: {}\n", self.blocked_ranges.len()));
        for range in &self.blocked_ranges {
            out.push_str(&format!("    {range}\n"));
        }

        out
    }
}
