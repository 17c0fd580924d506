//! Load balancer — a FIFO queue in front of an autoscaled worker pool.
//!
//! Each [`LoadBalancer::tick`] runs two passes in a fixed order:
//!
//! 1. **Assignment**: walk the pool in insertion order and give the queue
//!    head to every worker that is idle this cycle. A worker receives at
//!    most one request per tick.
//! 2. **Scaling**: feed the *remaining* backlog to the [`Scaler`] and add
//!    or remove at most one worker.
//!
//! Workers are removed LIFO (newest first), so ids stay dense `1..=N`.

use serde::Serialize;
use tracing::{debug, info, warn};

use fabric_core::{Cycle, Request};

use crate::error::{BalancerError, BalancerResult};
use crate::queue::RequestQueue;
use crate::scaler::{ScaleDecision, Scaler, Thresholds};
use crate::worker::Worker;

/// Lifetime counters for one balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalancerStats {
    pub enqueued: u64,
    pub assigned: u64,
    pub scale_ups: u64,
    pub scale_downs: u64,
    pub peak_workers: usize,
    /// Requests lost because the newest worker was removed while busy.
    pub dropped_in_flight: u64,
}

/// Outcome of a single [`LoadBalancer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub assigned: usize,
    pub decision: ScaleDecision,
}

/// A request queue plus the worker pool that drains it.
#[derive(Debug)]
pub struct LoadBalancer {
    label: String,
    queue: RequestQueue,
    workers: Vec<Worker>,
    scaler: Scaler,
    stats: BalancerStats,
}

impl LoadBalancer {
    /// Create a balancer with `initial_workers` workers (ids `1..=n`).
    pub fn new(
        label: impl Into<String>,
        initial_workers: usize,
        cooldown: Cycle,
    ) -> BalancerResult<Self> {
        let label = label.into();
        if initial_workers == 0 {
            return Err(BalancerError::EmptyWorkerPool(label));
        }

        let mut balancer = Self {
            label,
            queue: RequestQueue::new(),
            workers: Vec::with_capacity(initial_workers),
            scaler: Scaler::new(cooldown, 0),
            stats: BalancerStats::default(),
        };
        for _ in 0..initial_workers {
            balancer.add_worker();
        }
        Ok(balancer)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append a request to the tail of the queue. Never rejects.
    pub fn enqueue(&mut self, request: Request) {
        self.queue.push(request);
        self.stats.enqueued += 1;
    }

    /// Advance this balancer by one cycle: assignment, then scaling.
    pub fn tick(&mut self, now: Cycle) -> TickReport {
        let assigned = self.assign_idle_workers(now);

        let decision = self
            .scaler
            .evaluate(now, self.queue.len(), self.workers.len());
        match decision {
            ScaleDecision::ScaleUp => {
                self.add_worker();
                self.stats.scale_ups += 1;
            }
            ScaleDecision::ScaleDown => {
                self.remove_worker(now);
                self.stats.scale_downs += 1;
            }
            ScaleDecision::NoChange => {}
        }

        TickReport { assigned, decision }
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn busy_workers(&self, now: Cycle) -> usize {
        self.workers.iter().filter(|w| w.is_busy(now)).count()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.scaler.thresholds()
    }

    pub fn last_scale_cycle(&self) -> Cycle {
        self.scaler.last_scale()
    }

    pub fn cooldown_cycles(&self) -> Cycle {
        self.scaler.cooldown()
    }

    pub fn stats(&self) -> &BalancerStats {
        &self.stats
    }

    fn assign_idle_workers(&mut self, now: Cycle) -> usize {
        let mut assigned = 0;
        for worker in &mut self.workers {
            if self.queue.is_empty() {
                break;
            }
            if worker.is_busy(now) {
                continue;
            }
            if let Some(request) = self.queue.pop() {
                worker.assign(request, now);
                assigned += 1;
            }
        }

        self.stats.assigned += assigned as u64;
        if assigned > 0 {
            debug!(
                balancer = %self.label,
                cycle = now,
                assigned,
                remaining = self.queue.len(),
                "assigned queued requests"
            );
        }
        assigned
    }

    fn add_worker(&mut self) {
        let id = self.workers.len() as u32 + 1;
        self.workers.push(Worker::new(id));
        self.scaler.rethreshold(self.workers.len());
        self.stats.peak_workers = self.stats.peak_workers.max(self.workers.len());
        info!(
            balancer = %self.label,
            worker = id,
            total = self.workers.len(),
            "added worker"
        );
    }

    /// Remove the newest worker, busy or not.
    fn remove_worker(&mut self, now: Cycle) {
        let Some(worker) = self.workers.pop() else {
            return;
        };
        self.scaler.rethreshold(self.workers.len());

        if worker.is_busy(now) {
            self.stats.dropped_in_flight += 1;
            warn!(
                balancer = %self.label,
                worker = worker.id(),
                busy_until = worker.busy_until(),
                "removed busy worker, in-flight request dropped"
            );
        }
        info!(
            balancer = %self.label,
            worker = worker.id(),
            total = self.workers.len(),
            "removed worker"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{Address, JobClass};

    fn req(seq: u32, duration: Cycle) -> Request {
        Request::new(Address::new(seq), Address::new(seq), duration, JobClass::Primary)
    }

    fn fill(lb: &mut LoadBalancer, count: u32, duration: Cycle) {
        for seq in 0..count {
            lb.enqueue(req(seq, duration));
        }
    }

    fn worker_ids(lb: &LoadBalancer) -> Vec<u32> {
        lb.workers().iter().map(Worker::id).collect()
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = LoadBalancer::new("1P", 0, 3).unwrap_err();
        assert_eq!(err, BalancerError::EmptyWorkerPool("1P".to_string()));
    }

    #[test]
    fn initial_pool_has_sequential_ids_and_thresholds() {
        let lb = LoadBalancer::new("1P", 3, 3).unwrap();
        assert_eq!(worker_ids(&lb), vec![1, 2, 3]);
        assert_eq!(lb.thresholds(), Thresholds { low: 150, high: 240 });
        assert_eq!(lb.stats().peak_workers, 3);
        assert_eq!(lb.queue_depth(), 0);
        assert_eq!(lb.cooldown_cycles(), 3);
        assert_eq!(lb.last_scale_cycle(), 0);
    }

    #[test]
    fn assignment_is_fifo_in_worker_order() {
        let mut lb = LoadBalancer::new("1P", 2, 100).unwrap();
        fill(&mut lb, 6, 1);

        let report = lb.tick(0);
        assert_eq!(report.assigned, 2);
        let current: Vec<u32> = lb
            .workers()
            .iter()
            .filter_map(|w| w.current_request())
            .map(|r| r.source().value())
            .collect();
        assert_eq!(current, vec![0, 1]);

        lb.tick(1);
        let current: Vec<u32> = lb
            .workers()
            .iter()
            .filter_map(|w| w.current_request())
            .map(|r| r.source().value())
            .collect();
        assert_eq!(current, vec![2, 3]);
        let waiting: Vec<u32> = lb.queue().iter().map(|r| r.source().value()).collect();
        assert_eq!(waiting, vec![4, 5]);
    }

    #[test]
    fn busy_workers_are_skipped() {
        let mut lb = LoadBalancer::new("1P", 2, 100).unwrap();
        lb.enqueue(req(0, 5));
        lb.tick(0);
        fill(&mut lb, 3, 1);

        let report = lb.tick(1);
        assert_eq!(report.assigned, 1);
        assert_eq!(lb.busy_workers(1), 2);
        assert_eq!(lb.queue_depth(), 2);
    }

    #[test]
    fn one_assignment_per_worker_per_tick() {
        // Zero-duration work leaves the worker idle, but it still only
        // takes one request per tick.
        let mut lb = LoadBalancer::new("1P", 1, 100).unwrap();
        fill(&mut lb, 5, 0);

        for now in 0..5 {
            let report = lb.tick(now);
            assert_eq!(report.assigned, 1);
            assert_eq!(lb.queue_depth(), 4 - now as usize);
        }
        assert_eq!(lb.stats().assigned, 5);
    }

    #[test]
    fn huge_duration_keeps_worker_busy() {
        let mut lb = LoadBalancer::new("1P", 1, 100).unwrap();
        lb.enqueue(req(0, Cycle::MAX));
        lb.tick(1);

        assert_eq!(lb.workers()[0].busy_until(), Cycle::MAX);
        assert_eq!(lb.busy_workers(Cycle::MAX - 1), 1);
        lb.enqueue(req(1, 1));
        assert_eq!(lb.tick(2).assigned, 0);
        assert_eq!(lb.queue_depth(), 1);
    }

    #[test]
    fn queue_depth_never_grows_without_enqueues() {
        let mut lb = LoadBalancer::new("1P", 2, 1).unwrap();
        fill(&mut lb, 300, 3);

        let mut previous = lb.queue_depth();
        for now in 0..200 {
            lb.tick(now);
            assert!(lb.queue_depth() <= previous);
            assert!(lb.worker_count() >= 1);
            previous = lb.queue_depth();
        }
    }

    #[test]
    fn scale_up_after_cooldown_when_backlog_exceeds_high() {
        let mut lb = LoadBalancer::new("1P", 2, 3).unwrap();
        assert_eq!(lb.thresholds(), Thresholds { low: 100, high: 160 });
        fill(&mut lb, 165, 10);

        for now in 0..3 {
            let report = lb.tick(now);
            assert_eq!(report.decision, ScaleDecision::NoChange);
            assert_eq!(lb.worker_count(), 2);
        }
        assert_eq!(lb.queue_depth(), 163);

        let report = lb.tick(3);
        assert_eq!(report.decision, ScaleDecision::ScaleUp);
        assert_eq!(worker_ids(&lb), vec![1, 2, 3]);
        assert_eq!(lb.last_scale_cycle(), 3);
        assert_eq!(lb.thresholds(), Thresholds { low: 150, high: 240 });

        // The new worker picks up work on the next tick; cooldown holds.
        let report = lb.tick(4);
        assert_eq!(report.assigned, 1);
        assert_eq!(report.decision, ScaleDecision::NoChange);
        assert_eq!(lb.stats().scale_ups, 1);
    }

    #[test]
    fn no_scale_up_when_residual_backlog_is_under_high() {
        let mut lb = LoadBalancer::new("1P", 2, 3).unwrap();
        fill(&mut lb, 165, 1);

        for now in 0..4 {
            lb.tick(now);
        }
        assert_eq!(lb.queue_depth(), 157);
        assert_eq!(lb.worker_count(), 2);
        assert_eq!(lb.stats().scale_ups, 0);
    }

    #[test]
    fn scale_down_removes_newest_and_respects_floor() {
        let mut lb = LoadBalancer::new("1P", 3, 2).unwrap();
        fill(&mut lb, 10, 1);

        lb.tick(0);
        lb.tick(1);
        let report = lb.tick(2);
        assert_eq!(report.decision, ScaleDecision::ScaleDown);
        assert_eq!(worker_ids(&lb), vec![1, 2]);
        assert_eq!(lb.thresholds(), Thresholds { low: 100, high: 160 });
        // Worker 3 had just been assigned at cycle 2.
        assert_eq!(lb.stats().dropped_in_flight, 1);

        assert_eq!(lb.tick(3).decision, ScaleDecision::NoChange);
        assert_eq!(lb.tick(4).decision, ScaleDecision::ScaleDown);
        assert_eq!(worker_ids(&lb), vec![1]);

        for now in 5..20 {
            assert_eq!(lb.tick(now).decision, ScaleDecision::NoChange);
        }
        assert_eq!(lb.worker_count(), 1);
        assert_eq!(lb.stats().scale_downs, 2);
    }

    #[test]
    fn scaling_actions_respect_cooldown() {
        let cooldown = 4;
        let mut lb = LoadBalancer::new("1P", 1, cooldown).unwrap();
        fill(&mut lb, 2000, 50);

        let mut actions = Vec::new();
        for now in 0..60 {
            if lb.tick(now).decision != ScaleDecision::NoChange {
                actions.push(now);
            }
        }
        assert!(actions.len() > 1);
        for pair in actions.windows(2) {
            assert!(pair[1] - pair[0] >= cooldown);
        }
    }

    #[test]
    fn thresholds_follow_every_resize() {
        let mut lb = LoadBalancer::new("1P", 1, 0).unwrap();
        fill(&mut lb, 1000, 100);

        for now in 0..10 {
            lb.tick(now);
            let n = lb.worker_count();
            assert_eq!(lb.thresholds(), Thresholds::for_workers(n));
        }
        assert!(lb.worker_count() > 1);
        assert_eq!(lb.stats().peak_workers, lb.worker_count());
    }
}
