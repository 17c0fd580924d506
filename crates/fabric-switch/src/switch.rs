//! Switch — admission filter and least-loaded routing across balancer
//! pools.
//!
//! Routing is deterministic: within a pool the balancer with the strictly
//! smallest queue wins, and ties go to the earliest-registered balancer.
//! Balancers tick in a fixed order (primary pool, then secondary, each in
//! registration order) so logs and tests are reproducible.

use serde::Serialize;
use tracing::{debug, info, trace};

use fabric_balancer::{LoadBalancer, ScaleDecision};
use fabric_core::{Address, AddressRange, Cycle, FabricConfig, JobClass, Request};

use crate::error::{SwitchError, SwitchResult};

/// What happened to a routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Source address matched a blocked range; the request was dropped.
    Blocked,
    /// Enqueued on `balancers(class)[index]`.
    Enqueued { class: JobClass, index: usize },
}

/// Aggregate results of one [`Switch::advance_cycle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub assigned: usize,
    pub scale_ups: usize,
    pub scale_downs: usize,
}

/// Lifetime counters kept by the switch itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchStats {
    pub routed: u64,
    pub blocked: u64,
    pub routed_primary: u64,
    pub routed_secondary: u64,
    pub cycles: u64,
}

/// Root owner of the simulated topology.
#[derive(Debug)]
pub struct Switch {
    primary: Vec<LoadBalancer>,
    secondary: Vec<LoadBalancer>,
    blocked: Vec<AddressRange>,
    stats: SwitchStats,
}

impl Switch {
    pub fn new(
        primary: Vec<LoadBalancer>,
        secondary: Vec<LoadBalancer>,
        blocked: Vec<AddressRange>,
    ) -> Self {
        Self {
            primary,
            secondary,
            blocked,
            stats: SwitchStats::default(),
        }
    }

    /// Build both pools from a run configuration.
    ///
    /// Balancers are labelled `1P`, `2P`, ... and `1S`, `2S`, ... in
    /// registration order.
    pub fn from_config(config: &FabricConfig) -> SwitchResult<Self> {
        let build = |class: JobClass| -> SwitchResult<Vec<LoadBalancer>> {
            let pool = config.pool(class);
            (1..=pool.balancers)
                .map(|n| {
                    LoadBalancer::new(
                        format!("{n}{}", class.code()),
                        pool.workers_per_balancer,
                        config.scaling.cooldown_cycles,
                    )
                    .map_err(SwitchError::from)
                })
                .collect()
        };

        let switch = Self::new(
            build(JobClass::Primary)?,
            build(JobClass::Secondary)?,
            config.blocked.clone(),
        );
        info!(
            primary = switch.primary.len(),
            secondary = switch.secondary.len(),
            blocked_ranges = switch.blocked.len(),
            cooldown = config.scaling.cooldown_cycles,
            "switch initialized"
        );
        Ok(switch)
    }

    /// Filter, select, and enqueue a single request.
    ///
    /// Blocked requests are dropped and reported as
    /// [`RouteOutcome::Blocked`]; this is a policy outcome, not an error.
    /// Routing to a class with no balancers fails with
    /// [`SwitchError::EmptyPool`].
    pub fn route(&mut self, request: Request) -> SwitchResult<RouteOutcome> {
        if self.is_blocked(&request) {
            self.stats.blocked += 1;
            debug!(source = %request.source(), class = %request.class(), "blocked request");
            return Ok(RouteOutcome::Blocked);
        }

        let class = request.class();
        let index = self
            .least_loaded(class)
            .ok_or(SwitchError::EmptyPool(class))?;

        let balancer = &mut self.pool_mut(class)[index];
        trace!(balancer = balancer.label(), %request, "routed request");
        balancer.enqueue(request);

        self.stats.routed += 1;
        match class {
            JobClass::Primary => self.stats.routed_primary += 1,
            JobClass::Secondary => self.stats.routed_secondary += 1,
        }
        Ok(RouteOutcome::Enqueued { class, index })
    }

    /// Index of the balancer with the smallest queue, first one on ties.
    pub fn least_loaded(&self, class: JobClass) -> Option<usize> {
        self.balancers(class)
            .iter()
            .enumerate()
            .min_by_key(|(_, lb)| lb.queue_depth())
            .map(|(i, _)| i)
    }

    /// Tick every balancer once: primary pool first, then secondary.
    pub fn advance_cycle(&mut self, now: Cycle) -> CycleReport {
        let mut report = CycleReport::default();
        for class in JobClass::ALL {
            for balancer in self.pool_mut(class).iter_mut() {
                let tick = balancer.tick(now);
                report.assigned += tick.assigned;
                match tick.decision {
                    ScaleDecision::ScaleUp => report.scale_ups += 1,
                    ScaleDecision::ScaleDown => report.scale_downs += 1,
                    ScaleDecision::NoChange => {}
                }
            }
        }

        // Switch bookkeeping only after every balancer has ticked.
        self.stats.cycles += 1;
        report
    }

    pub fn is_blocked(&self, request: &Request) -> bool {
        self.is_blocked_address(request.source())
    }

    pub fn is_blocked_address(&self, addr: Address) -> bool {
        self.blocked.iter().any(|range| range.contains(addr))
    }

    pub fn balancers(&self, class: JobClass) -> &[LoadBalancer] {
        match class {
            JobClass::Primary => &self.primary,
            JobClass::Secondary => &self.secondary,
        }
    }

    /// All balancers in tick order.
    pub fn all_balancers(&self) -> impl Iterator<Item = (JobClass, &LoadBalancer)> {
        JobClass::ALL
            .into_iter()
            .flat_map(move |class| self.balancers(class).iter().map(move |lb| (class, lb)))
    }

    pub fn blocked_ranges(&self) -> &[AddressRange] {
        &self.blocked
    }

    pub fn total_queue_depth(&self) -> usize {
        self.all_balancers().map(|(_, lb)| lb.queue_depth()).sum()
    }

    pub fn queue_depth_by_class(&self, class: JobClass) -> usize {
        self.balancers(class).iter().map(LoadBalancer::queue_depth).sum()
    }

    pub fn worker_count_by_class(&self, class: JobClass) -> usize {
        self.balancers(class).iter().map(LoadBalancer::worker_count).sum()
    }

    pub fn stats(&self) -> &SwitchStats {
        &self.stats
    }

    fn pool_mut(&mut self, class: JobClass) -> &mut Vec<LoadBalancer> {
        match class {
            JobClass::Primary => &mut self.primary,
            JobClass::Secondary => &mut self.secondary,
        }
    }
}
