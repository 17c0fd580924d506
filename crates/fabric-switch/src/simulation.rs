//! Simulation driver — the synchronous per-cycle loop.
//!
//! Each cycle: ask the source how many requests arrive, route each one,
//! then advance every balancer exactly once. The driver owns the cycle
//! counter; nothing in the switch has a clock of its own.
//!
//! A cycle either applies completely or not at all. The whole batch is
//! drawn and checked against the pools before any request is enqueued.

use tracing::{debug, info, info_span, trace};

use fabric_core::{Cycle, Request};

use crate::error::{SwitchError, SwitchResult};
use crate::report::SimulationReport;
use crate::source::RequestSource;
use crate::switch::{CycleReport, RouteOutcome, Switch};

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: Cycle,
    pub arrivals: usize,
    pub routed: usize,
    pub blocked: usize,
    pub ticks: CycleReport,
}

pub struct Simulation<S> {
    switch: Switch,
    source: S,
    cycle: Cycle,
}

impl<S: RequestSource> Simulation<S> {
    pub fn new(switch: Switch, source: S) -> Self {
        Self {
            switch,
            source,
            cycle: 0,
        }
    }

    /// The next cycle to run.
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a single cycle.
    ///
    /// Fails with [`SwitchError::EmptyPool`] if any unblocked arrival has
    /// no balancer for its class; the switch is left untouched and the
    /// cycle counter does not advance.
    pub fn step(&mut self) -> SwitchResult<CycleSummary> {
        let span = info_span!("cycle", cycle = self.cycle);
        let _guard = span.enter();

        let arrivals = self.source.arrivals(self.cycle);
        let batch: Vec<Request> = (0..arrivals)
            .map(|_| self.source.next_request(None))
            .collect();
        self.check_batch(&batch)?;

        let mut routed = 0;
        let mut blocked = 0;
        for request in batch {
            trace!(%request, "generated request");
            match self.switch.route(request)? {
                RouteOutcome::Blocked => blocked += 1,
                RouteOutcome::Enqueued { .. } => routed += 1,
            }
        }

        let ticks = self.switch.advance_cycle(self.cycle);
        debug!(
            arrivals,
            routed,
            blocked,
            assigned = ticks.assigned,
            queued = self.switch.total_queue_depth(),
            "cycle complete"
        );

        let summary = CycleSummary {
            cycle: self.cycle,
            arrivals,
            routed,
            blocked,
            ticks,
        };
        self.cycle += 1;
        Ok(summary)
    }

    /// Run `cycles` cycles and summarize the final state.
    pub fn run(&mut self, cycles: Cycle) -> SwitchResult<SimulationReport> {
        info!(start = self.cycle, cycles, "simulation starting");
        for _ in 0..cycles {
            self.step()?;
        }

        let report = self.report();
        info!(
            cycles = report.cycles,
            routed = report.routed,
            blocked = report.blocked,
            queued = report.queued,
            workers = report.workers,
            "simulation finished"
        );
        Ok(report)
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_switch(&self.switch).with_durations(self.source.duration_range())
    }

    fn check_batch(&self, batch: &[Request]) -> SwitchResult<()> {
        match batch
            .iter()
            .find(|r| !self.switch.is_blocked(r) && self.switch.balancers(r.class()).is_empty())
        {
            Some(request) => Err(SwitchError::EmptyPool(request.class())),
            None => Ok(()),
        }
    }
}
