//! A single-request execution slot.

use fabric_core::{Cycle, Request};

/// One server in a balancer's pool.
///
/// The worker is a plain state holder. It does not guard against being
/// assigned while busy; only the owning balancer assigns work, and it
/// only does so after checking [`Worker::is_busy`].
#[derive(Debug, Clone)]
pub struct Worker {
    id: u32,
    busy_until: Cycle,
    current: Option<Request>,
}

impl Worker {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            busy_until: 0,
            current: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// First cycle at which the worker is free again.
    pub fn busy_until(&self) -> Cycle {
        self.busy_until
    }

    pub fn is_busy(&self, now: Cycle) -> bool {
        now < self.busy_until
    }

    /// Most recently assigned request, if any.
    pub fn current_request(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    pub(crate) fn assign(&mut self, request: Request, now: Cycle) {
        self.busy_until = now.saturating_add(request.duration());
        self.current = Some(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{Address, JobClass};

    fn req(duration: Cycle) -> Request {
        Request::new(Address::new(1), Address::new(2), duration, JobClass::Primary)
    }

    #[test]
    fn new_worker_is_idle() {
        let worker = Worker::new(1);
        assert!(!worker.is_busy(0));
        assert!(worker.current_request().is_none());
    }

    #[test]
    fn busy_until_start_plus_duration() {
        let mut worker = Worker::new(1);
        worker.assign(req(3), 10);

        assert_eq!(worker.busy_until(), 13);
        assert!(worker.is_busy(10));
        assert!(worker.is_busy(12));
        assert!(!worker.is_busy(13));
        assert_eq!(worker.current_request().map(Request::duration), Some(3));
    }

    #[test]
    fn zero_duration_frees_immediately() {
        let mut worker = Worker::new(1);
        worker.assign(req(0), 5);
        assert!(!worker.is_busy(5));
    }

    #[test]
    fn busy_until_saturates() {
        let mut worker = Worker::new(1);
        worker.assign(req(Cycle::MAX), 1);

        assert_eq!(worker.busy_until(), Cycle::MAX);
        assert!(worker.is_busy(Cycle::MAX - 1));
    }
}
