//! Unbounded FIFO admission buffer.

use std::collections::VecDeque;

use fabric_core::Request;

/// Requests waiting for a worker, oldest first.
///
/// There is no capacity limit; backpressure shows up only as queue depth,
/// which drives the scaler.
#[derive(Debug, Default)]
pub struct RequestQueue {
    inner: VecDeque<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.inner.push_back(request);
    }

    pub fn pop(&mut self) -> Option<Request> {
        self.inner.pop_front()
    }

    pub fn front(&self) -> Option<&Request> {
        self.inner.front()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{Address, JobClass};

    fn req(duration: u64) -> Request {
        Request::new(Address::new(1), Address::new(2), duration, JobClass::Primary)
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut queue = RequestQueue::new();
        for d in 1..=3 {
            queue.push(req(d));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().map(Request::duration), Some(1));

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop())
            .map(|r| r.duration())
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut queue = RequestQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.front().is_none());
    }
}
