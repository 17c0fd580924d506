//! Load balancer error types.

use thiserror::Error;

/// Errors raised while constructing a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalancerError {
    #[error("load balancer {0} needs at least one worker")]
    EmptyWorkerPool(String),
}

pub type BalancerResult<T> = Result<T, BalancerError>;
