//! Switch error types.

use thiserror::Error;

use fabric_balancer::BalancerError;
use fabric_core::{Cycle, JobClass};

/// Errors raised while building or driving the switch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    #[error("no load balancers configured for {0} requests")]
    EmptyPool(JobClass),

    #[error("request duration range is empty: min {min} > max {max}")]
    InvalidDurations { min: Cycle, max: Cycle },

    #[error(transparent)]
    Balancer(#[from] BalancerError),
}

pub type SwitchResult<T> = Result<T, SwitchError>;
