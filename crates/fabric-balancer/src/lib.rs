//! fabric-balancer — one load balancer and its worker pool.
//!
//! A [`LoadBalancer`] owns a FIFO [`RequestQueue`] and a pool of
//! [`Worker`]s. Once per cycle it hands queued requests to idle workers
//! and then lets its [`Scaler`] grow or shrink the pool based on the
//! backlog left over.
//!
//! # Scaling Algorithm
//!
//! ```text
//! low  = 50 * workers
//! high = 80 * workers
//!
//! if now - last_scale < cooldown:  NoChange
//! if depth > high:                 ScaleUp   (add newest worker)
//! if depth < low and workers > 1:  ScaleDown (remove newest worker)
//! ```

pub mod balancer;
pub mod error;
pub mod queue;
pub mod scaler;
pub mod worker;

pub use balancer::{BalancerStats, LoadBalancer, TickReport};
pub use error::{BalancerError, BalancerResult};
pub use queue::RequestQueue;
pub use scaler::{ScaleDecision, Scaler, Thresholds};
pub use worker::Worker;
