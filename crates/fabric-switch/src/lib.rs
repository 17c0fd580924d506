//! fabric-switch — the top tier of the request fabric.
//!
//! The [`Switch`] owns every [`LoadBalancer`](fabric_balancer::LoadBalancer),
//! grouped into one pool per job class. Requests pass a source-address
//! blocklist, then land on the least-loaded balancer of their class.
//!
//! # Architecture
//!
//! ```text
//! Simulation (driver loop, owns the cycle counter)
//!   ├── RequestSource (seeded random or test-supplied)
//!   └── Switch
//!       ├── blocked: [AddressRange]
//!       ├── primary:   [LoadBalancer 1P, 2P, ...]
//!       └── secondary: [LoadBalancer 1S, 2S, ...]
//! ```

pub mod error;
pub mod report;
pub mod simulation;
pub mod source;
pub mod switch;

pub use error::{SwitchError, SwitchResult};
pub use report::{BalancerRow, DurationRange, SimulationReport};
pub use simulation::{CycleSummary, Simulation};
pub use source::{RandomSource, RequestSource};
pub use switch::{CycleReport, RouteOutcome, Switch, SwitchStats};
