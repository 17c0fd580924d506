//! fabric-core — value types and run configuration shared by the
//! request fabric crates.
//!
//! Everything here is immutable once constructed. Addresses are
//! validated at parse time so the routing and scaling layers only ever
//! see well-formed values.

pub mod address;
pub mod config;
pub mod error;
pub mod request;

pub use address::{Address, AddressRange};
pub use config::FabricConfig;
pub use error::{AddressError, ConfigError, ConfigResult};
pub use request::{Cycle, JobClass, Request};
