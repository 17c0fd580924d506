//! fabric.toml run configuration.
//!
//! Every section is optional; missing values fall back to the defaults
//! below. The configuration is read once at startup and treated as an
//! immutable snapshot for the lifetime of the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::AddressRange;
use crate::error::{ConfigError, ConfigResult};
use crate::request::{Cycle, JobClass};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricConfig {
    pub primary: PoolConfig,
    pub secondary: PoolConfig,
    pub scaling: ScalingConfig,
    pub requests: RequestConfig,
    pub simulation: SimulationConfig,
    /// Source-address ranges dropped at admission.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked: Vec<AddressRange>,
}

/// Balancer layout for one job class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub balancers: usize,
    pub workers_per_balancer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Minimum cycles between two scaling actions on one balancer.
    pub cooldown_cycles: Cycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub min_duration: Cycle,
    pub max_duration: Cycle,
    /// Upper bound (inclusive) on requests injected per cycle.
    pub max_per_cycle: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cycles: Cycle,
    /// Seed for the request stream. Unset means OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            balancers: 1,
            workers_per_balancer: 1,
        }
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self { cooldown_cycles: 3 }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            min_duration: 1,
            max_duration: 5,
            max_per_cycle: 5,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: 2000,
            seed: None,
        }
    }
}

impl FabricConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn pool(&self, class: JobClass) -> &PoolConfig {
        match class {
            JobClass::Primary => &self.primary,
            JobClass::Secondary => &self.secondary,
        }
    }

    /// Reject configurations the fabric cannot run.
    ///
    /// Both pools need at least one balancer because the request source
    /// draws from both classes. Inverted blocked ranges are kept as given
    /// but logged, since they can never match.
    pub fn validate(&self) -> ConfigResult<()> {
        for class in JobClass::ALL {
            let pool = self.pool(class);
            if pool.balancers == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{class} pool needs at least one balancer"
                )));
            }
            if pool.workers_per_balancer == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{class} balancers need at least one worker"
                )));
            }
        }

        if self.requests.min_duration > self.requests.max_duration {
            return Err(ConfigError::Invalid(format!(
                "request duration range is empty: min {} > max {}",
                self.requests.min_duration, self.requests.max_duration
            )));
        }

        if self.simulation.cycles == 0 {
            return Err(ConfigError::Invalid("cycle count must be positive".to_string()));
        }

        for range in &self.blocked {
            if range.is_inverted() {
                warn!(%range, "blocked range is inverted and matches no address");
            }
        }

        Ok(())
    }
}
