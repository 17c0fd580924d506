//! Request sources — where synthetic traffic comes from.
//!
//! The driver asks the source how many requests arrive each cycle and
//! then pulls that many [`Request`]s. [`RandomSource`] is the production
//! implementation; tests plug in their own deterministic sources.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fabric_core::config::RequestConfig;
use fabric_core::{Address, Cycle, JobClass, Request};

use crate::error::{SwitchError, SwitchResult};

/// A stream of requests consumed by the simulation driver.
pub trait RequestSource {
    /// Number of requests arriving during `cycle`.
    fn arrivals(&mut self, cycle: Cycle) -> usize;

    /// Produce the next request. `class` forces the job class; `None`
    /// lets the source choose.
    fn next_request(&mut self, class: Option<JobClass>) -> Request;

    /// Inclusive bounds on generated durations, when the source has them.
    fn duration_range(&self) -> Option<RangeInclusive<Cycle>> {
        None
    }
}

/// Uniformly random traffic from a seedable generator.
///
/// Source and destination addresses span the full 32-bit space, durations
/// are uniform over the configured inclusive range, classes are a fair
/// coin, and arrivals per cycle are uniform over `0..=max_per_cycle`.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
    durations: RangeInclusive<Cycle>,
    max_per_cycle: usize,
}

impl RandomSource {
    /// Create a source. With `seed == None` the generator is seeded from
    /// OS entropy and runs are not reproducible.
    pub fn new(
        durations: RangeInclusive<Cycle>,
        max_per_cycle: usize,
        seed: Option<u64>,
    ) -> SwitchResult<Self> {
        if durations.is_empty() {
            return Err(SwitchError::InvalidDurations {
                min: *durations.start(),
                max: *durations.end(),
            });
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            durations,
            max_per_cycle,
        })
    }

    pub fn from_config(config: &RequestConfig, seed: Option<u64>) -> SwitchResult<Self> {
        Self::new(
            config.min_duration..=config.max_duration,
            config.max_per_cycle,
            seed,
        )
    }

    pub fn durations(&self) -> &RangeInclusive<Cycle> {
        &self.durations
    }

    fn random_address(&mut self) -> Address {
        Address::new(self.rng.gen_range(0..=u32::MAX))
    }
}

impl RequestSource for RandomSource {
    fn arrivals(&mut self, _cycle: Cycle) -> usize {
        self.rng.gen_range(0..=self.max_per_cycle)
    }

    fn next_request(&mut self, class: Option<JobClass>) -> Request {
        let source = self.random_address();
        let destination = self.random_address();
        let duration = self.rng.gen_range(self.durations.clone());
        let class = class.unwrap_or_else(|| {
            if self.rng.gen_bool(0.5) {
                JobClass::Primary
            } else {
                JobClass::Secondary
            }
        });
        Request::new(source, destination, duration, class)
    }

    fn duration_range(&self) -> Option<RangeInclusive<Cycle>> {
        Some(self.durations.clone())
    }
}
