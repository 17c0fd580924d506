//! Job descriptors flowing through the fabric.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// One discrete simulation time step.
pub type Cycle = u64;

/// The two job classes that partition both requests and balancer pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobClass {
    Primary,
    Secondary,
}

impl JobClass {
    /// Pool order: primary balancers tick before secondary ones.
    pub const ALL: [JobClass; 2] = [JobClass::Primary, JobClass::Secondary];

    /// One-letter tag used in balancer labels (`1P`, `2S`, ...).
    pub fn code(self) -> char {
        match self {
            JobClass::Primary => 'P',
            JobClass::Secondary => 'S',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobClass::Primary => "primary",
            JobClass::Secondary => "secondary",
        }
    }
}

impl fmt::Display for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable unit of work: where it came from, where it goes, how
/// many cycles it occupies a worker, and which pool serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    source: Address,
    destination: Address,
    duration: Cycle,
    class: JobClass,
}

impl Request {
    pub fn new(source: Address, destination: Address, duration: Cycle, class: JobClass) -> Self {
        Self {
            source,
            destination,
            duration,
            class,
        }
    }

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    /// Processing time in cycles.
    pub fn duration(&self) -> Cycle {
        self.duration
    }

    pub fn class(&self) -> JobClass {
        self.class
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} | time={} | job={}",
            self.source,
            self.destination,
            self.duration,
            self.class.code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_codes() {
        assert_eq!(JobClass::Primary.code(), 'P');
        assert_eq!(JobClass::Secondary.code(), 'S');
        assert_eq!(JobClass::ALL, [JobClass::Primary, JobClass::Secondary]);
    }

    #[test]
    fn request_display() {
        let req = Request::new(
            Address::from_octets(1, 2, 3, 4),
            Address::from_octets(5, 6, 7, 8),
            3,
            JobClass::Secondary,
        );
        assert_eq!(req.to_string(), "1.2.3.4 -> 5.6.7.8 | time=3 | job=S");
    }
}
