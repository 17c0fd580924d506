//! IPv4-style addresses and inclusive address ranges.
//!
//! An [`Address`] is a plain 32-bit value with a total order, so range
//! membership is two integer comparisons. Parsing is strict: exactly four
//! dot-separated decimal octets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// A 32-bit source or destination address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(u32);

impl Address {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn from_octets(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(u32::from_be_bytes([a, b, c, d]))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidFormat(s.to_string());

        let mut octets = [0u8; 4];
        let mut parts = s.trim().split('.');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let value: u32 = part.parse().map_err(|_| invalid())?;
            *slot = u8::try_from(value).map_err(|_| AddressError::OctetOutOfRange {
                input: s.to_string(),
                octet: value,
            })?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        let [a, b, c, d] = octets;
        Ok(Self::from_octets(a, b, c, d))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// An inclusive `[low, high]` range of addresses.
///
/// Ranges are trusted as given: an inverted range (`low > high`) is kept
/// and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub low: Address,
    pub high: Address,
}

impl AddressRange {
    pub const fn new(low: Address, high: Address) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.low <= addr && addr <= self.high
    }

    pub fn is_inverted(&self) -> bool {
        self.low > self.high
    }
}

/// Parses the `"a.b.c.d - e.f.g.h"` form.
impl FromStr for AddressRange {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| AddressError::InvalidFormat(s.to_string()))?;
        Ok(Self::new(low.parse()?, high.parse()?))
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn parse_dotted_quad() {
        let a = addr("10.0.0.50");
        assert_eq!(a.octets(), [10, 0, 0, 50]);
        assert_eq!(a.value(), (10 << 24) | 50);
        assert_eq!(a.to_string(), "10.0.0.50");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(addr("  192.168.1.1\n"), Address::from_octets(192, 168, 1, 1));
    }

    #[test]
    fn parse_extremes() {
        assert_eq!(addr("0.0.0.0").value(), 0);
        assert_eq!(addr("255.255.255.255").value(), u32::MAX);
    }

    #[test]
    fn rejects_bad_format() {
        for input in ["", "1.2.3", "1.2.3.4.5", "1..3.4", "a.b.c.d", "1.2.3.4x", "-1.2.3.4", "1,2,3,4"] {
            assert!(
                matches!(input.parse::<Address>(), Err(AddressError::InvalidFormat(_))),
                "expected format error for {input:?}"
            );
        }
    }

    #[test]
    fn rejects_octet_out_of_range() {
        let err = "10.0.256.1".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            AddressError::OctetOutOfRange {
                input: "10.0.256.1".to_string(),
                octet: 256
            }
        );
    }

    #[test]
    fn ordering_follows_numeric_value() {
        assert!(addr("9.255.255.255") < addr("10.0.0.0"));
        assert!(addr("10.0.0.2") > addr("10.0.0.1"));
    }

    #[test]
    fn range_membership_is_inclusive() {
        let range: AddressRange = "10.0.0.1 - 10.0.0.255".parse().unwrap();
        assert!(range.contains(addr("10.0.0.1")));
        assert!(range.contains(addr("10.0.0.255")));
        assert!(range.contains(addr("10.0.0.50")));
        assert!(!range.contains(addr("10.0.0.0")));
        assert!(!range.contains(addr("10.0.1.0")));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let range = AddressRange::new(addr("10.0.0.9"), addr("10.0.0.1"));
        assert!(range.is_inverted());
        assert!(!range.contains(addr("10.0.0.5")));
        assert!(!range.contains(addr("10.0.0.1")));
    }

    #[test]
    fn range_without_dash_is_rejected() {
        assert!("10.0.0.1 10.0.0.2".parse::<AddressRange>().is_err());
    }

    #[test]
    fn serde_uses_dotted_quad() {
        #[derive(Deserialize, Serialize)]
        struct Wrapper {
            addr: Address,
        }
        let w: Wrapper = toml::from_str(r#"addr = "172.16.0.1""#).unwrap();
        assert_eq!(w.addr, Address::from_octets(172, 16, 0, 1));
        assert!(toml::to_string(&w).unwrap().contains("\"172.16.0.1\""));

        assert!(toml::from_str::<Wrapper>(r#"addr = "300.1.1.1""#).is_err());
    }
}
