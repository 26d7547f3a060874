// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Canonical prefixes of either IP family.

pub mod ip;

pub use ip::{IpPrefix, Ipv4Prefix, Ipv6Prefix, Representable};

use ipnet::IpNet;
use serde::ser::SerializeStructVariant;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
pub use std::net::IpAddr;
pub use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Invalid Prefix: {0}")]
    Invalid(String),
    #[error("Mask length {0} is invalid")]
    InvalidLength(u8),
    #[error("Address {addr} and mask {mask} belong to distinct IP families")]
    FamilyMismatch { addr: IpAddr, mask: IpAddr },
}

/// A prefix with no host bits set, of either family. This is what tables report back for their
/// matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Prefix {
    IPV4(Ipv4Prefix),
    IPV6(Ipv6Prefix),
}

impl Prefix {
    /// `0.0.0.0/0`
    #[must_use]
    pub fn root_v4() -> Prefix {
        Prefix::IPV4(Ipv4Prefix::ROOT)
    }

    /// `::/0`
    #[must_use]
    pub fn root_v6() -> Prefix {
        Prefix::IPV6(Ipv6Prefix::ROOT)
    }

    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Prefix::IPV6(_))
    }

    /// The network address
    #[must_use]
    pub fn as_address(&self) -> IpAddr {
        match *self {
            Prefix::IPV4(p) => p.network().into(),
            Prefix::IPV6(p) => p.network().into(),
        }
    }

    /// Length within the family of the prefix
    #[must_use]
    pub fn length(&self) -> u8 {
        match *self {
            Prefix::IPV4(p) => p.len(),
            Prefix::IPV6(p) => p.len(),
        }
    }

    /// Length on the shared 128-bit axis
    #[must_use]
    pub fn axis_length(&self) -> u8 {
        match *self {
            Prefix::IPV4(p) => p.axis_len(),
            Prefix::IPV6(p) => p.axis_len(),
        }
    }

    /// Tell if the address belongs to the prefix. Addresses of the other family never do.
    #[must_use]
    pub fn covers_addr(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (Prefix::IPV4(p), IpAddr::V4(a)) => p.contains(a),
            (Prefix::IPV6(p), IpAddr::V6(a)) => p.contains(a),
            _ => false,
        }
    }
}

impl TryFrom<(IpAddr, u8)> for Prefix {
    type Error = PrefixError;

    fn try_from((addr, len): (IpAddr, u8)) -> Result<Self, Self::Error> {
        Ok(match addr {
            IpAddr::V4(a) => Prefix::IPV4(Ipv4Prefix::new(a, len)?),
            IpAddr::V6(a) => Prefix::IPV6(Ipv6Prefix::new(a, len)?),
        })
    }
}

impl From<Ipv4Prefix> for Prefix {
    fn from(prefix: Ipv4Prefix) -> Self {
        Self::IPV4(prefix)
    }
}

impl From<Ipv6Prefix> for Prefix {
    fn from(prefix: Ipv6Prefix) -> Self {
        Self::IPV6(prefix)
    }
}

/// Host bits of the net are cleared.
impl From<IpNet> for Prefix {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(n) => Self::IPV4(n.into()),
            IpNet::V6(n) => Self::IPV6(n.into()),
        }
    }
}

impl From<Prefix> for IpNet {
    fn from(prefix: Prefix) -> Self {
        match prefix {
            Prefix::IPV4(p) => IpNet::V4(p.into()),
            Prefix::IPV6(p) => IpNet::V6(p.into()),
        }
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    /// Parse `addr/len`, refusing host bits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net = IpNet::from_str(s).map_err(|_| PrefixError::Invalid(s.to_string()))?;
        Prefix::try_from((net.addr(), net.prefix_len()))
    }
}

/// Only for testing. Will panic with badly formatted prefix strings
#[cfg(any(test, feature = "testing"))]
impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        s.parse()
            .unwrap_or_else(|e| panic!("Invalid prefix {s}: {e}"))
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::IPV4(p) => write!(f, "{p}"),
            Prefix::IPV6(p) => write!(f, "{p}"),
        }
    }
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (index, variant) = match self {
            Prefix::IPV4(_) => (0, "IPV4"),
            Prefix::IPV6(_) => (1, "IPV6"),
        };
        let mut s = serializer.serialize_struct_variant("Prefix", index, variant, 2)?;
        s.serialize_field("address", &self.as_address())?;
        s.serialize_field("length", &self.length())?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields<A> {
            address: A,
            length: u8,
        }
        #[derive(Deserialize)]
        enum Tagged {
            IPV4(Fields<Ipv4Addr>),
            IPV6(Fields<Ipv6Addr>),
        }

        let (address, length) = match Tagged::deserialize(deserializer)? {
            Tagged::IPV4(f) => (IpAddr::V4(f.address), f.length),
            Tagged::IPV6(f) => (IpAddr::V6(f.address), f.length),
        };
        Prefix::try_from((address, length)).map_err(serde::de::Error::custom)
    }
}
