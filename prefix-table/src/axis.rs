// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The shared 128-bit address axis.
//!
//! Both address families are stored on a single 128-bit axis. IPv6 addresses are used as they
//! are. IPv4 addresses are placed in the IPv4-mapped block `::ffff:0:0/96` (RFC 4291), so that an
//! IPv4 prefix of length `L` sits at axis length `L + 96`.
//!
//! An axis value belongs to the IPv4 family iff it lies in the mapped block. IPv4 entries are
//! thus always rooted in the mapped block at an axis length of 96 or more, and IPv4 queries only
//! ever consider those lengths. That is what keeps `::/0` from matching IPv4 addresses, and
//! `0.0.0.0/0` from matching native IPv6 addresses.

use crate::prefix::{
    IpAddr, IpPrefix, Ipv4Addr, Ipv4Prefix, Ipv6Addr, Ipv6Prefix, Prefix, Representable,
};
use ipnet::{Ipv4Net, Ipv6Net};

/// Number of distinct prefix lengths on the axis (0 to 128, both included)
pub const AXIS_LENGTHS: usize = 129;

/// Axis length at which the IPv4-mapped block starts
pub const V4_AXIS_OFFSET: u8 = Ipv4Prefix::AXIS_OFFSET;

/// `::ffff:0:0`, the network of the IPv4-mapped block
const V4_MAPPED_NETWORK: u128 = 0xffff << 32;

const fn build_masks() -> [u128; AXIS_LENGTHS] {
    let mut masks = [0u128; AXIS_LENGTHS];
    let mut len = 1;
    while len < AXIS_LENGTHS {
        masks[len] = u128::MAX << (128 - len);
        len += 1;
    }
    masks
}

/// Axis mask for every prefix length, indexed by length.
static MASKS: [u128; AXIS_LENGTHS] = build_masks();

/// The axis mask for a prefix length
#[must_use]
pub fn mask(len: u8) -> u128 {
    MASKS[usize::from(len)]
}

/// A single address on the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisAddr(u128);

impl AxisAddr {
    #[must_use]
    pub fn bits(self) -> u128 {
        self.0
    }

    /// Tell if the address lies in the IPv4-mapped block
    #[must_use]
    pub fn is_v4(self) -> bool {
        self.0 & mask(V4_AXIS_OFFSET) == V4_MAPPED_NETWORK
    }

    /// Shortest axis length a prefix of the same family as this address can have
    #[must_use]
    pub fn min_len(self) -> u8 {
        if self.is_v4() { V4_AXIS_OFFSET } else { 0 }
    }

    /// Network of this address for the given axis length
    #[must_use]
    pub fn network(self, len: u8) -> u128 {
        self.0 & mask(len)
    }
}

impl From<IpAddr> for AxisAddr {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(a) => Self(a.to_axis()),
            IpAddr::V6(a) => Self(a.to_axis()),
        }
    }
}

/// A prefix on the axis: a length and a network with no bits set past that length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisPrefix {
    len: u8,
    network: u128,
}

#[allow(clippy::len_without_is_empty)]
impl AxisPrefix {
    /// Build an axis prefix, clearing the bits of `addr` that lie past `len`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is greater than 128.
    #[must_use]
    pub fn new(addr: u128, len: u8) -> Self {
        assert!(
            usize::from(len) < AXIS_LENGTHS,
            "Invalid axis prefix length {len}"
        );
        Self {
            len,
            network: addr & mask(len),
        }
    }

    #[must_use]
    pub fn len(&self) -> u8 {
        self.len
    }

    #[must_use]
    pub fn network(&self) -> u128 {
        self.network
    }

    /// Tell if the prefix is an IPv4 prefix, i.e. rooted in the IPv4-mapped block
    #[must_use]
    pub fn is_v4(&self) -> bool {
        self.len >= V4_AXIS_OFFSET && AxisAddr(self.network).is_v4()
    }

    /// The family-specific prefix this axis prefix stands for
    #[must_use]
    pub fn to_prefix(&self) -> Prefix {
        if self.is_v4() {
            let bits = u32::try_from(self.network & u128::from(u32::MAX))
                .unwrap_or_else(|_| unreachable!());
            Prefix::IPV4(Ipv4Prefix::from(Ipv4Net::new_assert(
                Ipv4Addr::from_bits(bits),
                self.len - V4_AXIS_OFFSET,
            )))
        } else {
            Prefix::IPV6(Ipv6Prefix::from(Ipv6Net::new_assert(
                Ipv6Addr::from_bits(self.network),
                self.len,
            )))
        }
    }
}

impl From<Prefix> for AxisPrefix {
    fn from(prefix: Prefix) -> Self {
        let network = match prefix {
            Prefix::IPV4(p) => p.network().to_axis(),
            Prefix::IPV6(p) => p.network().to_axis(),
        };
        Self::new(network, prefix.axis_length())
    }
}

impl From<&Prefix> for AxisPrefix {
    fn from(prefix: &Prefix) -> Self {
        Self::from(*prefix)
    }
}
