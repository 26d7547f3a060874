// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::fmt::{Debug, Display};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::prefix::PrefixError;
use ipnet::{Ipv4Net, Ipv6Net};
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

/// Addresses that have a fixed-width integer representation and a position on the shared
/// 128-bit axis.
pub trait Representable {
    type Repr: Unsigned + PrimInt + Zero + CheckedShr;

    fn to_bits(&self) -> Self::Repr;
    fn from_bits(repr: Self::Repr) -> Self;

    /// The address on the 128-bit axis. IPv4 addresses use the IPv4-mapped form (RFC 4291).
    fn to_axis(&self) -> u128;
}

impl Representable for Ipv4Addr {
    type Repr = u32;

    fn to_bits(&self) -> u32 {
        Ipv4Addr::to_bits(*self)
    }

    fn from_bits(repr: u32) -> Self {
        Ipv4Addr::from_bits(repr)
    }

    fn to_axis(&self) -> u128 {
        self.to_ipv6_mapped().to_bits()
    }
}

impl Representable for Ipv6Addr {
    type Repr = u128;

    fn to_bits(&self) -> u128 {
        Ipv6Addr::to_bits(*self)
    }

    fn from_bits(repr: u128) -> Self {
        Ipv6Addr::from_bits(repr)
    }

    fn to_axis(&self) -> u128 {
        Ipv6Addr::to_bits(*self)
    }
}

/// A prefix of a single address family, with no host bits set.
#[allow(clippy::len_without_is_empty)]
pub trait IpPrefix: Debug + Clone + From<Self::Addr> + PartialEq {
    type Repr: Debug + Unsigned + PrimInt + Zero + CheckedShr;
    type Addr: Display + Debug + Clone + Eq + Representable<Repr = Self::Repr>;
    const MAX_LEN: u8;

    /// Where length 0 of this family sits on the 128-bit axis.
    const AXIS_OFFSET: u8;

    /// The default route of the family
    const ROOT: Self;

    /// # Errors
    ///
    /// Fails with [`PrefixError::InvalidLength`] if `len` exceeds `Self::MAX_LEN`, and with
    /// [`PrefixError::Invalid`] if `addr` has bits set past `len`.
    fn new(addr: Self::Addr, len: u8) -> Result<Self, PrefixError>;

    fn network(&self) -> Self::Addr;

    fn last_address(&self) -> Self::Addr;

    fn len(&self) -> u8;

    fn contains(&self, addr: &Self::Addr) -> bool;

    /// Prefix length on the 128-bit axis
    fn axis_len(&self) -> u8 {
        self.len() + Self::AXIS_OFFSET
    }
}

fn host_bits_error(net: impl Display, len: u8) -> PrefixError {
    PrefixError::Invalid(format!("{net} has host bits set past length {len}"))
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ipv4Prefix(Ipv4Net);

impl IpPrefix for Ipv4Prefix {
    type Repr = u32;
    type Addr = Ipv4Addr;
    const MAX_LEN: u8 = 32;
    const AXIS_OFFSET: u8 = 96;
    const ROOT: Ipv4Prefix = Ipv4Prefix(Ipv4Net::new_assert(Ipv4Addr::UNSPECIFIED, 0));

    fn new(addr: Ipv4Addr, len: u8) -> Result<Self, PrefixError> {
        let net = Ipv4Net::new(addr, len).map_err(|_| PrefixError::InvalidLength(len))?;
        if net.network() != addr {
            return Err(host_bits_error(net, len));
        }
        Ok(Self(net))
    }

    fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    fn last_address(&self) -> Ipv4Addr {
        self.0.broadcast()
    }

    fn len(&self) -> u8 {
        self.0.prefix_len()
    }

    fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.0.contains(addr)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ipv6Prefix(Ipv6Net);

impl IpPrefix for Ipv6Prefix {
    type Repr = u128;
    type Addr = Ipv6Addr;
    const MAX_LEN: u8 = 128;
    const AXIS_OFFSET: u8 = 0;
    const ROOT: Ipv6Prefix = Ipv6Prefix(Ipv6Net::new_assert(Ipv6Addr::UNSPECIFIED, 0));

    fn new(addr: Ipv6Addr, len: u8) -> Result<Self, PrefixError> {
        let net = Ipv6Net::new(addr, len).map_err(|_| PrefixError::InvalidLength(len))?;
        if net.network() != addr {
            return Err(host_bits_error(net, len));
        }
        Ok(Self(net))
    }

    fn network(&self) -> Ipv6Addr {
        self.0.network()
    }

    fn last_address(&self) -> Ipv6Addr {
        self.0.broadcast()
    }

    fn len(&self) -> u8 {
        self.0.prefix_len()
    }

    fn contains(&self, addr: &Ipv6Addr) -> bool {
        self.0.contains(addr)
    }
}

impl Debug for Ipv4Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for Ipv4Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Ipv6Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for Ipv6Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host prefix
impl From<Ipv4Addr> for Ipv4Prefix {
    fn from(addr: Ipv4Addr) -> Self {
        Self(Ipv4Net::new_assert(addr, Self::MAX_LEN))
    }
}

/// Host prefix
impl From<Ipv6Addr> for Ipv6Prefix {
    fn from(addr: Ipv6Addr) -> Self {
        Self(Ipv6Net::new_assert(addr, Self::MAX_LEN))
    }
}

/// Host bits of the net are cleared.
impl From<Ipv4Net> for Ipv4Prefix {
    fn from(net: Ipv4Net) -> Self {
        Self(net.trunc())
    }
}

/// Host bits of the net are cleared.
impl From<Ipv6Net> for Ipv6Prefix {
    fn from(net: Ipv6Net) -> Self {
        Self(net.trunc())
    }
}

impl From<Ipv4Prefix> for Ipv4Net {
    fn from(prefix: Ipv4Prefix) -> Self {
        prefix.0
    }
}

impl From<Ipv6Prefix> for Ipv6Net {
    fn from(prefix: Ipv6Prefix) -> Self {
        prefix.0
    }
}

#[cfg(any(test, feature = "testing"))]
mod contract {
    use crate::prefix::{IpPrefix, Ipv4Prefix, Ipv6Prefix, Prefix};
    use bolero::{Driver, TypeGenerator};
    use ipnet::{Ipv4Net, Ipv6Net};
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::ops::Bound;

    // Lengths are drawn uniformly so that short, overlapping prefixes are as likely as host
    // routes. The address is then truncated to the length.
    impl TypeGenerator for Ipv4Prefix {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let len = driver.gen_u8(Bound::Included(&0), Bound::Included(&Self::MAX_LEN))?;
            let addr = Ipv4Addr::from_bits(driver.produce()?);
            Some(Self::from(Ipv4Net::new_assert(addr, len)))
        }
    }

    impl TypeGenerator for Ipv6Prefix {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let len = driver.gen_u8(Bound::Included(&0), Bound::Included(&Self::MAX_LEN))?;
            let addr = Ipv6Addr::from_bits(driver.produce()?);
            Some(Self::from(Ipv6Net::new_assert(addr, len)))
        }
    }

    impl TypeGenerator for Prefix {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(if driver.gen_bool(None)? {
                Prefix::IPV4(driver.produce()?)
            } else {
                Prefix::IPV6(driver.produce()?)
            })
        }
    }
}
